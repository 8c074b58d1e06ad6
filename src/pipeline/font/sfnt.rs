//! Minimal sfnt (TrueType / OpenType) container reader and writer.
//!
//! Only the table directory is interpreted; table bodies are opaque bytes.

use thiserror::Error;

pub const TRUETYPE: u32 = 0x0001_0000;
/// Legacy Apple TrueType flavor.
pub const TRUE: u32 = u32::from_be_bytes(*b"true");
pub const CFF: u32 = u32::from_be_bytes(*b"OTTO");

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;
/// Largest table count whose `searchRange` and `rangeShift` fit in u16.
pub const MAX_TABLES: usize = u16::MAX as usize / 16;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("truncated font data ({0})")]
    Truncated(&'static str),

    #[error("unsupported sfnt flavor {0:#010x}")]
    Flavor(u32),

    #[error("not a {0} file")]
    Signature(&'static str),

    #[error("table `{tag}` out of bounds")]
    TableBounds { tag: String },

    #[error("table `{tag}`: {message}")]
    Table { tag: String, message: String },

    #[error("{0} tables, at most {MAX_TABLES} are supported")]
    TooManyTables(usize),

    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sfnt {
    pub flavor: u32,
    /// Sorted by tag.
    pub tables: Vec<Table>,
}

impl Sfnt {
    pub fn parse(data: &[u8]) -> Result<Self, FontError> {
        let flavor = read_u32(data, 0).ok_or(FontError::Truncated("sfnt header"))?;
        if !matches!(flavor, TRUETYPE | TRUE | CFF) {
            return Err(FontError::Flavor(flavor));
        }
        let count = read_u16(data, 4).ok_or(FontError::Truncated("sfnt header"))? as usize;
        check_table_count(count)?;

        let mut tables = Vec::with_capacity(count);
        for i in 0..count {
            let at = HEADER_LEN + i * RECORD_LEN;
            let record = data
                .get(at..at + RECORD_LEN)
                .ok_or(FontError::Truncated("table directory"))?;
            let tag: [u8; 4] = [record[0], record[1], record[2], record[3]];
            let checksum = u32::from_be_bytes([record[4], record[5], record[6], record[7]]);
            let offset = u32::from_be_bytes([record[8], record[9], record[10], record[11]]) as usize;
            let length = u32::from_be_bytes([record[12], record[13], record[14], record[15]]) as usize;
            let body = offset
                .checked_add(length)
                .and_then(|end| data.get(offset..end))
                .ok_or_else(|| FontError::TableBounds {
                    tag: String::from_utf8_lossy(&tag).into_owned(),
                })?;
            tables.push(Table {
                tag,
                checksum,
                data: body.to_vec(),
            });
        }
        tables.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(Self { flavor, tables })
    }

    pub fn table(&self, tag: [u8; 4]) -> Option<&Table> {
        self.tables.iter().find(|t| t.tag == tag)
    }

    /// `otf` for CFF outlines, `ttf` otherwise.
    pub const fn extension(&self) -> &'static str {
        if self.flavor == CFF { "otf" } else { "ttf" }
    }

    /// Size of the serialized font, with every table padded to 4 bytes.
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN
            + RECORD_LEN * self.tables.len()
            + self.tables.iter().map(|t| pad4(t.data.len())).sum::<usize>()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let (search_range, entry_selector, range_shift) = search_params(self.tables.len());
        let count = self.tables.len() as u16;

        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&self.flavor.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&search_range.to_be_bytes());
        out.extend_from_slice(&entry_selector.to_be_bytes());
        out.extend_from_slice(&range_shift.to_be_bytes());

        let mut offset = HEADER_LEN + RECORD_LEN * self.tables.len();
        for table in &self.tables {
            out.extend_from_slice(&table.tag);
            out.extend_from_slice(&table.checksum.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
            offset += pad4(table.data.len());
        }
        for table in &self.tables {
            out.extend_from_slice(&table.data);
            out.resize(pad4(out.len()), 0);
        }
        out
    }
}

/// OpenType checksum: sum of big-endian u32 words, zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

pub fn check_table_count(count: usize) -> Result<(), FontError> {
    if count > MAX_TABLES {
        return Err(FontError::TooManyTables(count));
    }
    Ok(())
}

/// Binary search header fields for `count` tables, at most [`MAX_TABLES`].
fn search_params(count: usize) -> (u16, u16, u16) {
    let count = count as u32;
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 31 - count.leading_zeros();
    let search_range = (1u32 << entry_selector) * 16;
    let range_shift = count * 16 - search_range;
    (search_range as u16, entry_selector as u16, range_shift as u16)
}

pub const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

pub fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
pub(crate) fn sample(flavor: u32) -> Sfnt {
    let mut tables: Vec<Table> = [
        (*b"head", vec![0u8; 54]),
        (*b"cmap", b"cmap table body with some repeated repeated repeated text".to_vec()),
        (*b"name", b"kiln test font".to_vec()),
        (*b"post", vec![0u8; 32]),
    ]
    .into_iter()
    .map(|(tag, data)| Table {
        tag,
        checksum: checksum(&data),
        data,
    })
    .collect();
    tables.sort_by(|a, b| a.tag.cmp(&b.tag));
    Sfnt { flavor, tables }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_bytes() {
        let font = sample(TRUETYPE);
        let bytes = font.to_bytes();
        assert_eq!(bytes.len(), font.serialized_len());
        assert_eq!(Sfnt::parse(&bytes).unwrap(), font);
    }

    #[test]
    fn test_flavor_extension() {
        assert_eq!(sample(TRUETYPE).extension(), "ttf");
        assert_eq!(sample(CFF).extension(), "otf");
    }

    #[test]
    fn test_rejects_unknown_flavor() {
        let mut bytes = sample(TRUETYPE).to_bytes();
        bytes[..4].copy_from_slice(b"wOFF");
        assert!(matches!(Sfnt::parse(&bytes), Err(FontError::Flavor(_))));
    }

    #[test]
    fn test_table_out_of_bounds() {
        let mut bytes = sample(TRUETYPE).to_bytes();
        bytes.truncate(bytes.len() - 8);
        assert!(matches!(
            Sfnt::parse(&bytes),
            Err(FontError::TableBounds { .. })
        ));
    }

    #[test]
    fn test_search_params() {
        assert_eq!(search_params(4), (64, 2, 0));
        assert_eq!(search_params(11), (128, 3, 48));
        assert_eq!(search_params(MAX_TABLES), (32768, 11, 32752));
    }

    #[test]
    fn test_too_many_tables_rejected() {
        let mut header = TRUETYPE.to_be_bytes().to_vec();
        header.extend_from_slice(&4096u16.to_be_bytes());
        header.extend_from_slice(&[0; 6]);
        assert!(matches!(
            Sfnt::parse(&header),
            Err(FontError::TooManyTables(4096))
        ));

        // the largest supported count gets as far as the directory
        header[4..6].copy_from_slice(&(MAX_TABLES as u16).to_be_bytes());
        assert!(matches!(
            Sfnt::parse(&header),
            Err(FontError::Truncated("table directory"))
        ));
    }

    #[test]
    fn test_checksum_pads_tail() {
        assert_eq!(checksum(&[0, 0, 0, 1, 2]), 1 + 0x0200_0000);
    }
}
