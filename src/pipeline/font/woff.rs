//! WOFF 1.0 container: zlib-compressed sfnt tables.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::sfnt::{FontError, Sfnt, Table, check_table_count, pad4, read_u16, read_u32};

pub const SIGNATURE: u32 = u32::from_be_bytes(*b"wOFF");

const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;

pub fn encode(font: &Sfnt) -> Result<Vec<u8>, FontError> {
    // Tables whose compressed form is not smaller are stored as-is
    let mut bodies = Vec::with_capacity(font.tables.len());
    for table in &font.tables {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&table.data)?;
        let compressed = encoder.finish()?;
        bodies.push(if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.clone()
        });
    }

    let directory_end = HEADER_LEN + ENTRY_LEN * font.tables.len();
    let total = directory_end + bodies.iter().map(|b| pad4(b.len())).sum::<usize>();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(font.serialized_len() as u32).to_be_bytes());
    // version 1.0, no metadata or private block
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);

    let mut offset = directory_end;
    for (table, body) in font.tables.iter().zip(&bodies) {
        out.extend_from_slice(&table.tag);
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&table.checksum.to_be_bytes());
        offset += pad4(body.len());
    }
    for body in &bodies {
        out.extend_from_slice(body);
        out.resize(pad4(out.len()), 0);
    }
    Ok(out)
}

pub fn decode(data: &[u8]) -> Result<Sfnt, FontError> {
    if read_u32(data, 0) != Some(SIGNATURE) {
        return Err(FontError::Signature("WOFF"));
    }
    let flavor = read_u32(data, 4).ok_or(FontError::Truncated("woff header"))?;
    let count = read_u16(data, 12).ok_or(FontError::Truncated("woff header"))? as usize;
    check_table_count(count)?;

    let mut tables = Vec::with_capacity(count);
    for i in 0..count {
        let at = HEADER_LEN + i * ENTRY_LEN;
        let entry = data
            .get(at..at + ENTRY_LEN)
            .ok_or(FontError::Truncated("woff directory"))?;
        let tag: [u8; 4] = [entry[0], entry[1], entry[2], entry[3]];
        let field = |n: usize| u32::from_be_bytes([entry[n], entry[n + 1], entry[n + 2], entry[n + 3]]);
        let (offset, comp_len, orig_len, checksum) =
            (field(4) as usize, field(8) as usize, field(12) as usize, field(16));
        let tag_name = || String::from_utf8_lossy(&tag).into_owned();

        let body = offset
            .checked_add(comp_len)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| FontError::TableBounds { tag: tag_name() })?;

        let table_data = if comp_len < orig_len {
            let mut inflated = Vec::with_capacity(orig_len);
            ZlibDecoder::new(body)
                .read_to_end(&mut inflated)
                .map_err(|e| FontError::Table {
                    tag: tag_name(),
                    message: e.to_string(),
                })?;
            inflated
        } else {
            body.to_vec()
        };
        if table_data.len() != orig_len {
            return Err(FontError::Table {
                tag: tag_name(),
                message: format!("expected {orig_len} bytes, got {}", table_data.len()),
            });
        }
        tables.push(Table {
            tag,
            checksum,
            data: table_data,
        });
    }
    tables.sort_by(|a, b| a.tag.cmp(&b.tag));
    Ok(Sfnt { flavor, tables })
}
