//! Embedded OpenType (version 0x00020001): a little-endian header carrying
//! copies of OS/2, head and name fields, followed by the uncompressed sfnt.

use super::sfnt::{FontError, Sfnt, read_u16, read_u32};

const VERSION: u32 = 0x0002_0001;
const MAGIC: u16 = 0x504C;
const DEFAULT_CHARSET: u8 = 1;
const DEFAULT_WEIGHT: u32 = 400;

/// Name IDs in header order: family, subfamily, version, full name.
const NAME_IDS: [u16; 4] = [1, 2, 5, 4];

pub fn encode(font: &Sfnt) -> Result<Vec<u8>, FontError> {
    let data = font.to_bytes();
    let os2 = font.table(*b"OS/2").map(|t| t.data.as_slice()).unwrap_or_default();
    let head = font.table(*b"head").map(|t| t.data.as_slice()).unwrap_or_default();
    let names = font
        .table(*b"name")
        .map(|t| windows_names(&t.data))
        .unwrap_or_default();

    let mut out = Vec::with_capacity(data.len() + 256);
    // sizes are patched once the header is complete
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    let mut panose = [0u8; 10];
    if let Some(bytes) = os2.get(32..42) {
        panose.copy_from_slice(bytes);
    }
    out.extend_from_slice(&panose);
    out.push(DEFAULT_CHARSET);
    let fs_selection = read_u16(os2, 62).unwrap_or(0);
    out.push(u8::from(fs_selection & 1 == 1));
    let weight = read_u16(os2, 4).map_or(DEFAULT_WEIGHT, u32::from);
    out.extend_from_slice(&weight.to_le_bytes());
    out.extend_from_slice(&read_u16(os2, 8).unwrap_or(0).to_le_bytes());
    out.extend_from_slice(&MAGIC.to_le_bytes());

    // ulUnicodeRange1-4, then ulCodePageRange1-2 (OS/2 version 1+)
    for at in [42, 46, 50, 54, 78, 82] {
        out.extend_from_slice(&read_u32(os2, at).unwrap_or(0).to_le_bytes());
    }
    out.extend_from_slice(&read_u32(head, 8).unwrap_or(0).to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);

    for name in &names {
        let len = u16::try_from(name.len()).map_err(|_| FontError::Table {
            tag: "name".into(),
            message: "name string too long".into(),
        })?;
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(name);
    }
    // padding, then an empty root string
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    let total = u32::try_from(out.len() + data.len()).map_err(|_| FontError::Table {
        tag: "eot".into(),
        message: "font too large".into(),
    })?;
    out[0..4].copy_from_slice(&total.to_le_bytes());
    out[4..8].copy_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&data);
    Ok(out)
}

/// Windows Unicode (platform 3, encoding 1, US English) strings for
/// [`NAME_IDS`], re-encoded as UTF-16LE. Missing names stay empty.
fn windows_names(table: &[u8]) -> [Vec<u8>; 4] {
    let mut found: [Vec<u8>; 4] = Default::default();
    let (Some(count), Some(storage)) = (read_u16(table, 2), read_u16(table, 4)) else {
        return found;
    };

    for i in 0..usize::from(count) {
        let at = 6 + i * 12;
        let field = |n: usize| read_u16(table, at + n * 2);
        let (Some(platform), Some(encoding), Some(language), Some(id), Some(len), Some(offset)) =
            (field(0), field(1), field(2), field(3), field(4), field(5))
        else {
            break;
        };
        if platform != 3 || encoding != 1 || language != 0x0409 {
            continue;
        }
        let Some(slot) = NAME_IDS.iter().position(|&n| n == id) else {
            continue;
        };
        let start = usize::from(storage) + usize::from(offset);
        if let Some(utf16_be) = table.get(start..start + usize::from(len)) {
            found[slot] = utf16_be.chunks_exact(2).flat_map(|c| [c[1], c[0]]).collect();
        }
    }
    found
}

#[cfg(test)]
pub(crate) fn name_table(entries: &[(u16, &str)]) -> Vec<u8> {
    let mut records = Vec::new();
    let mut storage = Vec::new();
    for (id, text) in entries {
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        for value in [3, 1, 0x0409, *id, bytes.len() as u16, storage.len() as u16] {
            records.extend_from_slice(&u16::to_be_bytes(value));
        }
        storage.extend_from_slice(&bytes);
    }
    let mut table = Vec::new();
    table.extend_from_slice(&0u16.to_be_bytes());
    table.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    table.extend_from_slice(&(6 + records.len() as u16).to_be_bytes());
    table.extend_from_slice(&records);
    table.extend_from_slice(&storage);
    table
}
