//! WOFF 2.0 encoder with null table transforms.
//!
//! All tables are concatenated into one Brotli stream. `glyf`/`loca` are
//! marked with transform version 3 (null); every other table with version 0
//! (also null for them).

use std::io::Write;

use super::sfnt::{FontError, Sfnt, pad4};

pub const SIGNATURE: u32 = u32::from_be_bytes(*b"wOF2");

const HEADER_LEN: usize = 48;
const ARBITRARY_TAG: u8 = 0x3f;
const NULL_TRANSFORM_GLYF: u8 = 3 << 6;

/// Table tags with a one-byte directory encoding, by index.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

pub fn encode(font: &Sfnt) -> Result<Vec<u8>, FontError> {
    let mut stream = Vec::with_capacity(font.tables.iter().map(|t| t.data.len()).sum());
    let mut directory = Vec::with_capacity(font.tables.len() * 6);
    for table in &font.tables {
        let mut flags = match KNOWN_TAGS.iter().position(|t| **t == table.tag) {
            Some(index) => index as u8,
            None => ARBITRARY_TAG,
        };
        if matches!(&table.tag, b"glyf" | b"loca") {
            flags |= NULL_TRANSFORM_GLYF;
        }
        directory.push(flags);
        if flags & ARBITRARY_TAG == ARBITRARY_TAG {
            directory.extend_from_slice(&table.tag);
        }
        write_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(&table.data);
    }

    let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, 11, 22);
    writer.write_all(&stream)?;
    writer.flush()?;
    let compressed = writer.into_inner();

    let total = pad4(HEADER_LEN + directory.len() + compressed.len());
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&font.flavor.to_be_bytes());
    out.extend_from_slice(&(total as u32).to_be_bytes());
    out.extend_from_slice(&(font.tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(font.serialized_len() as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    // no metadata or private block
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total, 0);
    Ok(out)
}

/// UIntBase128: big-endian groups of 7 bits, high bit set on all but the last.
fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7f) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}
