//! Tablebase file format (spec.md §6): a `deku`-derived header carrying
//! the table's material configuration, followed by a zstd-compressed
//! blob of [`Entry`] records, four bytes each, in index order.
//!
//! Adapted from the teacher's header-plus-block split in
//! `compression.rs`: the teacher chunks a huge outcome stream into many
//! size-bounded blocks so a probe only has to decompress one of them.
//! This crate holds the whole entry table in memory for the duration of
//! a build (spec.md §5's memory model is one contiguous `Vec<Entry>`), so
//! there is exactly one block — chunking would only add bookkeeping with
//! nothing to balance it against.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use deku::prelude::*;
use zstd::stream::{decode_all, encode_all};

use crate::entry::Entry;
use crate::material::{Color, FrozenPiece, MobileSpec, PieceKind, TablebaseConfig};

const ZSTD_LEVEL: i32 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
struct RawMobile {
    kind: u8,
    color: u8,
}

impl From<MobileSpec> for RawMobile {
    fn from(m: MobileSpec) -> Self {
        Self {
            kind: m.kind.to_char() as u8,
            color: m.color.to_char() as u8,
        }
    }
}

impl RawMobile {
    fn decode(self) -> io::Result<MobileSpec> {
        let kind = PieceKind::from_char(self.kind as char)
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "unknown piece kind byte"))?;
        let color = Color::from_char(self.color as char)
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "unknown color byte"))?;
        Ok(MobileSpec { kind, color })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
struct RawFrozen {
    square: u8,
    kind: u8,
    color: u8,
}

impl From<FrozenPiece> for RawFrozen {
    fn from(f: FrozenPiece) -> Self {
        Self {
            square: f.square,
            kind: f.kind.to_char() as u8,
            color: f.color.to_char() as u8,
        }
    }
}

impl RawFrozen {
    fn decode(self) -> io::Result<FrozenPiece> {
        let kind = PieceKind::from_char(self.kind as char)
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "unknown piece kind byte"))?;
        let color = Color::from_char(self.color as char)
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "unknown color byte"))?;
        Ok(FrozenPiece {
            square: self.square,
            kind,
            color,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
struct TableHeader {
    num_mobiles: u8,
    #[deku(count = "num_mobiles")]
    mobiles: Vec<RawMobile>,
    num_frozen: u8,
    #[deku(count = "num_frozen")]
    frozen: Vec<RawFrozen>,
    compressed_len: u64,
}

/// A decoded tablebase file: its configuration and the full entry table.
#[derive(Debug)]
pub struct TableFile {
    pub config: TablebaseConfig,
    pub entries: Vec<Entry>,
}

/// Writes `entries` for `config` to `path` (spec.md §6's output tablebase
/// file).
pub fn write_table_file(path: &Path, config: &TablebaseConfig, entries: &[Entry]) -> io::Result<()> {
    let mut uncompressed = Vec::with_capacity(entries.len() * 4);
    for entry in entries {
        uncompressed.extend_from_slice(&entry.to_bytes());
    }
    let compressed = encode_all(uncompressed.as_slice(), ZSTD_LEVEL)
        .map_err(|e| io::Error::new(ErrorKind::Other, e))?;

    let header = TableHeader {
        num_mobiles: config.num_mobiles() as u8,
        mobiles: config.mobiles().iter().copied().map(RawMobile::from).collect(),
        num_frozen: config.frozen().len() as u8,
        frozen: config.frozen().iter().copied().map(RawFrozen::from).collect(),
        compressed_len: compressed.len() as u64,
    };
    let header_bytes = header
        .to_bytes()
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

    let mut file = File::create(path)?;
    file.write_all(&header_bytes)?;
    file.write_all(&compressed)?;
    Ok(())
}

/// Reads a tablebase file written by [`write_table_file`].
pub fn read_table_file(path: &Path) -> io::Result<TableFile> {
    let mut file = File::open(path)?;
    // `TableHeader` is variable-length (per-mobile/per-frozen vectors), so
    // unlike the teacher's fixed-size `BlockHeader` we read the whole
    // file up front rather than a fixed header byte count.
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let ((rest, bit_offset), header) = TableHeader::from_bytes((&bytes, 0))
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
    debug_assert_eq!(bit_offset, 0, "TableHeader fields must all be byte-aligned");
    let header_len = bytes.len() - rest.len();
    let compressed = &bytes[header_len..header_len + header.compressed_len as usize];
    let uncompressed = decode_all(compressed).map_err(|e| io::Error::new(ErrorKind::Other, e))?;
    if uncompressed.len() % 4 != 0 {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            "decompressed entry table is not a multiple of 4 bytes",
        ));
    }
    let entries = uncompressed
        .chunks_exact(4)
        .map(|chunk| Entry::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let mobiles = header
        .mobiles
        .into_iter()
        .map(RawMobile::decode)
        .collect::<io::Result<Vec<_>>>()?;
    let frozen = header
        .frozen
        .into_iter()
        .map(RawFrozen::decode)
        .collect::<io::Result<Vec<_>>>()?;
    let config = TablebaseConfig::new(mobiles, frozen)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;

    Ok(TableFile { config, entries })
}
