//! Control file ingestion (spec.md §2 item 8, §6): a `serde`-deserializable
//! JSON document carrying the same field set hoffman.c's XML control file
//! does — mobile piece list, frozen layout, futurebase paths, pruning
//! directives — so a build can be driven end to end from a single file on
//! disk, the way the teacher's `cli` loads its own JSON config.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bitboard::Square;
use crate::futurebase::PruneDirective;
use crate::material::{Color, ConfigError, FrozenPiece, MobileSpec, PieceKind, TablebaseConfig};

#[derive(Debug, PartialEq, Eq)]
pub struct ControlFileError(pub String);

impl fmt::Display for ControlFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ControlFileError {}

impl From<ConfigError> for ControlFileError {
    fn from(e: ConfigError) -> Self {
        Self(e.to_string())
    }
}

/// One mobile piece entry, e.g. `{"kind": "Q", "color": "w"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMobile {
    pub kind: char,
    pub color: char,
}

/// One frozen piece entry, e.g. `{"square": "a1", "kind": "R", "color": "w"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFrozen {
    pub square: String,
    pub kind: char,
    pub color: char,
}

/// A futurebase the build may consult, plus the pruning assumption it was
/// built under (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFuturebase {
    pub path: PathBuf,
    #[serde(default)]
    pub prune: Option<ControlPruneDirective>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPruneDirective {
    OurMove,
    HisMove,
}

impl From<ControlPruneDirective> for PruneDirective {
    fn from(d: ControlPruneDirective) -> Self {
        match d {
            ControlPruneDirective::OurMove => PruneDirective::OurMove,
            ControlPruneDirective::HisMove => PruneDirective::HisMove,
        }
    }
}

/// The full on-disk control file (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFile {
    pub mobiles: Vec<ControlMobile>,
    #[serde(default)]
    pub frozen: Vec<ControlFrozen>,
    #[serde(default)]
    pub futurebases: Vec<ControlFuturebase>,
    pub output: PathBuf,
}

impl ControlFile {
    pub fn parse(json: &str) -> Result<Self, ControlFileError> {
        serde_json::from_str(json).map_err(|e| ControlFileError(e.to_string()))
    }

    /// Builds the [`TablebaseConfig`] this control file describes,
    /// validating piece letters, square names, and
    /// `TablebaseConfig::new`'s own mobile-count/king-position rules.
    pub fn to_config(&self) -> Result<TablebaseConfig, ControlFileError> {
        let mobiles = self
            .mobiles
            .iter()
            .map(|m| {
                Ok(MobileSpec {
                    kind: PieceKind::from_char(m.kind)
                        .ok_or_else(|| ControlFileError(format!("unknown piece kind {:?}", m.kind)))?,
                    color: Color::from_char(m.color)
                        .ok_or_else(|| ControlFileError(format!("unknown color {:?}", m.color)))?,
                })
            })
            .collect::<Result<Vec<_>, ControlFileError>>()?;

        let frozen = self
            .frozen
            .iter()
            .map(|f| {
                Ok(FrozenPiece {
                    square: parse_square(&f.square)?,
                    kind: PieceKind::from_char(f.kind)
                        .ok_or_else(|| ControlFileError(format!("unknown piece kind {:?}", f.kind)))?,
                    color: Color::from_char(f.color)
                        .ok_or_else(|| ControlFileError(format!("unknown color {:?}", f.color)))?,
                })
            })
            .collect::<Result<Vec<_>, ControlFileError>>()?;

        Ok(TablebaseConfig::new(mobiles, frozen)?)
    }
}

/// Parses algebraic notation (`"a1"`..`"h8"`) into a [`Square`] index.
fn parse_square(s: &str) -> Result<Square, ControlFileError> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(ControlFileError(format!("malformed square {s:?}")));
    }
    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ControlFileError(format!("malformed square {s:?}")));
    }
    Ok((rank - b'1') * 8 + (file - b'a'))
}

impl FromStr for ControlFile {
    type Err = ControlFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_kqk_control_file() {
        let json = r#"{
            "mobiles": [
                {"kind": "K", "color": "w"},
                {"kind": "K", "color": "b"},
                {"kind": "Q", "color": "w"}
            ],
            "frozen": [],
            "futurebases": [],
            "output": "kqk.tbl"
        }"#;
        let control = ControlFile::parse(json).unwrap();
        let config = control.to_config().unwrap();
        assert_eq!(config.num_mobiles(), 3);
        assert_eq!(config.to_string(), "KQvK");
    }

    #[test]
    fn test_rejects_bad_square() {
        let json = r#"{
            "mobiles": [
                {"kind": "K", "color": "w"},
                {"kind": "K", "color": "b"}
            ],
            "frozen": [{"square": "z9", "kind": "Q", "color": "w"}],
            "output": "out.tbl"
        }"#;
        let control = ControlFile::parse(json).unwrap();
        assert!(control.to_config().is_err());
    }

    #[test]
    fn test_futurebase_prune_directive_roundtrips() {
        let json = r#"{
            "mobiles": [
                {"kind": "K", "color": "w"},
                {"kind": "K", "color": "b"}
            ],
            "futurebases": [{"path": "kqk.tbl", "prune": "our_move"}],
            "output": "out.tbl"
        }"#;
        let control = ControlFile::parse(json).unwrap();
        assert_eq!(control.futurebases.len(), 1);
        assert_eq!(
            control.futurebases[0].prune,
            Some(ControlPruneDirective::OurMove)
        );
    }
}
