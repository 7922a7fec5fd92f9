//! Piece kinds, colors, and the persistent tablebase configuration
//! (spec.md §3.1, §3.3): which pieces are mobile (indexed) vs. frozen
//! (fixed, part of the tablebase's identity but not indexed).

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Square;

/// Seven piece kinds (spec.md §3.1). `EnPassantPawn` is a distinct kind
/// from `Pawn` so the movement table can give it its own single-step,
/// single-direction ray (spec.md §3.5) without special-casing `Pawn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
    EnPassantPawn,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::King,
        Self::Queen,
        Self::Rook,
        Self::Bishop,
        Self::Knight,
        Self::Pawn,
        Self::EnPassantPawn,
    ];

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'K' => Some(Self::King),
            'Q' => Some(Self::Queen),
            'R' => Some(Self::Rook),
            'B' => Some(Self::Bishop),
            'N' => Some(Self::Knight),
            'P' => Some(Self::Pawn),
            'E' => Some(Self::EnPassantPawn),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::King => 'K',
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Pawn => 'P',
            Self::EnPassantPawn => 'E',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_char().to_string())
    }
}

/// Two colors, also reused as the side-to-move tag (spec.md §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'w' | 'W' => Some(Self::White),
            'b' | 'B' => Some(Self::Black),
            _ => None,
        }
    }

    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_char().to_string())
    }
}

/// A single mobile piece: its kind and color. Its square is not stored
/// here — it lives in [`crate::position::Position::mobile_piece_position`],
/// indexed by the mobile's position in `TablebaseConfig::mobiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MobileSpec {
    pub kind: PieceKind,
    pub color: Color,
}

/// A frozen piece: fixed at a static square, part of the tablebase's
/// identity, never indexed (spec.md §3.3, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrozenPiece {
    pub square: Square,
    pub kind: PieceKind,
    pub color: Color,
}

/// Persistent tablebase configuration (spec.md §3.3): how many mobiles,
/// their kind/color in index order, and any frozen layout.
///
/// By convention mobiles 0 and 1 are the white and black kings
/// respectively (spec.md §3.2's "the two kings (conventionally mobiles 0
/// and 1)").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablebaseConfig {
    mobiles: Vec<MobileSpec>,
    frozen: Vec<FrozenPiece>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for ConfigError {}

impl TablebaseConfig {
    /// Builds a configuration, enforcing spec.md §3.3's `num_mobiles`
    /// bound and the convention that mobiles 0/1 are the kings.
    pub fn new(mobiles: Vec<MobileSpec>, frozen: Vec<FrozenPiece>) -> Result<Self, ConfigError> {
        if !(2..=8).contains(&mobiles.len()) {
            return Err(ConfigError("num_mobiles must be between 2 and 8"));
        }
        if mobiles[0]
            != (MobileSpec {
                kind: PieceKind::King,
                color: Color::White,
            })
            || mobiles[1]
                != (MobileSpec {
                    kind: PieceKind::King,
                    color: Color::Black,
                })
        {
            return Err(ConfigError(
                "mobiles 0 and 1 must be the white king and black king",
            ));
        }
        Ok(Self { mobiles, frozen })
    }

    #[must_use]
    pub fn num_mobiles(&self) -> usize {
        self.mobiles.len()
    }

    #[must_use]
    pub fn mobile(&self, i: usize) -> MobileSpec {
        self.mobiles[i]
    }

    #[must_use]
    pub fn mobiles(&self) -> &[MobileSpec] {
        &self.mobiles
    }

    #[must_use]
    pub fn frozen(&self) -> &[FrozenPiece] {
        &self.frozen
    }

    /// Maximum index, exclusive: `2 * 64^num_mobiles` (spec.md §3.3).
    #[must_use]
    pub fn max_index(&self) -> u64 {
        2u64 * 64u64.pow(self.num_mobiles() as u32)
    }
}

/// Parses the compact `"KQvK"`-style notation the teacher's `Material`
/// uses: white pieces then `v` then black pieces, each side starting with
/// its king. No frozen pieces can be expressed this way; callers needing a
/// frozen layout build `TablebaseConfig::new` directly.
impl FromStr for TablebaseConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (white, black) = s
            .split_once('v')
            .ok_or(ConfigError("expected e.g. \"KQvK\", missing 'v'"))?;
        let mut mobiles = Vec::new();
        for (part, color) in [(white, Color::White), (black, Color::Black)] {
            let mut chars = part.chars();
            match chars.next() {
                Some('K') => mobiles.push(MobileSpec {
                    kind: PieceKind::King,
                    color,
                }),
                _ => return Err(ConfigError("each side must start with its king, 'K'")),
            }
            for c in chars {
                let kind = PieceKind::from_char(c).ok_or(ConfigError("unknown piece letter"))?;
                if kind == PieceKind::King {
                    return Err(ConfigError("only one king per side"));
                }
                mobiles.push(MobileSpec { kind, color });
            }
        }
        TablebaseConfig::new(mobiles, Vec::new())
    }
}

impl fmt::Display for TablebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in [Color::White, Color::Black] {
            if color == Color::Black {
                f.write_str("v")?;
            }
            for m in &self.mobiles {
                if m.color == color {
                    write!(f, "{}", m.kind)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kqk_from_str() {
        let cfg = TablebaseConfig::from_str("KQvK").unwrap();
        assert_eq!(cfg.num_mobiles(), 3);
        assert_eq!(
            cfg.mobile(0),
            MobileSpec {
                kind: PieceKind::King,
                color: Color::White
            }
        );
        assert_eq!(
            cfg.mobile(1),
            MobileSpec {
                kind: PieceKind::King,
                color: Color::Black
            }
        );
        assert_eq!(
            cfg.mobile(2),
            MobileSpec {
                kind: PieceKind::Queen,
                color: Color::White
            }
        );
        assert_eq!(cfg.max_index(), 2 * 64u64.pow(3));
    }

    #[test]
    fn test_display_roundtrip() {
        for s in ["KQvK", "KRvKB", "KvK"] {
            let cfg = TablebaseConfig::from_str(s).unwrap();
            assert_eq!(cfg.to_string(), s);
        }
    }

    #[test]
    fn test_rejects_missing_king() {
        assert!(TablebaseConfig::from_str("QvK").is_err());
    }

    #[test]
    fn test_rejects_double_king() {
        assert!(TablebaseConfig::from_str("KKvK").is_err());
    }

    #[test]
    fn test_new_enforces_mobile_count_bounds() {
        let king_pair = vec![
            MobileSpec {
                kind: PieceKind::King,
                color: Color::White,
            },
            MobileSpec {
                kind: PieceKind::King,
                color: Color::Black,
            },
        ];
        assert!(TablebaseConfig::new(king_pair, Vec::new()).is_ok());
        assert!(TablebaseConfig::new(
            vec![MobileSpec {
                kind: PieceKind::King,
                color: Color::White
            }],
            Vec::new()
        )
        .is_err());
    }
}
