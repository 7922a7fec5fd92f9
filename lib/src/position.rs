//! Transient in-memory position (spec.md §3.2).

use crate::bitboard::{Bitboard, Square};
use crate::material::Color;

/// A fully reconstructed position: occupancy per color, side to move, and
/// each mobile's square. Frozen pieces are not carried here — the caller
/// folds them into `white_vector`/`black_vector`/`board_vector` at
/// construction time via [`Position::new`], since they never change
/// within a single tablebase build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board_vector: Bitboard,
    pub white_vector: Bitboard,
    pub black_vector: Bitboard,
    pub side_to_move: Color,
    pub mobile_piece_position: Vec<Square>,
}

impl Position {
    /// Builds a position from mobile squares plus a frozen layout,
    /// checking spec.md §3.2's invariants. Returns `None` if two pieces
    /// (mobile or frozen) collide on the same square.
    #[must_use]
    pub fn new(
        side_to_move: Color,
        mobile_piece_position: Vec<Square>,
        mobile_colors: &[Color],
        frozen: &[(Square, Color)],
    ) -> Option<Self> {
        let mut white_vector = Bitboard::EMPTY;
        let mut black_vector = Bitboard::EMPTY;
        for (&sq, &color) in mobile_piece_position.iter().zip(mobile_colors) {
            let vector = match color {
                Color::White => &mut white_vector,
                Color::Black => &mut black_vector,
            };
            *vector |= Bitboard::from_square(sq);
        }
        for &(sq, color) in frozen {
            let vector = match color {
                Color::White => &mut white_vector,
                Color::Black => &mut black_vector,
            };
            *vector |= Bitboard::from_square(sq);
        }
        let board_vector = white_vector | black_vector;
        let total_pieces = mobile_piece_position.len() + frozen.len();
        if board_vector.count() as usize != total_pieces {
            // a collision happened: some square was written to twice
            return None;
        }
        Some(Self {
            board_vector,
            white_vector,
            black_vector,
            side_to_move,
            mobile_piece_position,
        })
    }

    #[must_use]
    pub fn vector_for(&self, color: Color) -> Bitboard {
        match color {
            Color::White => self.white_vector,
            Color::Black => self.black_vector,
        }
    }

    #[must_use]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.board_vector.contains(sq)
    }

    #[must_use]
    pub fn occupant_color(&self, sq: Square) -> Option<Color> {
        if self.white_vector.contains(sq) {
            Some(Color::White)
        } else if self.black_vector.contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }
}
