//! Position codec (spec.md §3.3, §4.3): bijective mapping between a
//! compact integer index and a fully reconstructed position.
//!
//! `position_to_index`: pack `side_to_move` into bit 0, then each
//! `mobile_piece_position[i]` into the next six bits, in mobile order.
//! `index_to_position`: the inverse, additionally rejecting indices where
//! two mobiles land on the same square — spec.md §4.3 calls this "the
//! primary legality filter".

use crate::bitboard::Square;
use crate::material::{Color, TablebaseConfig};
use crate::position::Position;

#[must_use]
pub fn position_to_index(pos: &Position) -> u64 {
    let mut idx: u64 = match pos.side_to_move {
        Color::White => 0,
        Color::Black => 1,
    };
    for (i, &sq) in pos.mobile_piece_position.iter().enumerate() {
        idx |= u64::from(sq) << (1 + 6 * i);
    }
    idx
}

/// Decodes `idx` back into a position, given the tablebase's mobile
/// kind/color list and frozen layout. Returns `None` if two mobiles (or a
/// mobile and a frozen piece) land on the same square — spec.md §4.3's
/// early illegality rejection.
#[must_use]
pub fn index_to_position(config: &TablebaseConfig, idx: u64) -> Option<Position> {
    if idx >= config.max_index() {
        return None;
    }
    let side_to_move = if idx & 1 == 0 {
        Color::White
    } else {
        Color::Black
    };
    let mut squares = Vec::with_capacity(config.num_mobiles());
    let mut colors = Vec::with_capacity(config.num_mobiles());
    for i in 0..config.num_mobiles() {
        let sq = ((idx >> (1 + 6 * i)) & 0x3f) as Square;
        squares.push(sq);
        colors.push(config.mobile(i).color);
    }
    let frozen: Vec<(Square, Color)> = config
        .frozen()
        .iter()
        .map(|f| (f.square, f.color))
        .collect();
    Position::new(side_to_move, squares, &colors, &frozen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_roundtrip_for_every_legal_index() {
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        let mut legal_count = 0;
        for idx in 0..config.max_index() {
            if let Some(pos) = index_to_position(&config, idx) {
                assert_eq!(position_to_index(&pos), idx);
                legal_count += 1;
            }
        }
        assert!(legal_count > 0);
    }

    #[test]
    fn test_rejects_collision() {
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        // side=white(bit0=0), white king=0, black king=0, queen=0: all on a1
        let idx: u64 = 0;
        assert!(index_to_position(&config, idx).is_none());
    }

    #[test]
    fn test_white_and_black_to_move_both_decode() {
        let config = TablebaseConfig::from_str("KvK").unwrap();
        // wk=e4=28, bk=e8=60 -> idx bits: side(1) | wk<<1 | bk<<7
        let white_idx = (28u64 << 1) | (60u64 << 7);
        let black_idx = white_idx | 1;
        let white_pos = index_to_position(&config, white_idx).unwrap();
        let black_pos = index_to_position(&config, black_idx).unwrap();
        assert_eq!(white_pos.side_to_move, Color::White);
        assert_eq!(black_pos.side_to_move, Color::Black);
        assert_eq!(white_pos.mobile_piece_position, vec![28, 60]);
    }
}
