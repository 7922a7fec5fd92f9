//! The Initializer (spec.md §4.4): walks every index, counts forward
//! legal moves, and seeds entries as illegal, mated (terminal win),
//! stalemate, or in-progress with N forward moves.

use crate::entry::Entry;
use crate::indexer::index_to_position;
use crate::material::{Color, TablebaseConfig};
use crate::movement::MovementTable;
use crate::position::Position;

/// One pseudo-legal forward move: the square a mobile would land on, and
/// whether it is a capture.
#[derive(Debug, Clone, Copy)]
pub struct PseudoMove {
    pub mobile_index: usize,
    pub to: u8,
    pub is_capture: bool,
}

/// Walks every direction of every mobile belonging to `mover` and returns
/// the pseudo-legal moves: each unoccupied square traversed before the
/// first blocker is a quiet move, the blocker itself (if an enemy piece)
/// is a capture, and the ray stops there (spec.md §4.4 step 2).
///
/// This is shared, unmodified in shape, between the Initializer's forward
/// counting and the propagator's retrograde predecessor search (spec.md
/// §4.5): both walk a ray "until the first occupied square".
#[must_use]
pub fn pseudo_legal_moves(
    config: &TablebaseConfig,
    movement: &MovementTable,
    pos: &Position,
    mover: Color,
) -> Vec<PseudoMove> {
    let mut moves = Vec::new();
    for i in 0..config.num_mobiles() {
        let mobile = config.mobile(i);
        if mobile.color != mover {
            continue;
        }
        let origin = pos.mobile_piece_position[i];
        for direction in movement.directions(mobile.kind, origin) {
            for step in direction {
                let Some(to) = step.square else { break };
                if !pos.is_occupied(to) {
                    moves.push(PseudoMove {
                        mobile_index: i,
                        to,
                        is_capture: false,
                    });
                    continue;
                }
                // first blocker on this ray
                let is_enemy = pos.occupant_color(to) != Some(mover);
                if is_enemy {
                    moves.push(PseudoMove {
                        mobile_index: i,
                        to,
                        is_capture: true,
                    });
                }
                break;
            }
        }
    }
    moves
}

#[must_use]
fn king_square(config: &TablebaseConfig, pos: &Position, color: Color) -> Option<u8> {
    (0..config.num_mobiles())
        .find(|&i| config.mobile(i).kind == crate::material::PieceKind::King && config.mobile(i).color == color)
        .map(|i| pos.mobile_piece_position[i])
}

fn kings_adjacent(config: &TablebaseConfig, pos: &Position) -> bool {
    let Some(white_k) = king_square(config, pos, Color::White) else {
        return false;
    };
    let Some(black_k) = king_square(config, pos, Color::Black) else {
        return false;
    };
    let (wf, wr) = (i32::from(white_k % 8), i32::from(white_k / 8));
    let (bf, br) = (i32::from(black_k % 8), i32::from(black_k / 8));
    (wf - bf).abs() <= 1 && (wr - br).abs() <= 1
}

/// Allocates and fills the entry table for every index in
/// `0..config.max_index()` (spec.md §4.4). Reports progress on a bar
/// (SPEC_FULL.md §2 item 4) rather than per-index log lines, since this
/// loop runs once over every index and a log line per index would drown
/// out the propagator's per-pass summaries.
#[must_use]
pub fn initialize(config: &TablebaseConfig, movement: &MovementTable) -> Vec<Entry> {
    let max_index = config.max_index();
    let mut entries = Vec::with_capacity(max_index as usize);
    let bar = indicatif::ProgressBar::new(max_index);
    bar.set_style(
        indicatif::ProgressStyle::with_template("initializing {bar:40} {pos}/{len}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
    );
    for idx in 0..max_index {
        entries.push(initialize_one(config, movement, idx));
        if idx % 4096 == 0 {
            bar.set_position(idx);
        }
    }
    bar.finish_and_clear();
    entries
}

fn initialize_one(config: &TablebaseConfig, movement: &MovementTable, idx: u64) -> Entry {
    let Some(pos) = index_to_position(config, idx) else {
        return Entry::illegal();
    };
    if kings_adjacent(config, &pos) {
        return Entry::illegal();
    }
    let enemy_king = king_square(config, &pos, pos.side_to_move.opposite());
    let moves = pseudo_legal_moves(config, movement, &pos, pos.side_to_move);

    if let Some(enemy_king_sq) = enemy_king {
        if moves
            .iter()
            .any(|m| m.is_capture && m.to == enemy_king_sq)
        {
            // the enemy failed to escape check: the *previous* position was mate.
            return Entry::terminal_win();
        }
    }

    if moves.is_empty() {
        return Entry::stalemate();
    }
    debug_assert!(moves.len() <= usize::from(crate::entry::MAX_MOVECNT));
    Entry::moves_remaining(moves.len() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn setup(fen_like: u64, config: &TablebaseConfig) -> Entry {
        let movement = MovementTable::build();
        initialize_one(config, &movement, fen_like)
    }

    #[test]
    fn test_bare_kings_adjacent_is_illegal() {
        let config = TablebaseConfig::from_str("KvK").unwrap();
        // white king e4=28, black king e5=36 (adjacent), white to move
        let idx = (28u64 << 1) | (36u64 << 7);
        assert_eq!(setup(idx, &config).state(), crate::entry::MoveState::Illegal);
    }

    #[test]
    fn test_bare_kings_far_apart_has_moves() {
        let config = TablebaseConfig::from_str("KvK").unwrap();
        // white king a1=0, black king h8=63
        let idx = (0u64 << 1) | (63u64 << 7);
        let entry = setup(idx, &config);
        assert!(matches!(entry.state(), crate::entry::MoveState::MovesRemaining(_)));
    }

    #[test]
    fn test_mate_scenario_records_terminal_win() {
        // White K e6=36, White Q g7=54, Black K h8=63, WHITE to move: the
        // queen's diagonal reaches h8, so white can "capture" the black
        // king directly — the king-capture convention of spec.md §4.4
        // step 3, recorded at this index (white to move), not at black's.
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        let e6 = 5 * 8 + 4;
        let h8 = 63;
        let g7 = 6 * 8 + 6;
        let idx = (e6 << 1) | (h8 << 7) | (g7 << 13);
        let entry = setup(idx, &config);
        assert_eq!(entry.state(), crate::entry::MoveState::PtmWinsPending);
        assert_eq!(entry.mate_in_cnt(), 0);
    }
}
