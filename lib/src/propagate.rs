//! The retrograde propagator (spec.md §4.5): the pass-based fixed-point
//! loop that turns the Initializer's forward move counts and
//! king-capture terminal wins into mate-in-N verdicts for every reachable
//! position.
//!
//! Only non-capturing retrograde moves are generated here. A move that
//! captures leaves this table's material configuration entirely — the
//! position it captured into belongs to a different (already solved)
//! configuration, and crossing that boundary is [`crate::futurebase`]'s
//! job, not this module's.

use crate::entry::Entry;
use crate::indexer::{index_to_position, position_to_index};
use crate::material::{Color, TablebaseConfig};
use crate::movement::MovementTable;
use crate::position::Position;

/// Summary of one [`propagate_to_fixed_point`] run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagationStats {
    pub passes: u32,
    pub positions_resolved: u64,
}

/// Quiet-move predecessors of `pos`: every position one non-capturing
/// move away from `pos`, with `mover_color` as the side that made that
/// move (spec.md §4.5 step 1's "retrograde move generation").
///
/// Built by walking, for each `mover_color` mobile, the *same* ray table
/// used for forward moves from the mobile's square in `pos` — sound
/// because [`MovementTable::verify`] already proved every ray is
/// symmetric for non-pawn kinds (spec.md §4.2).
fn quiet_predecessors(
    config: &TablebaseConfig,
    movement: &MovementTable,
    pos: &Position,
    mover_color: Color,
) -> Vec<u64> {
    let mut out = Vec::new();
    let colors: Vec<Color> = config.mobiles().iter().map(|m| m.color).collect();
    let frozen: Vec<(u8, Color)> = config
        .frozen()
        .iter()
        .map(|f| (f.square, f.color))
        .collect();

    for i in 0..config.num_mobiles() {
        let mobile = config.mobile(i);
        if mobile.color != mover_color {
            continue;
        }
        let destination = pos.mobile_piece_position[i];
        for direction in movement.directions(mobile.kind, destination) {
            for step in direction {
                let Some(origin) = step.square else { break };
                if pos.is_occupied(origin) {
                    // a piece already sits here: the mover could not have
                    // passed through it, and it cannot be the mover's own
                    // prior square either (it's occupied in `pos`, not in
                    // the candidate predecessor).
                    break;
                }
                let mut squares = pos.mobile_piece_position.clone();
                squares[i] = origin;
                if let Some(candidate) = Position::new(mover_color, squares, &colors, &frozen) {
                    out.push(position_to_index(&candidate));
                }
            }
        }
    }
    out
}

/// Applies one resolved position's verdict to all of its predecessors
/// (spec.md §4.5 steps 2-4), then marks the position itself propagated.
///
/// Predecessor updates are gated on `stalemate_cnt < STALEMATE_COUNT` at
/// this (already-resolved) position, exactly as hoffman.c guards every one
/// of its four `white_wins`/`black_wins`/`add_one_to_*_wins` call sites
/// (`examples/original_source/hoffman.c:1188,1197,1212,1221`) — chains
/// longer than the cutoff stop propagating rather than corrupting a
/// shorter-chain verdict already recorded upstream.
fn propagate_one(
    config: &TablebaseConfig,
    movement: &MovementTable,
    entries: &mut [Entry],
    idx: u64,
    mate_in: u8,
) {
    let entry = entries[idx as usize];
    let Some(pos) = index_to_position(config, idx) else {
        return;
    };
    let ptm_wins_here = entry.state().is_win_for_ptm();
    let stalemate_cnt = entry.stalemate_cnt();
    let mover_color = pos.side_to_move.opposite();
    let next_mate_in = mate_in.saturating_add(1);

    if stalemate_cnt < crate::entry::STALEMATE_COUNT {
        for pred_idx in quiet_predecessors(config, movement, &pos, mover_color) {
            let pred = &mut entries[pred_idx as usize];
            if ptm_wins_here {
                // `pos`'s own side to move wins here: that is the winning
                // color, not the predecessor's mover — the predecessor
                // (mover_color to move) just had one candidate move
                // disproved by moving into a position the opponent wins
                // (hoffman.c:1181-1228 keys `add_one_to_{color}_wins` on
                // this winning color, the *parent*'s `does_{color}_win`,
                // not on the mover).
                let winning_color = mover_color.opposite();
                let result = match winning_color {
                    Color::White => pred.add_one_to_white_wins(mover_color, next_mate_in, stalemate_cnt),
                    Color::Black => pred.add_one_to_black_wins(mover_color, next_mate_in, stalemate_cnt),
                };
                if let Err(msg) = result {
                    log::trace!("predecessor {pred_idx} already resolved, skipping decrement: {msg}");
                }
            } else {
                // the predecessor's mover played into a position where the
                // opponent loses: that move wins outright for the predecessor.
                if let Err(msg) = pred.ptm_wins(next_mate_in, stalemate_cnt) {
                    log::warn!("predecessor {pred_idx} has conflicting win record: {msg}");
                }
            }
        }
    }

    entries[idx as usize].mark_propagated();
}

/// Runs passes in strictly ascending `mate_in_count` order until no entry
/// needs further propagation (spec.md §4.5): at each level, every pending
/// entry at that depth is resolved before any entry at the next depth is
/// considered, since a predecessor can only ever be discovered one ply
/// deeper than the position that resolved it.
pub fn propagate_to_fixed_point(
    config: &TablebaseConfig,
    movement: &MovementTable,
    entries: &mut [Entry],
) -> PropagationStats {
    let mut stats = PropagationStats::default();
    let mut mate_in: u8 = 0;
    loop {
        let pending: Vec<u64> = (0..entries.len() as u64)
            .filter(|&idx| {
                let e = entries[idx as usize];
                e.state().needs_propagation() && e.mate_in_cnt() == mate_in
            })
            .collect();
        if pending.is_empty() {
            break;
        }
        stats.passes += 1;
        for idx in pending {
            propagate_one(config, movement, entries, idx, mate_in);
            stats.positions_resolved += 1;
        }
        if mate_in == u8::MAX {
            log::warn!("mate-in counter saturated at {}; remaining chains treated as draws", u8::MAX);
            break;
        }
        mate_in += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::MoveState;
    use crate::initializer::initialize;
    use std::str::FromStr;

    #[test]
    fn test_kqk_propagation_leaves_nothing_mid_flight() {
        // A position that moves out of *this* material class (the black
        // king capturing the queen) has no futurebase to resolve it
        // (spec.md §9 / DESIGN.md's documented gap), so not every legal
        // KQvK index necessarily reaches a verdict. But no entry should
        // ever be left in a pending-but-unprocessed state: every pass
        // fully drains the positions due at its mate-in depth before the
        // next depth is considered.
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        let movement = MovementTable::build();
        movement.verify().unwrap();
        let mut entries = initialize(&config, &movement);
        propagate_to_fixed_point(&config, &movement, &mut entries);

        let still_pending = entries.iter().filter(|e| e.state().needs_propagation()).count();
        assert_eq!(still_pending, 0);

        let mated = entries
            .iter()
            .filter(|e| e.state() == MoveState::PtmWinsDone)
            .count();
        assert!(mated > 0, "some position must resolve as a won mate");
    }

    #[test]
    fn test_kvk_never_produces_a_win() {
        // Bare kings can never checkmate or capture anything (two kings
        // are never adjacent in a legal position), so no index should
        // ever need propagation at all: every legal index stays exactly
        // the move count the Initializer wrote.
        let config = TablebaseConfig::from_str("KvK").unwrap();
        let movement = MovementTable::build();
        let mut entries = initialize(&config, &movement);
        let stats = propagate_to_fixed_point(&config, &movement, &mut entries);
        assert_eq!(stats.passes, 0);

        let mut legal_count = 0;
        for entry in &entries {
            match entry.state() {
                MoveState::Illegal => {}
                MoveState::MovesRemaining(n) => {
                    assert!(n >= 3, "a lone king always has at least 3 legal destinations");
                    legal_count += 1;
                }
                other => panic!("bare kings cannot produce {other:?}"),
            }
        }
        assert!(legal_count > 0);
    }

    #[test]
    fn test_known_mate_in_zero_survives_propagation() {
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        let movement = MovementTable::build();
        let mut entries = initialize(&config, &movement);

        // White king e6, white queen g7, black king h8, white to move: the
        // queen's diagonal reaches h8, so this index is a direct
        // king-capture terminal win written by the Initializer itself
        // (spec.md §4.4 step 3). Propagation only flips it to the "done"
        // state — the mate-in-count it was seeded with must not change.
        let e6 = 36u64;
        let h8 = 63u64;
        let g7 = 54u64;
        let idx = (e6 << 1) | (h8 << 7) | (g7 << 13);
        assert_eq!(entries[idx as usize].state(), MoveState::PtmWinsPending);

        propagate_to_fixed_point(&config, &movement, &mut entries);

        assert_eq!(entries[idx as usize].state(), MoveState::PtmWinsDone);
        assert_eq!(entries[idx as usize].mate_in_cnt(), 0);
    }

    #[test]
    fn test_full_kqk_build_terminates_within_ten_passes() {
        // spec.md §8 scenario 6 cites at most 10 passes to reach a fixed
        // point for K+Q vs K. A pass only exists when some entry is
        // pending at that mate-in depth, so the pass count is bounded by
        // the deepest mate any K+Q vs K position actually forces.
        let config = TablebaseConfig::from_str("KQvK").unwrap();
        let movement = MovementTable::build();
        let mut entries = initialize(&config, &movement);
        let stats = propagate_to_fixed_point(&config, &movement, &mut entries);
        assert!(
            stats.passes <= 10,
            "K+Q vs K must reach a fixed point within 10 passes, took {}",
            stats.passes
        );
    }
}
