//! The per-position entry (spec.md §3.4): a 4-byte record whose
//! `movecnt` field packs six outcomes into a single byte via sentinel
//! values. Exposed here as the tagged sum type spec.md §9's Design Notes
//! call for (`MoveState`), while [`Entry::raw_movecnt`]/[`Entry::from_raw`]
//! keep the on-disk byte layout bit-exact with the source's encoding —
//! following the wrapper-newtype-plus-`From`/`Into` idiom the teacher uses
//! for its own packed outcome byte.

use std::fmt;

use crate::material::Color;

pub const ILLEGAL_POSITION: u8 = 255;
pub const PTM_WINS_PROPAGATION_DONE: u8 = 254;
pub const PNTM_WINS_PROPAGATION_DONE: u8 = 253;
pub const PTM_WINS_PROPAGATION_NEEDED: u8 = 252;
pub const PNTM_WINS_PROPAGATION_NEEDED: u8 = 0;
pub const MAX_MOVECNT: u8 = 251;
pub const STALEMATE_PENDING: u8 = 251;

/// Hard cutoff on `stalemate_cnt` gating propagation (spec.md §4.5, §8's
/// Open Question: semantics beyond the cutoff are advisory only).
pub const STALEMATE_COUNT: u8 = 100;

/// The `movecnt` state machine as an explicit sum type (spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Illegal,
    PtmWinsDone,
    PntmWinsDone,
    PtmWinsPending,
    PntmWinsPending,
    /// Forward moves not yet tried during build; after the build
    /// completes, any entry left in this state is a draw (spec.md §3.4).
    MovesRemaining(u8),
    /// Overloaded at init time (spec.md §3.4: "The value 251 is
    /// overloaded at init time to tag stalemates pending further
    /// analysis").
    Stalemate,
}

impl MoveState {
    #[must_use]
    pub const fn from_raw(v: u8) -> Self {
        match v {
            ILLEGAL_POSITION => Self::Illegal,
            PTM_WINS_PROPAGATION_DONE => Self::PtmWinsDone,
            PNTM_WINS_PROPAGATION_DONE => Self::PntmWinsDone,
            PTM_WINS_PROPAGATION_NEEDED => Self::PtmWinsPending,
            PNTM_WINS_PROPAGATION_NEEDED => Self::PntmWinsPending,
            STALEMATE_PENDING => Self::Stalemate,
            n => Self::MovesRemaining(n),
        }
    }

    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            Self::Illegal => ILLEGAL_POSITION,
            Self::PtmWinsDone => PTM_WINS_PROPAGATION_DONE,
            Self::PntmWinsDone => PNTM_WINS_PROPAGATION_DONE,
            Self::PtmWinsPending => PTM_WINS_PROPAGATION_NEEDED,
            Self::PntmWinsPending => PNTM_WINS_PROPAGATION_NEEDED,
            Self::Stalemate => STALEMATE_PENDING,
            Self::MovesRemaining(n) => n,
        }
    }

    #[must_use]
    pub const fn needs_propagation(self) -> bool {
        matches!(self, Self::PtmWinsPending | Self::PntmWinsPending)
    }

    #[must_use]
    pub const fn is_win_for_ptm(self) -> bool {
        matches!(self, Self::PtmWinsPending | Self::PtmWinsDone)
    }

    #[must_use]
    pub const fn is_win_for_pntm(self) -> bool {
        matches!(self, Self::PntmWinsPending | Self::PntmWinsDone)
    }
}

/// The 4-byte persistent entry (spec.md §3.4): `movecnt`, `mate_in_cnt`,
/// `stalemate_cnt`, and one reserved byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Entry {
    movecnt: u8,
    mate_in_cnt: u8,
    stalemate_cnt: u8,
    reserved: u8,
}

/// Sentinel "unknown/∞" mate-in value (spec.md §3.4).
pub const UNKNOWN_MATE_IN: u8 = 255;

impl Entry {
    #[must_use]
    pub const fn illegal() -> Self {
        Self {
            movecnt: ILLEGAL_POSITION,
            mate_in_cnt: UNKNOWN_MATE_IN,
            stalemate_cnt: UNKNOWN_MATE_IN,
            reserved: 0,
        }
    }

    #[must_use]
    pub const fn moves_remaining(count: u8) -> Self {
        debug_assert!(count >= 1 && count <= MAX_MOVECNT);
        Self {
            movecnt: count,
            mate_in_cnt: UNKNOWN_MATE_IN,
            stalemate_cnt: UNKNOWN_MATE_IN,
            reserved: 0,
        }
    }

    #[must_use]
    pub const fn stalemate() -> Self {
        Self {
            movecnt: STALEMATE_PENDING,
            mate_in_cnt: UNKNOWN_MATE_IN,
            stalemate_cnt: 0,
            reserved: 0,
        }
    }

    /// Terminal-win entry written by the Initializer when the side to
    /// move has just captured the enemy king (spec.md §4.4): the
    /// *previous* position was mate.
    #[must_use]
    pub const fn terminal_win() -> Self {
        Self {
            movecnt: PTM_WINS_PROPAGATION_NEEDED,
            mate_in_cnt: 0,
            stalemate_cnt: 0,
            reserved: 0,
        }
    }

    #[must_use]
    pub const fn state(self) -> MoveState {
        MoveState::from_raw(self.movecnt)
    }

    #[must_use]
    pub const fn mate_in_cnt(self) -> u8 {
        self.mate_in_cnt
    }

    #[must_use]
    pub const fn stalemate_cnt(self) -> u8 {
        self.stalemate_cnt
    }

    #[must_use]
    pub const fn raw_movecnt(self) -> u8 {
        self.movecnt
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.movecnt, self.mate_in_cnt, self.stalemate_cnt, self.reserved]
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            movecnt: bytes[0],
            mate_in_cnt: bytes[1],
            stalemate_cnt: bytes[2],
            reserved: bytes[3],
        }
    }

    /// Marks a pending win as propagated (spec.md §4.5 step 3): `252 ->
    /// 254`, `0 -> 253`. A no-op (besides a log line left to the caller)
    /// if the entry is not in a pending-win state.
    pub fn mark_propagated(&mut self) {
        self.movecnt = match self.state() {
            MoveState::PtmWinsPending => PTM_WINS_PROPAGATION_DONE,
            MoveState::PntmWinsPending => PNTM_WINS_PROPAGATION_DONE,
            other => other.to_raw(),
        };
    }

    /// Records that PTM (at this entry) wins, per the predecessor update
    /// rules of spec.md §4.5. Idempotent: a win already recorded here is
    /// left alone unless `mate_in` is strictly smaller (the "fastest win"
    /// invariant); a *decrease* after the entry already reached a `*Done`
    /// state is logged by the caller as an invariant violation (spec §7),
    /// never applied here.
    pub fn ptm_wins(&mut self, mate_in: u8, stalemate_cnt: u8) -> Result<(), &'static str> {
        match self.state() {
            MoveState::PtmWinsPending | MoveState::PtmWinsDone => {
                if mate_in < self.mate_in_cnt {
                    self.mate_in_cnt = mate_in;
                    self.stalemate_cnt = self.stalemate_cnt.min(stalemate_cnt);
                }
                Ok(())
            }
            MoveState::PntmWinsPending | MoveState::PntmWinsDone => {
                Err("ptm_wins: entry already recorded as a win for the other side")
            }
            _ => {
                self.movecnt = PTM_WINS_PROPAGATION_NEEDED;
                self.mate_in_cnt = mate_in;
                self.stalemate_cnt = stalemate_cnt;
                Ok(())
            }
        }
    }

    /// Symmetric to [`Entry::ptm_wins`] for the player not to move.
    pub fn pntm_wins(&mut self, mate_in: u8, stalemate_cnt: u8) -> Result<(), &'static str> {
        match self.state() {
            MoveState::PntmWinsPending | MoveState::PntmWinsDone => {
                if mate_in < self.mate_in_cnt {
                    self.mate_in_cnt = mate_in;
                    self.stalemate_cnt = self.stalemate_cnt.min(stalemate_cnt);
                }
                Ok(())
            }
            MoveState::PtmWinsPending | MoveState::PtmWinsDone => {
                Err("pntm_wins: entry already recorded as a win for the other side")
            }
            _ => {
                self.movecnt = PNTM_WINS_PROPAGATION_NEEDED;
                self.mate_in_cnt = mate_in;
                self.stalemate_cnt = stalemate_cnt;
                Ok(())
            }
        }
    }

    /// Retrograde "all my moves lose" step (spec.md §4.5): white has been
    /// proven to win, so one more of *this* (black-to-move) entry's
    /// forward moves has been disproved. Decrementing past 1 lands on `0`,
    /// the PNTM-wins-pending sentinel, naturally.
    ///
    /// `entry_side_to_move` is this entry's own side to move, supplied by
    /// the caller (an `Entry` does not carry its own color) purely to
    /// guard against calling this on a white-to-move entry — mirroring
    /// hoffman.c's `WHITE_TO_MOVE(index)` check in `add_one_to_white_wins`.
    pub fn add_one_to_white_wins(
        &mut self,
        entry_side_to_move: Color,
        mate_in: u8,
        stalemate_cnt: u8,
    ) -> Result<(), &'static str> {
        if entry_side_to_move == Color::White {
            return Err("add_one_to_white_wins: entry is white to move");
        }
        self.decrement_towards_win(mate_in, stalemate_cnt)
    }

    /// Symmetric to [`Entry::add_one_to_white_wins`]: black has been
    /// proven to win, so one more of this (white-to-move) entry's forward
    /// moves has been disproved.
    pub fn add_one_to_black_wins(
        &mut self,
        entry_side_to_move: Color,
        mate_in: u8,
        stalemate_cnt: u8,
    ) -> Result<(), &'static str> {
        if entry_side_to_move == Color::Black {
            return Err("add_one_to_black_wins: entry is black to move");
        }
        self.decrement_towards_win(mate_in, stalemate_cnt)
    }

    fn decrement_towards_win(&mut self, mate_in: u8, stalemate_cnt: u8) -> Result<(), &'static str> {
        match self.state() {
            MoveState::PtmWinsPending | MoveState::PtmWinsDone => {
                // already won the other way; a disproved move changes nothing
                Ok(())
            }
            MoveState::MovesRemaining(0) | MoveState::Illegal => {
                Err("decrement_towards_win: no forward moves left to disprove")
            }
            MoveState::MovesRemaining(n) => {
                self.movecnt = n - 1;
                if self.mate_in_cnt == UNKNOWN_MATE_IN || mate_in < self.mate_in_cnt {
                    self.mate_in_cnt = mate_in;
                }
                if self.stalemate_cnt == UNKNOWN_MATE_IN || stalemate_cnt < self.stalemate_cnt {
                    self.stalemate_cnt = stalemate_cnt;
                }
                Ok(())
            }
            MoveState::Stalemate | MoveState::PntmWinsPending | MoveState::PntmWinsDone => {
                Err("decrement_towards_win: entry is not mid-count")
            }
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} mate_in={} stalemate={}",
            self.state(),
            self.mate_in_cnt,
            self.stalemate_cnt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        for v in 0..=255u8 {
            assert_eq!(MoveState::from_raw(v).to_raw(), v);
        }
    }

    #[test]
    fn test_decrement_to_pntm_pending() {
        // add_one_to_white_wins only ever applies to a black-to-move entry.
        let mut e = Entry::moves_remaining(1);
        e.add_one_to_white_wins(Color::Black, 3, 0).unwrap();
        assert_eq!(e.state(), MoveState::PntmWinsPending);
        assert_eq!(e.mate_in_cnt(), 3);
    }

    #[test]
    fn test_decrement_stays_mid_count() {
        let mut e = Entry::moves_remaining(5);
        e.add_one_to_white_wins(Color::Black, 2, 0).unwrap();
        assert_eq!(e.state(), MoveState::MovesRemaining(4));
    }

    #[test]
    fn test_add_one_to_white_wins_rejects_white_to_move_entry() {
        let mut e = Entry::moves_remaining(3);
        assert!(e.add_one_to_white_wins(Color::White, 1, 0).is_err());
        // rejected: the entry must be left untouched
        assert_eq!(e.state(), MoveState::MovesRemaining(3));
    }

    #[test]
    fn test_add_one_to_black_wins_rejects_black_to_move_entry() {
        let mut e = Entry::moves_remaining(3);
        assert!(e.add_one_to_black_wins(Color::Black, 1, 0).is_err());
        assert_eq!(e.state(), MoveState::MovesRemaining(3));
    }

    #[test]
    fn test_ptm_wins_idempotent_keeps_minimum() {
        let mut e = Entry::illegal();
        e.ptm_wins(5, 0).unwrap();
        e.ptm_wins(3, 0).unwrap();
        assert_eq!(e.mate_in_cnt(), 3);
        e.ptm_wins(9, 0).unwrap();
        assert_eq!(e.mate_in_cnt(), 3, "mate-in must never increase once recorded");
    }

    #[test]
    fn test_ptm_wins_rejects_flip_from_pntm() {
        let mut e = Entry::illegal();
        e.pntm_wins(2, 0).unwrap();
        assert!(e.ptm_wins(1, 0).is_err());
    }

    #[test]
    fn test_mark_propagated() {
        let mut e = Entry::terminal_win();
        assert_eq!(e.state(), MoveState::PtmWinsPending);
        e.mark_propagated();
        assert_eq!(e.state(), MoveState::PtmWinsDone);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let e = Entry {
            movecnt: 200,
            mate_in_cnt: 7,
            stalemate_cnt: 3,
            reserved: 0,
        };
        assert_eq!(Entry::from_bytes(e.to_bytes()), e);
    }

    #[test]
    fn test_stalemate_sentinel_matches_scenario_constants() {
        // spec.md §8 scenario 4 names an entry with movecnt=251,
        // stalemate_cnt=0 for a stalemated position. This crate's
        // pseudo-legal-only Initializer never reaches that classification
        // for a lone king against nontrivial enemy material (a king can
        // always pseudo-legally step onto a square the enemy merely
        // attacks), so the scenario itself is not reachable end to end —
        // but the sentinel encoding the scenario describes is exactly
        // what `Entry::stalemate()` produces, pinned here directly.
        let e = Entry::stalemate();
        assert_eq!(e.raw_movecnt(), STALEMATE_PENDING);
        assert_eq!(e.raw_movecnt(), 251);
        assert_eq!(e.stalemate_cnt(), 0);
        assert_eq!(e.state(), MoveState::Stalemate);
    }
}
