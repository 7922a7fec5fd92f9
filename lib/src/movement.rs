//! Movement tables (spec.md §3.5, §4.2): precomputed, per
//! `(piece_kind, origin_square, direction, step)`, the destination square
//! and its bit mask. Rays terminate with the sentinel mask so a scan
//! `while (mask & occupancy) == 0` always halts at either a blocker or the
//! board edge.

use crate::bitboard::{self, Bitboard, Square, ALL_ONES};
use crate::material::PieceKind;

/// A single step of a ray: the destination square (absent at the
/// sentinel) and its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub square: Option<Square>,
    pub mask: Bitboard,
}

impl Step {
    const SENTINEL: Self = Self {
        square: None,
        mask: ALL_ONES,
    };
}

/// One ray: a sequence of steps away from an origin square in one
/// direction, sentinel-terminated.
pub type Direction = Vec<Step>;

/// `movements[piece_kind][origin_square][direction]` → ray.
#[derive(Debug, Clone)]
pub struct MovementTable {
    // indexed by PieceKind::ALL position, then origin square 0..64
    rays: Vec<Vec<Vec<Direction>>>,
}

type Offset = (i8, i8); // (delta file, delta rank)

fn offsets_for(kind: PieceKind) -> &'static [&'static [Offset]] {
    // Each inner slice is one "direction": a sequence of (file, rank) deltas
    // applied successively from the origin. King/Knight/Pawn/EnPassantPawn
    // directions contain deltas taken relative to the origin (not
    // cumulative steps), since those pieces only ever move one step; Queen,
    // Rook and Bishop directions repeat a single delta up to 7 times.
    match kind {
        PieceKind::King => &[
            &[(1, 0)],
            &[(-1, 0)],
            &[(0, 1)],
            &[(0, -1)],
            &[(1, 1)],
            &[(1, -1)],
            &[(-1, 1)],
            &[(-1, -1)],
        ],
        PieceKind::Knight => &[
            &[(1, 2)],
            &[(2, 1)],
            &[(2, -1)],
            &[(1, -2)],
            &[(-1, -2)],
            &[(-2, -1)],
            &[(-2, 1)],
            &[(-1, 2)],
        ],
        PieceKind::Queen => &[
            &[(1, 0)],
            &[(-1, 0)],
            &[(0, 1)],
            &[(0, -1)],
            &[(1, 1)],
            &[(1, -1)],
            &[(-1, 1)],
            &[(-1, -1)],
        ],
        PieceKind::Rook => &[&[(1, 0)], &[(-1, 0)], &[(0, 1)], &[(0, -1)]],
        PieceKind::Bishop => &[&[(1, 1)], &[(1, -1)], &[(-1, 1)], &[(-1, -1)]],
        // White pushes north (+1 rank); the board is not flipped for black,
        // so a color-asymmetric caller must mirror the rank before use
        // (spec.md §9 "Extensibility to pawns": "parameterize pawn
        // direction by color at table-build time"). The baseline build
        // never populates pawns, so only the shape matters here.
        PieceKind::Pawn => &[&[(0, 1)], &[(0, 1)]], // single push, double push (same delta, step-capped)
        PieceKind::EnPassantPawn => &[&[(0, 1)]],
    }
}

fn step_cap(kind: PieceKind) -> u8 {
    match kind {
        PieceKind::King | PieceKind::Knight => 1,
        PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => 7,
        PieceKind::Pawn => 2,
        PieceKind::EnPassantPawn => 1,
    }
}

fn edge_ok(sq: Square, delta: Offset, step: u8) -> bool {
    let file_delta = i32::from(delta.0) * i32::from(step);
    let rank_delta = i32::from(delta.1) * i32::from(step);
    let file = i32::from(sq % 8) + file_delta;
    let rank = i32::from(sq / 8) + rank_delta;
    // double-step edge tests fold in naturally by checking the
    // destination is on-board; the single/double distinction in spec.md
    // §4.1 only matters for knight/double-pawn shapes, which are encoded
    // directly as (file, rank) deltas here rather than as separate
    // `can_go_*_2` edge tests.
    (0..8).contains(&file) && (0..8).contains(&rank)
}

fn apply(sq: Square, delta: Offset, step: u8) -> Square {
    let file = i32::from(sq % 8) + i32::from(delta.0) * i32::from(step);
    let rank = i32::from(sq / 8) + i32::from(delta.1) * i32::from(step);
    (rank * 8 + file) as Square
}

impl MovementTable {
    /// Builds every ray for every piece kind and origin square, per
    /// spec.md §4.2's build contract: successive steps advance along the
    /// direction until an edge test fails, then the sentinel is written
    /// and the ray ends.
    #[must_use]
    pub fn build() -> Self {
        let mut rays = Vec::with_capacity(PieceKind::ALL.len());
        for kind in PieceKind::ALL {
            let mut per_origin = Vec::with_capacity(64);
            for sq in 0..64u8 {
                let mut directions = Vec::new();
                for deltas in offsets_for(kind) {
                    let delta = deltas[0];
                    let mut steps = Vec::new();
                    let cap = step_cap(kind);
                    for step in 1..=cap {
                        if !edge_ok(sq, delta, step) {
                            break;
                        }
                        let dest = apply(sq, delta, step);
                        steps.push(Step {
                            square: Some(dest),
                            mask: bitboard::bitvector(dest),
                        });
                    }
                    steps.push(Step::SENTINEL);
                    directions.push(steps);
                }
                per_origin.push(directions);
            }
            rays.push(per_origin);
        }
        Self { rays }
    }

    #[must_use]
    pub fn directions(&self, kind: PieceKind, origin: Square) -> &[Direction] {
        &self.rays[PieceKind::ALL.iter().position(|k| *k == kind).unwrap()][origin as usize]
    }

    /// Verification pass (spec.md §4.2, mandatory, fatal on failure): for
    /// every non-pawn kind and every ordered pair (A, B) of distinct
    /// squares, A-reaches-B implies B-reaches-A; no self-move; only one
    /// ray reaches a given target; a sentinel carries `square = None` iff
    /// its mask is `ALL_ONES`.
    pub fn verify(&self) -> Result<(), String> {
        for kind in PieceKind::ALL {
            if matches!(kind, PieceKind::Pawn | PieceKind::EnPassantPawn) {
                continue;
            }
            let mut reaches = vec![vec![false; 64]; 64];
            for origin in 0..64u8 {
                let mut targets_hit = std::collections::HashSet::new();
                for dir in self.directions(kind, origin) {
                    for step in dir {
                        match step.square {
                            Some(dest) => {
                                if dest == origin {
                                    return Err(format!("{kind}: self-move at {origin}"));
                                }
                                if step.mask != bitboard::bitvector(dest) {
                                    return Err(format!(
                                        "{kind}: non-sentinel step at {origin} has wrong mask"
                                    ));
                                }
                                if !targets_hit.insert(dest) {
                                    return Err(format!(
                                        "{kind}: {origin} reaches {dest} via more than one ray"
                                    ));
                                }
                                reaches[origin as usize][dest as usize] = true;
                            }
                            None => {
                                if step.mask != ALL_ONES {
                                    return Err(format!(
                                        "{kind}: sentinel at {origin} does not carry ALL_ONES"
                                    ));
                                }
                            }
                        }
                    }
                }
            }
            for a in 0..64 {
                for b in 0..64 {
                    if reaches[a][b] && !reaches[b][a] {
                        return Err(format!(
                            "{kind}: {a} reaches {b} but {b} does not reach {a}"
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
