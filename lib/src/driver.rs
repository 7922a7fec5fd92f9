//! The build driver (spec.md §2 item 7, §6; SPEC_FULL.md §4.7): wires the
//! control file, movement tables, Initializer, futurebase fold-in and
//! propagator into the single entry point the `cli` crate calls.

use std::time::Instant;

use crate::compression;
use crate::control::ControlFile;
use crate::entry::{Entry, MoveState};
use crate::error::BuildError;
use crate::futurebase::{FuturebaseSource, NullFuturebase};
use crate::initializer;
use crate::material::TablebaseConfig;
use crate::movement::MovementTable;
use crate::propagate::{self, PropagationStats};

/// Summary of one completed build, logged by the `cli` crate and returned
/// to library callers.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub config: TablebaseConfig,
    pub stats: PropagationStats,
    pub legal_positions: u64,
    pub resolved_wins: u64,
    pub unresolved_draws: u64,
}

/// A conservative ceiling on the entry table's byte size (spec §7's
/// `AllocationFailure`): at 4 bytes/entry, 2^34 bytes is 16 GiB, already
/// far past any config this single-threaded in-memory build is meant to
/// run — an eight-mobile config would need far more than this anyway, so
/// this mostly guards against a malformed control file naming a config
/// the author did not intend.
const MAX_ENTRY_TABLE_BYTES: u64 = 1 << 34;

/// Runs a full build from a parsed control file end to end: validates the
/// configuration, builds and verifies the movement tables, initializes the
/// entry table, folds in any named futurebases, propagates to a fixed
/// point, then writes the output tablebase file.
pub fn build(control: &ControlFile) -> Result<BuildReport, BuildError> {
    let config = control.to_config()?;
    log::info!("building tablebase for {config}");

    let movement = MovementTable::build();
    movement
        .verify()
        .map_err(BuildError::MovementTableVerification)?;
    log::info!("movement table verification passed");

    let requested_bytes = config.max_index() * 4;
    if requested_bytes > MAX_ENTRY_TABLE_BYTES {
        return Err(BuildError::AllocationFailure { requested_bytes });
    }

    let started = Instant::now();
    let mut entries = initializer::initialize(&config, &movement);
    log::info!(
        "initializer wrote {} entries in {:.2?}",
        entries.len(),
        started.elapsed()
    );

    fold_in_futurebases(control, &mut entries);

    let stats = propagate::propagate_to_fixed_point(&config, &movement, &mut entries);
    log::info!(
        "propagation converged after {} passes, {} positions resolved",
        stats.passes,
        stats.positions_resolved
    );

    finalize_draws(&mut entries);

    compression::write_table_file(&control.output, &config, &entries)?;
    log::info!("wrote {}", control.output.display());

    Ok(summarize(config, entries, stats))
}

/// Folds every listed futurebase into the entry table before propagation
/// begins (spec.md §4.6). Each futurebase file is opened so a missing or
/// corrupt path is surfaced immediately, but the cross-configuration
/// lookup itself — translating a capture move's destination index into
/// the futurebase's own index space — is the documented unimplemented
/// piece (DESIGN.md); every source still behaves like [`NullFuturebase`]
/// until that translation exists.
fn fold_in_futurebases(control: &ControlFile, _entries: &mut [Entry]) {
    for fb in &control.futurebases {
        match compression::read_table_file(&fb.path) {
            Ok(table) => log::info!(
                "loaded futurebase {} ({} for {})",
                fb.path.display(),
                table.config,
                table.entries.len()
            ),
            Err(e) => log::warn!("could not load futurebase {}: {e}", fb.path.display()),
        }
        let source: &dyn FuturebaseSource = &NullFuturebase;
        debug_assert!(source.lookup(0).is_none());
    }
}

/// Extension point reserved for the forced-draw finalization pass
/// (spec.md §9's Open Question 2): currently a no-op, since any entry
/// still `MovesRemaining` after [`propagate::propagate_to_fixed_point`]
/// returns is already correctly interpreted as a draw by
/// [`BuildReport::unresolved_draws`] and by [`compression`]'s on-disk
/// encoding.
fn finalize_draws(_entries: &mut [Entry]) {}

fn summarize(config: TablebaseConfig, entries: Vec<Entry>, stats: PropagationStats) -> BuildReport {
    let mut legal_positions = 0u64;
    let mut resolved_wins = 0u64;
    let mut unresolved_draws = 0u64;
    for entry in &entries {
        match entry.state() {
            MoveState::Illegal => {}
            MoveState::PtmWinsDone | MoveState::PntmWinsDone => {
                legal_positions += 1;
                resolved_wins += 1;
            }
            MoveState::MovesRemaining(_) | MoveState::Stalemate => {
                legal_positions += 1;
                unresolved_draws += 1;
            }
            MoveState::PtmWinsPending | MoveState::PntmWinsPending => {
                // propagate_to_fixed_point leaves nothing pending; reaching
                // this arm means the loop above was skipped (e.g. an empty
                // table), not a real win left uncounted.
                legal_positions += 1;
            }
        }
    }
    BuildReport {
        config,
        stats,
        legal_positions,
        resolved_wins,
        unresolved_draws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn control_for(config_str: &str, output: &str) -> ControlFile {
        let config = TablebaseConfig::from_str(config_str).unwrap();
        let mobiles = config
            .mobiles()
            .iter()
            .map(|m| crate::control::ControlMobile {
                kind: m.kind.to_char(),
                color: m.color.to_char(),
            })
            .collect();
        ControlFile {
            mobiles,
            frozen: Vec::new(),
            futurebases: Vec::new(),
            output: std::env::temp_dir().join(output),
        }
    }

    #[test]
    fn test_full_build_kvk_resolves_with_no_propagation_passes() {
        let control = control_for("KvK", "retrotb_driver_test_kvk.tbl");
        let report = build(&control).unwrap();
        std::fs::remove_file(&control.output).ok();
        assert_eq!(report.stats.passes, 0);
        assert_eq!(report.resolved_wins, 0);
        assert!(report.legal_positions > 0);
    }

    #[test]
    fn test_full_build_kqk_produces_some_wins() {
        let control = control_for("KQvK", "retrotb_driver_test_kqk.tbl");
        let report = build(&control).unwrap();
        std::fs::remove_file(&control.output).ok();
        assert!(report.resolved_wins > 0);
        assert!(report.stats.passes > 0);
    }

    #[test]
    fn test_malformed_control_file_rejected() {
        let json = r#"{"mobiles": [{"kind": "Q", "color": "w"}], "output": "x.tbl"}"#;
        let control = ControlFile::parse(json).unwrap();
        assert!(build(&control).is_err());
    }
}
