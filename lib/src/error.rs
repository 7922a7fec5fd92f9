//! Build errors (spec.md §7), following the teacher's hand-rolled
//! `Display`/`Error` pattern ([`crate::material::ConfigError`]) rather
//! than reaching for an error-derive crate neither the teacher nor the
//! rest of the pack uses.

use std::fmt;
use std::io;

use crate::control::ControlFileError;
use crate::material::ConfigError;

/// Everything that can abort a build before it produces a tablebase
/// file. Invariant violations detected *during* propagation (a
/// mate-in-count that would decrease, a win flip between sides) are not
/// represented here — spec.md §7 treats those as logged warnings the
/// build continues past, not fatal errors.
#[derive(Debug)]
pub enum BuildError {
    /// The control file did not parse, or named a configuration
    /// `TablebaseConfig::new` rejects.
    MalformedControlFile(String),
    /// `Vec::with_capacity` for the entry table failed or was refused
    /// (spec.md §5's memory model assumes one contiguous allocation of
    /// `4 * max_index` bytes; a config large enough to exhaust that is
    /// reported here rather than left to abort the process).
    AllocationFailure { requested_bytes: u64 },
    /// [`crate::movement::MovementTable::verify`] found a ray table
    /// defect (spec.md §4.2: fatal, must never reach the main loop).
    MovementTableVerification(String),
    /// A futurebase-listed material transition has no entry in any
    /// supplied futurebase file (spec.md §4.6).
    UnresolvedFuturemove(String),
    Io(io::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedControlFile(msg) => write!(f, "malformed control file: {msg}"),
            Self::AllocationFailure { requested_bytes } => {
                write!(f, "could not allocate {requested_bytes} bytes for the entry table")
            }
            Self::MovementTableVerification(msg) => {
                write!(f, "movement table failed verification: {msg}")
            }
            Self::UnresolvedFuturemove(msg) => write!(f, "unresolved futuremove: {msg}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BuildError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for BuildError {
    fn from(e: ConfigError) -> Self {
        Self::MalformedControlFile(e.to_string())
    }
}

impl From<ControlFileError> for BuildError {
    fn from(e: ControlFileError) -> Self {
        Self::MalformedControlFile(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_name_the_failure() {
        let e = BuildError::MovementTableVerification("King: self-move at 12".to_string());
        assert!(e.to_string().contains("self-move"));
    }

    #[test]
    fn test_config_error_converts() {
        let e: BuildError = ConfigError("num_mobiles must be between 2 and 8").into();
        assert!(matches!(e, BuildError::MalformedControlFile(_)));
    }
}
