#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]

mod bitboard;
mod compression;
mod control;
mod driver;
mod entry;
mod error;
mod futurebase;
mod indexer;
mod initializer;
mod material;
mod movement;
mod position;
mod propagate;

pub use bitboard::{Bitboard, ALL_ONES};
pub use compression::{read_table_file, write_table_file, TableFile};
pub use control::{ControlFile, ControlFrozen, ControlFuturebase, ControlMobile, ControlPruneDirective};
pub use driver::{build, BuildReport};
pub use entry::{Entry, MoveState, STALEMATE_COUNT};
pub use error::BuildError;
pub use futurebase::{FuturebaseSource, NullFuturebase, PruneDirective};
pub use indexer::{index_to_position, position_to_index};
pub use initializer::initialize;
pub use material::{Color, PieceKind, TablebaseConfig};
pub use movement::{Direction, MovementTable};
pub use position::Position;
pub use propagate::propagate_to_fixed_point;
