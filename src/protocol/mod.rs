//! Driver protocol handling.
//!
//! This module implements the line-oriented command parser used by the main
//! loop and the JSON snapshot format used by `save` and `load`.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, parse_player, Command, GulagCommand, PropertyAction};
pub use snapshot::{decode_snapshot, encode_snapshot, SnapshotError, SNAPSHOT_VERSION};
