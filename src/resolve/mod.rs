//! Turn resolution.
//!
//! Sequences a turn (`phase`), resolves the landed space (`landing`), runs
//! player-triggered abilities (`actions`), and defines the decisions a turn
//! can wait on (`pending`).

pub mod actions;
pub mod landing;
pub mod pending;
pub mod phase;

pub use pending::{Decision, PaymentKind, PendingAction};
pub use phase::{cancel_pending, end_turn, resolve_pending, roll, roll_dice};
