//! Game rules that operate on a `GameState`.
//!
//! Modules are layered: `ability` is the piece table every other module
//! consults, `economy` moves money and custody, `elimination` removes
//! players, and `gulag` and `tribunal` build on all three.

pub mod ability;
pub mod economy;
pub mod elimination;
pub mod gulag;
pub mod tribunal;

pub use economy::PaymentOutcome;
pub use gulag::{GulagEntry, GulagReason};
pub use tribunal::{Tribunal, TribunalPhase, Verdict, WitnessRequirement, WitnessSide};
