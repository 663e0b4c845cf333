//! Communistopoly rules engine library.
//!
//! Exposes the board model, the rules services, the turn scheduler, the
//! driver protocol and the random simulator for use by integration tests,
//! benches and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod resolve;
pub mod rules;
pub mod simulate;
