//! Rule violations reported by engine operations.
//!
//! Every operation checks its preconditions before touching the game state,
//! so an `Err` always means nothing changed. The presentation layer is free
//! to ignore these; they exist so callers and tests can see why a request
//! was refused.

use thiserror::Error;

use crate::board::player::{AbilityKey, PlayerId};

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("space {0} is not an ownable property")]
    UnknownProperty(u8),

    #[error("{player} has {available} rubles, needs {required}")]
    InsufficientFunds { player: PlayerId, required: i64, available: i64 },

    #[error("not allowed during {0}")]
    WrongPhase(&'static str),

    #[error("{0} is not eligible for this action")]
    NotEligible(PlayerId),

    #[error("{} has already used {}", .player, .ability.name())]
    AbilityUsed { player: PlayerId, ability: AbilityKey },

    #[error("{0}")]
    Invalid(&'static str),

    #[error("invalid game setup: {0}")]
    InvalidSetup(&'static str),

    #[error("the game is over")]
    GameOver,
}

/// Result type for engine operations.
pub type RuleResult<T> = Result<T, RuleError>;
