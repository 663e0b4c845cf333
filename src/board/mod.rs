//! Board representation and game-state types.
//!
//! Contains the static board tables, the player and property registries,
//! card decks, and the overall game state container.

pub mod deck;
pub mod player;
pub mod property;
pub mod space;
pub mod state;

pub use deck::{Deck, DECK_SIZE};
pub use player::{
    AbilityKey, AbilityScope, CardRef, Creditor, Debt, EliminationReason, EliminationRecord,
    PieceType, Player, PlayerId, Rank, ALL_PIECES,
};
pub use property::{Property, MAX_COLLECTIVIZATION};
pub use space::{
    advance, group_of, nearest_station, space_info, space_kind, DeckKind, PropertyGroup,
    SpaceKind, TaxKind, ALL_GROUPS, BOARD_SIZE, BREADLINE_SPACE, ENEMY_SPACE, GULAG_SPACE,
    SPACE_INFO, START_SPACE, STATIONS, UTILITIES,
};
pub use state::{GameOutcome, GameState, LogEntry, PlayerSetup, TurnPhase, VoucherAgreement};
