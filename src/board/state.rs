//! Game state representation.
//!
//! Holds the complete, serializable snapshot of a match: the player and
//! property registries, the treasury, decks, voucher agreements, the active
//! tribunal, the turn phase and the narrative log. There is exactly one
//! `GameState` per match and the rules modules operate on it by reference.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::deck::Deck;
use super::player::{PieceType, Player, PlayerId};
use super::property::Property;
use super::space::{ownable_spaces, DeckKind};
use crate::config::RulesConfig;
use crate::error::{RuleError, RuleResult};
use crate::resolve::pending::PendingAction;
use crate::rules::ability;
use crate::rules::tribunal::Tribunal;

/// Where the current player is within their turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    PreRoll,
    Rolling,
    Moving,
    Resolving,
    /// Suspended until an external decision arrives.
    AwaitingInput(PendingAction),
    PostTurn,
    GameOver,
}

impl TurnPhase {
    pub const fn name(&self) -> &'static str {
        match self {
            TurnPhase::PreRoll => "pre-roll",
            TurnPhase::Rolling => "rolling",
            TurnPhase::Moving => "moving",
            TurnPhase::Resolving => "resolving",
            TurnPhase::AwaitingInput(_) => "awaiting input",
            TurnPhase::PostTurn => "post-turn",
            TurnPhase::GameOver => "game over",
        }
    }
}

/// A free player's liability for a prisoner they released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherAgreement {
    pub prisoner: PlayerId,
    pub voucher: PlayerId,
    /// Last round in which the liability applies.
    pub expires_round: u32,
    pub active: bool,
}

/// How the match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(PlayerId),
    /// Nobody survived; the State keeps everything.
    StateVictory,
}

/// One line of the narrative log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub round: u32,
    pub turn: u32,
    pub message: String,
}

/// A seat requested at game creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSetup {
    pub name: String,
    /// None for the adjudicator.
    pub piece: Option<PieceType>,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, piece: Option<PieceType>) -> Self {
        PlayerSetup { name: name.into(), piece }
    }
}

/// Complete game state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub rules: RulesConfig,
    /// Indexed by `PlayerId`.
    pub players: Vec<Player>,
    /// One record per ownable space, in board order.
    pub properties: Vec<Property>,
    pub vouchers: Vec<VoucherAgreement>,
    pub tribunal: Option<Tribunal>,
    pub treasury: i64,
    pub directive_deck: Deck,
    pub test_deck: Deck,
    pub round: u32,
    /// Total turns started, across all players.
    pub turn: u32,
    pub current: PlayerId,
    pub doubles_streak: u8,
    pub last_dice: Option<(u8, u8)>,
    pub phase: TurnPhase,
    /// Players who have already accused someone this round.
    pub accusers_this_round: Vec<PlayerId>,
    pub outcome: Option<GameOutcome>,
    pub log: Vec<LogEntry>,
}

impl GameState {
    /// Creates a new match. Exactly one seat must be the adjudicator and at
    /// least two seats must hold distinct pieces.
    pub fn new(rules: RulesConfig, seats: &[PlayerSetup]) -> RuleResult<Self> {
        let adjudicators = seats.iter().filter(|s| s.piece.is_none()).count();
        if adjudicators != 1 {
            return Err(RuleError::InvalidSetup("exactly one adjudicator is required"));
        }
        let mut pieces: Vec<PieceType> = seats.iter().filter_map(|s| s.piece).collect();
        if pieces.len() < 2 {
            return Err(RuleError::InvalidSetup("at least two pieces are required"));
        }
        pieces.sort_unstable();
        pieces.dedup();
        if pieces.len() != seats.len() - 1 {
            return Err(RuleError::InvalidSetup("each piece may only be used once"));
        }

        let players: Vec<Player> = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let id = PlayerId(i as u8);
                match seat.piece {
                    Some(piece) => Player::new(
                        id,
                        seat.name.clone(),
                        Some(piece),
                        ability::starting_rank(piece),
                        rules.starting_rubles,
                    ),
                    None => Player::new(id, seat.name.clone(), None, ability::adjudicator_rank(), 0),
                }
            })
            .collect();

        let first = players
            .iter()
            .find(|p| p.is_active())
            .map(|p| p.id)
            .ok_or(RuleError::InvalidSetup("no playable seats"))?;

        let mut state = GameState {
            rules,
            players,
            properties: ownable_spaces().map(Property::state_owned).collect(),
            vouchers: Vec::new(),
            tribunal: None,
            treasury: 0,
            directive_deck: Deck::new(DeckKind::PartyDirective),
            test_deck: Deck::new(DeckKind::CommunistTest),
            round: 1,
            turn: 1,
            current: first,
            doubles_streak: 0,
            last_dice: None,
            phase: TurnPhase::PreRoll,
            accusers_this_round: Vec::new(),
            outcome: None,
            log: Vec::new(),
        };
        state.record("The Revolution begins.");
        Ok(state)
    }

    /// Same as `new`, with both decks shuffled.
    pub fn new_shuffled<R: Rng>(rules: RulesConfig, seats: &[PlayerSetup], rng: &mut R) -> RuleResult<Self> {
        let mut state = Self::new(rules, seats)?;
        state.directive_deck = Deck::shuffled(DeckKind::PartyDirective, rng);
        state.test_deck = Deck::shuffled(DeckKind::CommunistTest, rng);
        Ok(state)
    }

    pub fn player(&self, id: PlayerId) -> RuleResult<&Player> {
        self.players.get(id.index()).ok_or(RuleError::UnknownPlayer(id))
    }

    /// Replaces a player record with `f(current record)`.
    ///
    /// The closure always sees the freshest record, so dependent writes
    /// (debit one player, then credit another) never act on stale data.
    pub fn update_player<F>(&mut self, id: PlayerId, f: F) -> RuleResult<()>
    where
        F: FnOnce(Player) -> Player,
    {
        let current = self.player(id)?.clone();
        let next = f(current);
        self.players[id.index()] = next;
        Ok(())
    }

    pub fn property(&self, space: u8) -> RuleResult<&Property> {
        self.properties
            .iter()
            .find(|p| p.space == space)
            .ok_or(RuleError::UnknownProperty(space))
    }

    /// Replaces a property record with `f(current record)`.
    pub fn update_property<F>(&mut self, space: u8, f: F) -> RuleResult<()>
    where
        F: FnOnce(Property) -> Property,
    {
        let idx = self
            .properties
            .iter()
            .position(|p| p.space == space)
            .ok_or(RuleError::UnknownProperty(space))?;
        self.properties[idx] = f(self.properties[idx]);
        Ok(())
    }

    /// Adds `delta` to the treasury, which never drops below zero.
    pub fn adjust_treasury(&mut self, delta: i64) {
        self.treasury = (self.treasury + delta).max(0);
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current.index()]
    }

    /// Returns the adjudicator's id.
    pub fn adjudicator(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| p.is_adjudicator()).map(|p| p.id)
    }

    /// Active players in seat order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// Active players outside the Gulag, in seat order.
    pub fn free_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_free())
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match &self.phase {
            TurnPhase::AwaitingInput(action) => Some(action),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn deck_mut(&mut self, kind: DeckKind) -> &mut Deck {
        match kind {
            DeckKind::PartyDirective => &mut self.directive_deck,
            DeckKind::CommunistTest => &mut self.test_deck,
        }
    }

    /// Ends the current turn early, returning a card still awaiting a
    /// decision to its discard pile.
    pub fn cut_turn_short(&mut self) {
        if let TurnPhase::AwaitingInput(PendingAction::CardDrawn { deck, card, .. }) = self.phase {
            self.deck_mut(deck).discard(card);
        }
        self.doubles_streak = 0;
        self.phase = TurnPhase::PostTurn;
    }

    /// Appends a line to the narrative log.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(round = self.round, turn = self.turn, "{message}");
        self.log.push(LogEntry { round: self.round, turn: self.turn, message });
    }

    /// Display name for log lines.
    pub fn name_of(&self, id: PlayerId) -> String {
        self.player(id).map_or_else(|_| id.to_string(), |p| p.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::Rank;

    fn seats() -> Vec<PlayerSetup> {
        vec![
            PlayerSetup::new("Stalin", None),
            PlayerSetup::new("Ivan", Some(PieceType::Hammer)),
            PlayerSetup::new("Olga", Some(PieceType::RedStar)),
        ]
    }

    #[test]
    fn new_game_starts_with_first_piece_holder() {
        let state = GameState::new(RulesConfig::default(), &seats()).unwrap();
        assert_eq!(state.current, PlayerId(1));
        assert_eq!(state.round, 1);
        assert_eq!(state.phase, TurnPhase::PreRoll);
        assert_eq!(state.properties.len(), 28);
        assert_eq!(state.player(PlayerId(1)).unwrap().rubles, 1500);
        assert_eq!(state.player(PlayerId(0)).unwrap().rubles, 0);
        assert_eq!(state.adjudicator(), Some(PlayerId(0)));
    }

    #[test]
    fn red_star_starts_as_party_member() {
        let state = GameState::new(RulesConfig::default(), &seats()).unwrap();
        assert_eq!(state.player(PlayerId(2)).unwrap().rank, Rank::PartyMember);
        assert_eq!(state.player(PlayerId(1)).unwrap().rank, Rank::Proletariat);
    }

    #[test]
    fn setup_requires_one_adjudicator() {
        let mut s = seats();
        s.remove(0);
        assert!(matches!(GameState::new(RulesConfig::default(), &s), Err(RuleError::InvalidSetup(_))));
        let mut s = seats();
        s.push(PlayerSetup::new("Beria", None));
        assert!(matches!(GameState::new(RulesConfig::default(), &s), Err(RuleError::InvalidSetup(_))));
    }

    #[test]
    fn setup_rejects_duplicate_pieces() {
        let mut s = seats();
        s.push(PlayerSetup::new("Boris", Some(PieceType::Hammer)));
        assert!(matches!(GameState::new(RulesConfig::default(), &s), Err(RuleError::InvalidSetup(_))));
    }

    #[test]
    fn treasury_is_floor_clamped() {
        let mut state = GameState::new(RulesConfig::default(), &seats()).unwrap();
        state.adjust_treasury(100);
        state.adjust_treasury(-250);
        assert_eq!(state.treasury, 0);
    }

    #[test]
    fn update_player_replaces_whole_record() {
        let mut state = GameState::new(RulesConfig::default(), &seats()).unwrap();
        state.update_player(PlayerId(1), |p| p.debited(300).moved_to(7)).unwrap();
        let p = state.player(PlayerId(1)).unwrap();
        assert_eq!(p.rubles, 1200);
        assert_eq!(p.position, 7);
        assert!(state.update_player(PlayerId(9), |p| p).is_err());
    }

    #[test]
    fn unknown_property_is_rejected() {
        let state = GameState::new(RulesConfig::default(), &seats()).unwrap();
        assert!(state.property(6).is_ok());
        assert_eq!(state.property(2), Err(RuleError::UnknownProperty(2)));
    }
}
