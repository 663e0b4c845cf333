//! Player records and the value types stored on them.
//!
//! A `Player` is only ever changed by replacing the whole record: every
//! mutator here consumes the previous record and returns the next one, and
//! `GameState::update_player` swaps it into the registry.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::space::{DeckKind, GULAG_SPACE, START_SPACE};

/// Index of a player in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Party standing, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Proletariat,
    PartyMember,
    Commissar,
    InnerCircle,
}

impl Rank {
    /// One step down, saturating at Proletariat.
    pub const fn demoted(self) -> Rank {
        match self {
            Rank::Proletariat | Rank::PartyMember => Rank::Proletariat,
            Rank::Commissar => Rank::PartyMember,
            Rank::InnerCircle => Rank::Commissar,
        }
    }

    /// One step up, saturating at InnerCircle.
    pub const fn promoted(self) -> Rank {
        match self {
            Rank::Proletariat => Rank::PartyMember,
            Rank::PartyMember => Rank::Commissar,
            Rank::Commissar | Rank::InnerCircle => Rank::InnerCircle,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Rank::Proletariat => "proletariat",
            Rank::PartyMember => "party member",
            Rank::Commissar => "commissar",
            Rank::InnerCircle => "inner circle",
        }
    }
}

/// The eight playable pieces. The adjudicator has no piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Hammer,
    Sickle,
    RedStar,
    Tank,
    BreadLoaf,
    IronCurtain,
    VodkaBottle,
    LeninStatue,
}

/// All pieces in table order.
pub const ALL_PIECES: [PieceType; 8] = [
    PieceType::Hammer,
    PieceType::Sickle,
    PieceType::RedStar,
    PieceType::Tank,
    PieceType::BreadLoaf,
    PieceType::IronCurtain,
    PieceType::VodkaBottle,
    PieceType::LeninStatue,
];

impl PieceType {
    /// Returns the lowercase protocol name of this piece.
    pub const fn name(self) -> &'static str {
        match self {
            PieceType::Hammer => "hammer",
            PieceType::Sickle => "sickle",
            PieceType::RedStar => "redstar",
            PieceType::Tank => "tank",
            PieceType::BreadLoaf => "breadloaf",
            PieceType::IronCurtain => "ironcurtain",
            PieceType::VodkaBottle => "vodka",
            PieceType::LeninStatue => "lenin",
        }
    }

    /// Parses a piece from its lowercase protocol name.
    pub fn from_name(name: &str) -> Option<PieceType> {
        ALL_PIECES.iter().copied().find(|p| p.name() == name)
    }
}

/// How long a recorded ability use stays recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityScope {
    OneTime,
    PerLap,
    PerRound,
}

/// A named ability whose use is tracked on the player record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityKey {
    /// Sickle: take a cheap property from another player.
    Harvest,
    /// Iron Curtain: return another player's property to the State.
    Disappear,
    /// Bread Loaf: collect a fixed sum from every willing player.
    RationAppeal,
    /// Tank: first confinement is diverted to a station.
    StationRedirect,
    /// Tank: take a fixed sum from a player passed on the board.
    Requisition,
    /// Vodka Bottle: a second escape roll in the Gulag.
    SecondEscapeRoll,
}

impl AbilityKey {
    pub const fn scope(self) -> AbilityScope {
        match self {
            AbilityKey::Harvest
            | AbilityKey::Disappear
            | AbilityKey::RationAppeal
            | AbilityKey::StationRedirect => AbilityScope::OneTime,
            AbilityKey::Requisition => AbilityScope::PerLap,
            AbilityKey::SecondEscapeRoll => AbilityScope::PerRound,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AbilityKey::Harvest => "Harvest",
            AbilityKey::Disappear => "Disappear",
            AbilityKey::RationAppeal => "Ration Appeal",
            AbilityKey::StationRedirect => "Station Capture",
            AbilityKey::Requisition => "Requisition",
            AbilityKey::SecondEscapeRoll => "Second Roll",
        }
    }
}

/// Why a player left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliminationReason {
    Bankruptcy,
    Execution,
    GulagTimeout,
    RankCollapse,
    UnanimousVote,
}

/// Snapshot taken when a player is eliminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationRecord {
    pub reason: EliminationReason,
    pub turn: u32,
    pub final_rubles: i64,
    pub final_rank: Rank,
    pub final_property_count: usize,
}

/// Who a debt is owed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Creditor {
    State,
    Player(PlayerId),
}

/// An unpaid obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub debtor: PlayerId,
    pub creditor: Creditor,
    pub amount: i64,
    pub created_round: u32,
    pub reason: String,
}

/// A card held by a player instead of being discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardRef {
    pub deck: DeckKind,
    pub card: u16,
}

/// The canonical record for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// None for the adjudicator.
    pub piece: Option<PieceType>,
    pub rank: Rank,
    pub rubles: i64,
    pub position: u8,
    pub properties: Vec<u8>,
    pub in_gulag: bool,
    pub gulag_turns: u8,
    pub elimination: Option<EliminationRecord>,
    pub used_abilities: BTreeSet<AbilityKey>,
    pub debt: Option<Debt>,
    /// The prisoner this player currently vouches for.
    pub vouching_for: Option<PlayerId>,
    pub release_cards: Vec<CardRef>,
    pub under_suspicion: bool,
    pub laps: u32,
}

impl Player {
    /// Creates a player at the start corner with no holdings.
    pub fn new(id: PlayerId, name: impl Into<String>, piece: Option<PieceType>, rank: Rank, rubles: i64) -> Self {
        Player {
            id,
            name: name.into(),
            piece,
            rank,
            rubles,
            position: START_SPACE,
            properties: Vec::new(),
            in_gulag: false,
            gulag_turns: 0,
            elimination: None,
            used_abilities: BTreeSet::new(),
            debt: None,
            vouching_for: None,
            release_cards: Vec::new(),
            under_suspicion: false,
            laps: 0,
        }
    }

    pub fn is_adjudicator(&self) -> bool {
        self.piece.is_none()
    }

    pub fn is_eliminated(&self) -> bool {
        self.elimination.is_some()
    }

    /// True for a piece-holding player still in the game.
    pub fn is_active(&self) -> bool {
        !self.is_adjudicator() && !self.is_eliminated()
    }

    /// True for an active player outside the Gulag.
    pub fn is_free(&self) -> bool {
        self.is_active() && !self.in_gulag
    }

    pub fn has_used(&self, key: AbilityKey) -> bool {
        self.used_abilities.contains(&key)
    }

    pub fn owns(&self, space: u8) -> bool {
        self.properties.contains(&space)
    }

    pub fn credited(mut self, amount: i64) -> Self {
        self.rubles += amount;
        self
    }

    pub fn debited(mut self, amount: i64) -> Self {
        self.rubles -= amount;
        self
    }

    pub fn demoted(mut self) -> Self {
        self.rank = self.rank.demoted();
        self
    }

    pub fn promoted(mut self) -> Self {
        self.rank = self.rank.promoted();
        self
    }

    pub fn moved_to(mut self, position: u8) -> Self {
        self.position = position;
        self
    }

    /// Places the player in the Gulag with a fresh sentence.
    pub fn confined(mut self) -> Self {
        self.in_gulag = true;
        self.gulag_turns = 0;
        self.position = GULAG_SPACE;
        self
    }

    /// Frees the player; the sentence counter always resets.
    pub fn released(mut self) -> Self {
        self.in_gulag = false;
        self.gulag_turns = 0;
        self
    }

    pub fn with_gulag_turns(mut self, turns: u8) -> Self {
        self.gulag_turns = turns;
        self
    }

    pub fn with_ability_used(mut self, key: AbilityKey) -> Self {
        self.used_abilities.insert(key);
        self
    }

    /// Forgets every recorded use of the given scope.
    pub fn with_scope_reset(mut self, scope: AbilityScope) -> Self {
        self.used_abilities.retain(|k| k.scope() != scope);
        self
    }

    pub fn with_property(mut self, space: u8) -> Self {
        if !self.properties.contains(&space) {
            self.properties.push(space);
            self.properties.sort_unstable();
        }
        self
    }

    pub fn without_property(mut self, space: u8) -> Self {
        self.properties.retain(|&s| s != space);
        self
    }

    pub fn with_debt(mut self, debt: Option<Debt>) -> Self {
        self.debt = debt;
        self
    }

    pub fn with_voucher_liability(mut self, prisoner: Option<PlayerId>) -> Self {
        self.vouching_for = prisoner;
        self
    }

    pub fn with_release_card(mut self, card: CardRef) -> Self {
        self.release_cards.push(card);
        self
    }

    /// Removes and returns the oldest held release card.
    pub fn without_release_card(mut self) -> (Self, Option<CardRef>) {
        let card = if self.release_cards.is_empty() {
            None
        } else {
            Some(self.release_cards.remove(0))
        };
        (self, card)
    }

    pub fn with_suspicion(mut self, suspected: bool) -> Self {
        self.under_suspicion = suspected;
        self
    }

    pub fn with_lap_completed(mut self) -> Self {
        self.laps += 1;
        self
    }

    /// Removes the player from play, recording their final standing.
    pub fn eliminated(mut self, reason: EliminationReason, turn: u32) -> Self {
        self.elimination = Some(EliminationRecord {
            reason,
            turn,
            final_rubles: self.rubles,
            final_rank: self.rank,
            final_property_count: self.properties.len(),
        });
        self.in_gulag = false;
        self.gulag_turns = 0;
        self.properties.clear();
        self.release_cards.clear();
        self.debt = None;
        self.vouching_for = None;
        self
    }
}
