//! Decisions the engine waits on.
//!
//! When a rule needs an answer from outside (a player choosing to buy, the
//! adjudicator ruling on a bribe), the turn parks in
//! `TurnPhase::AwaitingInput` holding one of these actions. The answer comes
//! back as a `Decision` through `phase::resolve_pending`.

use serde::{Deserialize, Serialize};

use crate::board::player::{Creditor, PlayerId};
use crate::board::space::DeckKind;

/// What a landing payment is for. Decides what happens on a shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    Quota,
    Station,
    Utility,
    Tax,
}

impl PaymentKind {
    pub const fn name(self) -> &'static str {
        match self {
            PaymentKind::Quota => "quota",
            PaymentKind::Station => "station fare",
            PaymentKind::Utility => "utility fee",
            PaymentKind::Tax => "tax",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    /// The player may take custody of a State-held property.
    PurchaseDecision { player: PlayerId, space: u8 },
    /// The player owes money for where they landed.
    PaymentDue {
        payer: PlayerId,
        creditor: Creditor,
        amount: i64,
        kind: PaymentKind,
        space: u8,
    },
    /// A card was drawn; its text is applied outside the engine.
    CardDrawn { player: PlayerId, deck: DeckKind, card: u16 },
    /// The adjudicator rules on a prisoner's denunciation.
    InformVerdict { informer: PlayerId, accused: PlayerId },
    /// The adjudicator decides whether a bribe buys release.
    BribeVerdict { prisoner: PlayerId, amount: i64 },
    /// The adjudicator decides whether a harvest is caught as theft.
    TheftVerdict { thief: PlayerId, victim: PlayerId, space: u8 },
    /// Players decide whether to give to a ration appeal.
    RationAppeal { collector: PlayerId },
}

/// An answer to a `PendingAction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Purchase(bool),
    Pay,
    Acknowledge,
    KeepCard,
    /// The adjudicator's yes or no. For theft, yes means caught.
    Verdict(bool),
    Payers(Vec<PlayerId>),
}

impl PendingAction {
    pub const fn name(&self) -> &'static str {
        match self {
            PendingAction::PurchaseDecision { .. } => "purchase",
            PendingAction::PaymentDue { .. } => "payment",
            PendingAction::CardDrawn { .. } => "card",
            PendingAction::InformVerdict { .. } => "inform",
            PendingAction::BribeVerdict { .. } => "bribe",
            PendingAction::TheftVerdict { .. } => "theft",
            PendingAction::RationAppeal { .. } => "ration",
        }
    }

    /// True if `decision` is a valid kind of answer to this action.
    pub fn accepts(&self, decision: &Decision) -> bool {
        matches!(
            (self, decision),
            (PendingAction::PurchaseDecision { .. }, Decision::Purchase(_))
                | (PendingAction::PaymentDue { .. }, Decision::Pay)
                | (PendingAction::CardDrawn { .. }, Decision::Acknowledge | Decision::KeepCard)
                | (PendingAction::InformVerdict { .. }, Decision::Verdict(_))
                | (PendingAction::BribeVerdict { .. }, Decision::Verdict(_))
                | (PendingAction::TheftVerdict { .. }, Decision::Verdict(_))
                | (PendingAction::RationAppeal { .. }, Decision::Payers(_))
        )
    }
}
