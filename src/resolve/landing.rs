//! Space resolution.
//!
//! Decides what landing on a space does. Anything that needs a decision from
//! outside is returned as a `PendingAction`; everything else is applied here.

use rand::Rng;

use crate::board::player::{Creditor, PlayerId};
use crate::board::space::{space_kind, SpaceKind, TaxKind};
use crate::board::state::GameState;
use crate::error::{RuleError, RuleResult};
use crate::rules::ability;
use crate::rules::economy::{fee_for, live_creditor, settle, space_name};
use crate::rules::gulag::{send_to_gulag, GulagReason};

use super::pending::{PaymentKind, PendingAction};

/// Amount charged by a tax space.
pub fn tax_amount(state: &GameState, kind: TaxKind) -> i64 {
    match kind {
        TaxKind::RevolutionaryContribution => state.rules.revolutionary_contribution,
        TaxKind::PartyDues => state.rules.party_dues,
    }
}

/// Resolves the space the player is standing on.
pub fn resolve_landing<R: Rng>(
    state: &mut GameState,
    id: PlayerId,
    dice_total: u8,
    rng: &mut R,
) -> RuleResult<Option<PendingAction>> {
    let player = state.player(id)?;
    if !player.is_free() {
        return Err(RuleError::NotEligible(id));
    }
    let space = player.position;
    let kind = space_kind(space).ok_or(RuleError::UnknownProperty(space))?;

    match kind {
        SpaceKind::Start | SpaceKind::Gulag => Ok(None),
        SpaceKind::Breadline => {
            breadline(state)?;
            Ok(None)
        }
        SpaceKind::EnemyOfTheState => {
            send_to_gulag(state, id, GulagReason::EnemyOfTheState)?;
            Ok(None)
        }
        SpaceKind::Tax(tax) => Ok(Some(PendingAction::PaymentDue {
            payer: id,
            creditor: Creditor::State,
            amount: tax_amount(state, tax),
            kind: PaymentKind::Tax,
            space,
        })),
        SpaceKind::Card(deck) => match state.deck_mut(deck).draw(rng) {
            Some(card) => Ok(Some(PendingAction::CardDrawn { player: id, deck, card })),
            None => {
                state.record("The card deck is empty; every card is being held.");
                Ok(None)
            }
        },
        SpaceKind::Property(_) | SpaceKind::Station | SpaceKind::Utility => {
            landing_on_ownable(state, id, space, kind, dice_total)
        }
    }
}

fn landing_on_ownable(
    state: &GameState,
    id: PlayerId,
    space: u8,
    kind: SpaceKind,
    dice_total: u8,
) -> RuleResult<Option<PendingAction>> {
    let property = state.property(space)?;
    if property.custodian.is_none() {
        if ability::may_hold(state.player(id)?, space) {
            return Ok(Some(PendingAction::PurchaseDecision { player: id, space }));
        }
        return Ok(None);
    }
    let Some((custodian, amount)) = fee_for(state, space, id, dice_total)? else {
        return Ok(None);
    };
    let kind = match kind {
        SpaceKind::Station => PaymentKind::Station,
        SpaceKind::Utility => PaymentKind::Utility,
        _ => PaymentKind::Quota,
    };
    Ok(Some(PendingAction::PaymentDue {
        payer: id,
        creditor: Creditor::Player(custodian),
        amount,
        kind,
        space,
    }))
}

/// Every free player pays the communal levy to the treasury.
pub fn breadline(state: &mut GameState) -> RuleResult<()> {
    let levy = state.rules.breadline_levy;
    state.record(format!("The Breadline: every free comrade contributes {levy} rubles."));
    let payers: Vec<PlayerId> = state.free_players().map(|p| p.id).collect();
    for payer in payers {
        if state.player(payer)?.is_active() {
            settle(state, payer, Creditor::State, levy, "breadline levy")?;
        }
    }
    Ok(())
}

/// Applies a landing payment once the payer acknowledges it.
///
/// An unaffordable station fare means capture instead of a debt. If the
/// custodian was eliminated in the meantime the State collects instead.
pub fn pay_landing_fee(
    state: &mut GameState,
    payer: PlayerId,
    creditor: Creditor,
    amount: i64,
    kind: PaymentKind,
    space: u8,
) -> RuleResult<()> {
    let player = state.player(payer)?;
    if !player.is_active() {
        return Err(RuleError::NotEligible(payer));
    }
    if kind == PaymentKind::Station && player.rubles < amount {
        send_to_gulag(state, payer, GulagReason::StationCapture)?;
        return Ok(());
    }
    let creditor = live_creditor(state, creditor)?;
    let reason = format!("{} at {}", kind.name(), space_name(space));
    settle(state, payer, creditor, amount, &reason)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::PieceType;
    use crate::board::state::PlayerSetup;
    use crate::config::RulesConfig;
    use crate::rules::economy::assign_custody;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const SICKLE: PlayerId = PlayerId(1);
    const TANK: PlayerId = PlayerId(2);
    const LOAF: PlayerId = PlayerId(3);

    fn game() -> GameState {
        GameState::new(
            RulesConfig::default(),
            &[
                PlayerSetup::new("Stalin", None),
                PlayerSetup::new("Olga", Some(PieceType::Sickle)),
                PlayerSetup::new("Ivan", Some(PieceType::Tank)),
                PlayerSetup::new("Nina", Some(PieceType::BreadLoaf)),
            ],
        )
        .unwrap()
    }

    fn land(state: &mut GameState, id: PlayerId, space: u8) -> Option<PendingAction> {
        let mut rng = SmallRng::seed_from_u64(7);
        state.update_player(id, |p| p.moved_to(space)).unwrap();
        resolve_landing(state, id, 7, &mut rng).unwrap()
    }

    #[test]
    fn unowned_property_offers_purchase() {
        let mut state = game();
        assert_eq!(land(&mut state, SICKLE, 6), Some(PendingAction::PurchaseDecision { player: SICKLE, space: 6 }));
    }

    #[test]
    fn restricted_groups_offer_nothing() {
        let mut state = game();
        // Ministries need a party member; the Kremlin is closed to the Sickle.
        assert_eq!(land(&mut state, LOAF, 16), None);
        state.update_player(SICKLE, |p| p.promoted().promoted().promoted()).unwrap();
        assert_eq!(land(&mut state, SICKLE, 39), None);
    }

    #[test]
    fn owned_property_charges_quota() {
        let mut state = game();
        assign_custody(&mut state, 6, Some(TANK)).unwrap();
        let pending = land(&mut state, LOAF, 6).unwrap();
        assert_eq!(
            pending,
            PendingAction::PaymentDue {
                payer: LOAF,
                creditor: Creditor::Player(TANK),
                amount: 12,
                kind: PaymentKind::Quota,
                space: 6,
            }
        );
        assert_eq!(land(&mut state, TANK, 6), None);
    }

    #[test]
    fn tax_is_owed_to_the_state() {
        let mut state = game();
        match land(&mut state, LOAF, 4) {
            Some(PendingAction::PaymentDue { creditor: Creditor::State, amount: 200, kind: PaymentKind::Tax, .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn card_space_draws() {
        let mut state = game();
        match land(&mut state, LOAF, 7) {
            Some(PendingAction::CardDrawn { player, deck, .. }) => {
                assert_eq!(player, LOAF);
                assert_eq!(deck, crate::board::space::DeckKind::CommunistTest);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(state.test_deck.len(), 15);
    }

    #[test]
    fn breadline_levies_everyone_free() {
        let mut state = game();
        state.update_player(TANK, |p| p.confined()).unwrap();
        state.update_player(LOAF, |p| p.debited(1480)).unwrap();
        land(&mut state, SICKLE, 20);
        assert_eq!(state.player(SICKLE).unwrap().rubles, 1450);
        assert_eq!(state.player(TANK).unwrap().rubles, 1500);
        assert!(state.player(LOAF).unwrap().debt.is_some());
        assert_eq!(state.treasury, 50);
    }

    #[test]
    fn enemy_corner_confines() {
        let mut state = game();
        land(&mut state, LOAF, 30);
        assert!(state.player(LOAF).unwrap().in_gulag);
    }

    #[test]
    fn unaffordable_fare_means_capture() {
        let mut state = game();
        assign_custody(&mut state, 5, Some(TANK)).unwrap();
        state.update_player(LOAF, |p| p.debited(1480).moved_to(5)).unwrap();
        pay_landing_fee(&mut state, LOAF, Creditor::Player(TANK), 50, PaymentKind::Station, 5).unwrap();
        let loaf = state.player(LOAF).unwrap();
        assert!(loaf.in_gulag);
        assert!(loaf.debt.is_none());
    }

    #[test]
    fn fee_for_an_eliminated_custodian_goes_to_the_state() {
        let mut state = game();
        assign_custody(&mut state, 6, Some(TANK)).unwrap();
        let pending = land(&mut state, LOAF, 6);
        assert!(matches!(pending, Some(PendingAction::PaymentDue { amount: 12, .. })));

        crate::rules::gulag::execute(&mut state, TANK).unwrap();
        assert_eq!(state.property(6).unwrap().custodian, None);

        pay_landing_fee(&mut state, LOAF, Creditor::Player(TANK), 12, PaymentKind::Quota, 6).unwrap();
        assert_eq!(state.player(LOAF).unwrap().rubles, 1488);
        assert_eq!(state.player(TANK).unwrap().rubles, 1500);
        assert_eq!(state.treasury, 12);
    }
}
