//! Piece abilities a player triggers on their own turn.
//!
//! These are used after moving, while the turn sits in `PostTurn`. Harvest
//! and ration appeals need an outside answer and park the turn in
//! `AwaitingInput`; disappearance applies at once.

use crate::board::player::{AbilityKey, Creditor, PlayerId};
use crate::board::state::{GameState, TurnPhase};
use crate::error::{RuleError, RuleResult};
use crate::rules::ability;
use crate::rules::economy::{assign_custody, space_name, transfer};
use crate::rules::gulag::{send_to_gulag, GulagReason};

use super::pending::PendingAction;

fn require_ability(state: &GameState, id: PlayerId, key: AbilityKey) -> RuleResult<()> {
    if state.is_over() {
        return Err(RuleError::GameOver);
    }
    if state.phase != TurnPhase::PostTurn {
        return Err(RuleError::WrongPhase(state.phase.name()));
    }
    let player = state.player(id)?;
    if state.current != id || !player.is_free() || !player.piece.is_some_and(|p| ability::grants(p, key)) {
        return Err(RuleError::NotEligible(id));
    }
    if player.has_used(key) {
        return Err(RuleError::AbilityUsed { player: id, ability: key });
    }
    Ok(())
}

/// Held by another active player, and not by `actor`.
fn held_by_rival(state: &GameState, actor: PlayerId, space: u8) -> RuleResult<PlayerId> {
    let custodian = state.property(space)?.custodian;
    match custodian {
        Some(holder) if holder != actor && state.player(holder)?.is_active() => Ok(holder),
        _ => Err(RuleError::Invalid("the property is not held by a rival")),
    }
}

/// Starts a harvest: taking a cheap property from a rival. The adjudicator
/// decides whether the thief is caught. The attempt spends the ability even
/// if the verdict never comes.
pub fn harvest(state: &mut GameState, thief: PlayerId, space: u8) -> RuleResult<()> {
    require_ability(state, thief, AbilityKey::Harvest)?;
    let victim = held_by_rival(state, thief, space)?;
    if state.property(space)?.price() > state.rules.harvest_price_cap {
        return Err(RuleError::Invalid("the property is too valuable to harvest"));
    }
    if !ability::may_hold(state.player(thief)?, space) {
        return Err(RuleError::NotEligible(thief));
    }
    state.update_player(thief, |p| p.with_ability_used(AbilityKey::Harvest))?;
    let (t, v) = (state.name_of(thief), state.name_of(victim));
    state.record(format!("{t} tries to harvest {} from {v}.", space_name(space)));
    state.phase = TurnPhase::AwaitingInput(PendingAction::TheftVerdict { thief, victim, space });
    Ok(())
}

/// Applies the adjudicator's ruling on a harvest.
pub fn resolve_theft(state: &mut GameState, thief: PlayerId, victim: PlayerId, space: u8, caught: bool) -> RuleResult<()> {
    if held_by_rival(state, thief, space)? != victim || !state.player(thief)?.is_free() {
        return Err(RuleError::NotEligible(thief));
    }
    let name = state.name_of(thief);
    if caught {
        state.record(format!("{name} is caught in the act."));
        send_to_gulag(state, thief, GulagReason::FailedTheft)?;
        return Ok(());
    }
    assign_custody(state, space, Some(thief))?;
    state.record(format!("{name} quietly harvests {}.", space_name(space)));
    Ok(())
}

/// Makes a rival's property disappear back into State hands.
pub fn disappear(state: &mut GameState, actor: PlayerId, space: u8) -> RuleResult<()> {
    require_ability(state, actor, AbilityKey::Disappear)?;
    let holder = held_by_rival(state, actor, space)?;
    assign_custody(state, space, None)?;
    state.update_player(actor, |p| p.with_ability_used(AbilityKey::Disappear))?;
    let (a, h) = (state.name_of(actor), state.name_of(holder));
    state.record(format!("{} vanishes from {h}'s records; {a} knows nothing about it.", space_name(space)));
    Ok(())
}

/// Opens a ration appeal. The willing payers are named when it resolves.
pub fn ration_appeal(state: &mut GameState, collector: PlayerId) -> RuleResult<()> {
    require_ability(state, collector, AbilityKey::RationAppeal)?;
    state.update_player(collector, |p| p.with_ability_used(AbilityKey::RationAppeal))?;
    let name = state.name_of(collector);
    state.record(format!("{name} appeals to the comrades for bread."));
    state.phase = TurnPhase::AwaitingInput(PendingAction::RationAppeal { collector });
    Ok(())
}

/// Collects the ration amount from each willing payer who can afford it.
pub fn collect_ration(state: &mut GameState, collector: PlayerId, payers: &[PlayerId]) -> RuleResult<()> {
    for &payer in payers {
        if payer == collector || !state.player(payer)?.is_free() {
            return Err(RuleError::NotEligible(payer));
        }
    }
    let mut payers = payers.to_vec();
    payers.sort_unstable();
    payers.dedup();

    let amount = state.rules.ration_amount;
    for payer in payers {
        let name = state.name_of(payer);
        if state.player(payer)?.rubles < amount {
            state.record(format!("{name} has nothing to spare."));
            continue;
        }
        transfer(state, payer, Creditor::Player(collector), amount)?;
        state.record(format!("{name} gives {amount} rubles."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::PieceType;
    use crate::board::state::PlayerSetup;
    use crate::config::RulesConfig;

    const SICKLE: PlayerId = PlayerId(1);
    const CURTAIN: PlayerId = PlayerId(2);
    const LOAF: PlayerId = PlayerId(3);
    const HAMMER: PlayerId = PlayerId(4);

    fn game(current: PlayerId) -> GameState {
        let mut state = GameState::new(
            RulesConfig::default(),
            &[
                PlayerSetup::new("Stalin", None),
                PlayerSetup::new("Olga", Some(PieceType::Sickle)),
                PlayerSetup::new("Misha", Some(PieceType::IronCurtain)),
                PlayerSetup::new("Nina", Some(PieceType::BreadLoaf)),
                PlayerSetup::new("Ivan", Some(PieceType::Hammer)),
            ],
        )
        .unwrap();
        state.current = current;
        state.phase = TurnPhase::PostTurn;
        state
    }

    #[test]
    fn harvest_waits_for_verdict_and_transfers() {
        let mut state = game(SICKLE);
        assign_custody(&mut state, 6, Some(HAMMER)).unwrap();
        harvest(&mut state, SICKLE, 6).unwrap();
        assert!(matches!(state.pending(), Some(PendingAction::TheftVerdict { victim: HAMMER, .. })));
        resolve_theft(&mut state, SICKLE, HAMMER, 6, false).unwrap();
        assert_eq!(state.property(6).unwrap().custodian, Some(SICKLE));
        assert!(!state.player(HAMMER).unwrap().owns(6));
        assert!(state.player(SICKLE).unwrap().has_used(AbilityKey::Harvest));
    }

    #[test]
    fn set_aside_harvest_cannot_be_retried() {
        let mut state = game(SICKLE);
        assign_custody(&mut state, 6, Some(HAMMER)).unwrap();
        harvest(&mut state, SICKLE, 6).unwrap();
        crate::resolve::phase::cancel_pending(&mut state).unwrap();
        assert_eq!(state.phase, TurnPhase::PostTurn);
        assert_eq!(
            harvest(&mut state, SICKLE, 6),
            Err(RuleError::AbilityUsed { player: SICKLE, ability: AbilityKey::Harvest })
        );
        assert_eq!(state.property(6).unwrap().custodian, Some(HAMMER));
    }

    #[test]
    fn set_aside_ration_appeal_cannot_be_retried() {
        let mut state = game(LOAF);
        ration_appeal(&mut state, LOAF).unwrap();
        crate::resolve::phase::cancel_pending(&mut state).unwrap();
        assert_eq!(
            ration_appeal(&mut state, LOAF),
            Err(RuleError::AbilityUsed { player: LOAF, ability: AbilityKey::RationAppeal })
        );
    }

    #[test]
    fn caught_thief_is_confined() {
        let mut state = game(SICKLE);
        assign_custody(&mut state, 6, Some(HAMMER)).unwrap();
        harvest(&mut state, SICKLE, 6).unwrap();
        resolve_theft(&mut state, SICKLE, HAMMER, 6, true).unwrap();
        assert!(state.player(SICKLE).unwrap().in_gulag);
        assert_eq!(state.property(6).unwrap().custodian, Some(HAMMER));
    }

    #[test]
    fn harvest_respects_price_cap() {
        let mut state = game(SICKLE);
        assign_custody(&mut state, 14, Some(HAMMER)).unwrap();
        assert!(harvest(&mut state, SICKLE, 14).is_err());
        assign_custody(&mut state, 13, Some(HAMMER)).unwrap();
        assert!(harvest(&mut state, SICKLE, 13).is_ok());
    }

    #[test]
    fn only_the_owner_of_the_ability_may_use_it() {
        let mut state = game(LOAF);
        assign_custody(&mut state, 6, Some(HAMMER)).unwrap();
        assert_eq!(harvest(&mut state, LOAF, 6), Err(RuleError::NotEligible(LOAF)));
        assert_eq!(harvest(&mut state, SICKLE, 6), Err(RuleError::NotEligible(SICKLE)));
    }

    #[test]
    fn disappear_returns_property_once() {
        let mut state = game(CURTAIN);
        assign_custody(&mut state, 6, Some(HAMMER)).unwrap();
        assign_custody(&mut state, 8, Some(HAMMER)).unwrap();
        disappear(&mut state, CURTAIN, 6).unwrap();
        assert_eq!(state.property(6).unwrap().custodian, None);
        assert_eq!(state.player(HAMMER).unwrap().properties, vec![8]);
        assert_eq!(
            disappear(&mut state, CURTAIN, 8),
            Err(RuleError::AbilityUsed { player: CURTAIN, ability: AbilityKey::Disappear })
        );
    }

    #[test]
    fn ration_collects_from_willing_payers() {
        let mut state = game(LOAF);
        state.update_player(CURTAIN, |p| p.debited(1450)).unwrap();
        ration_appeal(&mut state, LOAF).unwrap();
        assert!(collect_ration(&mut state, LOAF, &[LOAF]).is_err());
        collect_ration(&mut state, LOAF, &[SICKLE, CURTAIN, SICKLE]).unwrap();
        assert_eq!(state.player(LOAF).unwrap().rubles, 1600);
        assert_eq!(state.player(SICKLE).unwrap().rubles, 1400);
        assert_eq!(state.player(CURTAIN).unwrap().rubles, 50);
        assert_eq!(state.player(HAMMER).unwrap().rubles, 1500);
        assert!(state.player(LOAF).unwrap().has_used(AbilityKey::RationAppeal));
    }
}
