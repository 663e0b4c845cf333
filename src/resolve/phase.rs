//! Turn sequencing.
//!
//! Drives one player's turn through its phases and hands the turn on:
//!
//! - PreRoll    -> roll (or a Gulag escape attempt for a prisoner)
//! - Rolling    -> third double goes to the Gulag, otherwise move
//! - Moving     -> lap stipend, Tank requisition
//! - Resolving  -> landing; a pending decision parks in AwaitingInput
//! - PostTurn   -> abilities, then `end_turn`
//!
//! Wrapping past the last seat starts a new round and runs the round's
//! housekeeping.

use rand::Rng;

use crate::board::player::{AbilityKey, AbilityScope, CardRef, Creditor, PlayerId};
use crate::board::space::{advance, BOARD_SIZE};
use crate::board::state::{GameState, TurnPhase};
use crate::error::{RuleError, RuleResult};
use crate::rules::ability;
use crate::rules::economy::{grant, overdue_debtors, purchase, space_name, transfer};
use crate::rules::elimination::check_victory;
use crate::rules::gulag::{self, send_to_gulag, GulagReason};

use super::actions;
use super::landing::{pay_landing_fee, resolve_landing};
use super::pending::{Decision, PendingAction};

/// Consecutive doubles that count as suspicious.
pub const DOUBLES_LIMIT: u8 = 3;

fn expect_phase(state: &GameState, expected: &TurnPhase) -> RuleResult<()> {
    if state.is_over() {
        return Err(RuleError::GameOver);
    }
    if &state.phase != expected {
        tracing::debug!(phase = state.phase.name(), "operation refused");
        return Err(RuleError::WrongPhase(state.phase.name()));
    }
    Ok(())
}

fn check_dice(d1: u8, d2: u8) -> RuleResult<()> {
    if (1..=6).contains(&d1) && (1..=6).contains(&d2) {
        Ok(())
    } else {
        Err(RuleError::Invalid("dice show 1 to 6"))
    }
}

/// Rolls two dice for the current player and plays out the move.
pub fn roll<R: Rng>(state: &mut GameState, rng: &mut R) -> RuleResult<(u8, u8)> {
    expect_phase(state, &TurnPhase::PreRoll)?;
    let (d1, d2) = (rng.gen_range(1..=6), rng.gen_range(1..=6));
    roll_dice(state, d1, d2, rng)?;
    Ok((d1, d2))
}

/// Plays out a move for the current player with the given dice.
pub fn roll_dice<R: Rng>(state: &mut GameState, d1: u8, d2: u8, rng: &mut R) -> RuleResult<()> {
    expect_phase(state, &TurnPhase::PreRoll)?;
    check_dice(d1, d2)?;
    let id = state.current;
    if !state.player(id)?.is_free() {
        return Err(RuleError::NotEligible(id));
    }

    state.phase = TurnPhase::Rolling;
    state.last_dice = Some((d1, d2));
    let name = state.name_of(id);
    state.record(format!("{name} rolls {d1} and {d2}."));

    if d1 == d2 {
        state.doubles_streak += 1;
        if state.doubles_streak >= DOUBLES_LIMIT {
            state.doubles_streak = 0;
            send_to_gulag(state, id, GulagReason::TripleDoubles)?;
            if !state.is_over() {
                state.phase = TurnPhase::PostTurn;
            }
            return Ok(());
        }
    } else {
        state.doubles_streak = 0;
    }
    advance_and_land(state, id, d1 + d2, rng)
}

fn advance_and_land<R: Rng>(state: &mut GameState, id: PlayerId, steps: u8, rng: &mut R) -> RuleResult<()> {
    state.phase = TurnPhase::Moving;
    move_player(state, id, steps)?;
    state.phase = TurnPhase::Resolving;
    let pending = resolve_landing(state, id, steps, rng)?;
    // Landing may already have ended the turn (arrest, bankruptcy).
    if state.phase == TurnPhase::Resolving {
        state.phase = match pending {
            Some(action) => TurnPhase::AwaitingInput(action),
            None => TurnPhase::PostTurn,
        };
    }
    Ok(())
}

/// Moves a player forward, paying the lap stipend when the start corner is
/// passed. Returns the new position.
pub fn move_player(state: &mut GameState, id: PlayerId, steps: u8) -> RuleResult<u8> {
    let from = state.player(id)?.position;
    let (to, lapped) = advance(from, steps);
    requisition(state, id, from, steps)?;
    state.update_player(id, |p| p.moved_to(to))?;
    let name = state.name_of(id);
    state.record(format!("{name} moves to {}.", space_name(to)));
    if lapped {
        complete_lap(state, id)?;
    }
    Ok(to)
}

/// True if a piece standing on `position` is strictly between the start and
/// end of a move.
fn passed_over(from: u8, steps: u8, position: u8) -> bool {
    let size = BOARD_SIZE as u16;
    let offset = (position as u16 + size - from as u16) % size;
    offset > 0 && offset < steps as u16
}

fn requisition(state: &mut GameState, id: PlayerId, from: u8, steps: u8) -> RuleResult<()> {
    if !ability::can_use(state.player(id)?, AbilityKey::Requisition) {
        return Ok(());
    }
    let victim = state
        .free_players()
        .find(|p| p.id != id && passed_over(from, steps, p.position))
        .map(|p| (p.id, p.rubles));
    let Some((victim, rubles)) = victim else {
        return Ok(());
    };
    let amount = state.rules.tank_requisition.min(rubles.max(0));
    transfer(state, victim, Creditor::Player(id), amount)?;
    state.update_player(id, |p| p.with_ability_used(AbilityKey::Requisition))?;
    let (t, v) = (state.name_of(id), state.name_of(victim));
    state.record(format!("{t} requisitions {amount} rubles from {v} in passing."));
    Ok(())
}

fn complete_lap(state: &mut GameState, id: PlayerId) -> RuleResult<()> {
    let player = state.player(id)?;
    let amount = state.rules.lap_stipend + ability::lap_bonus(player, &state.rules);
    grant(state, id, amount)?;
    state.update_player(id, |p| p.with_lap_completed().with_scope_reset(AbilityScope::PerLap))?;
    let name = state.name_of(id);
    state.record(format!("{name} completes a lap and receives {amount} rubles from the State."));
    Ok(())
}

fn current_prisoner(state: &GameState) -> RuleResult<PlayerId> {
    expect_phase(state, &TurnPhase::PreRoll)?;
    let id = state.current;
    let player = state.player(id)?;
    if !player.is_active() || !player.in_gulag {
        return Err(RuleError::NotEligible(id));
    }
    Ok(id)
}

/// Rolls for a Gulag escape.
pub fn gulag_roll<R: Rng>(state: &mut GameState, rng: &mut R) -> RuleResult<bool> {
    current_prisoner(state)?;
    let (d1, d2) = (rng.gen_range(1..=6), rng.gen_range(1..=6));
    gulag_roll_dice(state, d1, d2, rng)
}

/// Attempts a Gulag escape with the given dice. A successful prisoner moves
/// by the roll. A failed attempt ends the turn unless the piece has a second
/// attempt left this round.
pub fn gulag_roll_dice<R: Rng>(state: &mut GameState, d1: u8, d2: u8, rng: &mut R) -> RuleResult<bool> {
    let id = current_prisoner(state)?;
    check_dice(d1, d2)?;
    state.last_dice = Some((d1, d2));
    if gulag::escape_by_roll(state, id, d1, d2)? {
        state.doubles_streak = 0;
        advance_and_land(state, id, d1 + d2, rng)?;
        return Ok(true);
    }
    let player = state.player(id)?;
    if !player.is_active() {
        return Ok(false);
    }
    if ability::can_use(player, AbilityKey::SecondEscapeRoll) {
        state.update_player(id, |p| p.with_ability_used(AbilityKey::SecondEscapeRoll))?;
        let name = state.name_of(id);
        state.record(format!("{name} may try once more."));
    } else {
        state.phase = TurnPhase::PostTurn;
    }
    Ok(false)
}

/// Pays the release fee. The freed player then rolls normally.
pub fn gulag_pay(state: &mut GameState) -> RuleResult<bool> {
    let id = current_prisoner(state)?;
    gulag::escape_by_payment(state, id)
}

/// Released on another player's guarantee.
pub fn gulag_vouch(state: &mut GameState, voucher: PlayerId) -> RuleResult<bool> {
    let id = current_prisoner(state)?;
    gulag::escape_by_voucher(state, id, voucher)
}

/// Spends a held release card.
pub fn gulag_card(state: &mut GameState) -> RuleResult<bool> {
    let id = current_prisoner(state)?;
    gulag::escape_by_card(state, id)
}

/// Denounces a free player; the adjudicator rules on it.
pub fn gulag_inform(state: &mut GameState, accused: PlayerId) -> RuleResult<()> {
    let informer = current_prisoner(state)?;
    gulag::check_inform(state, informer, accused)?;
    let (i, a) = (state.name_of(informer), state.name_of(accused));
    state.record(format!("{i} informs on {a} from the Gulag."));
    state.phase = TurnPhase::AwaitingInput(PendingAction::InformVerdict { informer, accused });
    Ok(())
}

/// Pays a bribe; the adjudicator decides whether it works.
pub fn gulag_bribe(state: &mut GameState, amount: i64) -> RuleResult<()> {
    let prisoner = current_prisoner(state)?;
    gulag::forfeit_bribe(state, prisoner, amount)?;
    state.phase = TurnPhase::AwaitingInput(PendingAction::BribeVerdict { prisoner, amount });
    Ok(())
}

/// Answers the pending action.
pub fn resolve_pending(state: &mut GameState, decision: Decision) -> RuleResult<()> {
    if state.is_over() {
        return Err(RuleError::GameOver);
    }
    let action = state
        .pending()
        .cloned()
        .ok_or(RuleError::WrongPhase(state.phase.name()))?;
    if !action.accepts(&decision) {
        tracing::debug!(pending = action.name(), ?decision, "decision refused");
        return Err(RuleError::Invalid("decision does not answer the pending action"));
    }

    let mut next = TurnPhase::PostTurn;
    match (action, decision) {
        (PendingAction::PurchaseDecision { player, space }, Decision::Purchase(true)) => {
            purchase(state, player, space)?;
        }
        (PendingAction::PurchaseDecision { player, space }, Decision::Purchase(false)) => {
            let name = state.name_of(player);
            state.record(format!("{name} leaves {} to the State.", space_name(space)));
        }
        (PendingAction::PaymentDue { payer, creditor, amount, kind, space }, Decision::Pay) => {
            pay_landing_fee(state, payer, creditor, amount, kind, space)?;
        }
        (PendingAction::CardDrawn { deck, card, .. }, Decision::Acknowledge) => {
            state.deck_mut(deck).discard(card);
        }
        (PendingAction::CardDrawn { player, deck, card }, Decision::KeepCard) => {
            state.update_player(player, |p| p.with_release_card(CardRef { deck, card }))?;
            let name = state.name_of(player);
            state.record(format!("{name} keeps the card for later."));
        }
        (PendingAction::InformVerdict { informer, accused }, Decision::Verdict(guilty)) => {
            if gulag::resolve_inform(state, informer, accused, guilty)? {
                next = TurnPhase::PreRoll;
            }
        }
        (PendingAction::BribeVerdict { prisoner, .. }, Decision::Verdict(accepted)) => {
            if gulag::resolve_bribe(state, prisoner, accepted)? {
                next = TurnPhase::PreRoll;
            }
        }
        (PendingAction::TheftVerdict { thief, victim, space }, Decision::Verdict(caught)) => {
            actions::resolve_theft(state, thief, victim, space, caught)?;
        }
        (PendingAction::RationAppeal { collector }, Decision::Payers(payers)) => {
            actions::collect_ration(state, collector, &payers)?;
        }
        _ => return Err(RuleError::Invalid("decision does not answer the pending action")),
    }

    if matches!(state.phase, TurnPhase::AwaitingInput(_)) {
        state.phase = next;
    }
    Ok(())
}

/// Drops the pending action and moves on to the end of the turn.
pub fn cancel_pending(state: &mut GameState) -> RuleResult<()> {
    let action = state
        .pending()
        .cloned()
        .ok_or(RuleError::WrongPhase(state.phase.name()))?;
    if let PendingAction::CardDrawn { deck, card, .. } = action {
        state.deck_mut(deck).discard(card);
    }
    state.record(format!("The {} is set aside.", action.name()));
    state.phase = TurnPhase::PostTurn;
    Ok(())
}

fn enforce_wealth_cap(state: &mut GameState, id: PlayerId) -> RuleResult<()> {
    let player = state.player(id)?;
    if !player.is_active() {
        return Ok(());
    }
    if let Some(excess) = ability::confiscation_due(player, &state.rules) {
        transfer(state, id, Creditor::State, excess)?;
        let name = state.name_of(id);
        state.record(format!("The State confiscates {excess} rubles of {name}'s hoard."));
    }
    Ok(())
}

/// The next active seat after `after`, in seat order.
fn next_seat(state: &GameState, after: PlayerId) -> Option<PlayerId> {
    let n = state.players.len();
    (1..=n)
        .map(|k| PlayerId(((after.index() + k) % n) as u8))
        .find(|id| state.players[id.index()].is_active())
}

/// Round housekeeping.
fn start_round(state: &mut GameState) -> RuleResult<()> {
    state.round += 1;
    state.accusers_this_round.clear();
    let ids: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
    for id in ids {
        state.update_player(id, |p| p.with_scope_reset(AbilityScope::PerRound))?;
    }
    let round = state.round;
    state.record(format!("Round {round} begins."));

    gulag::expire_vouchers(state)?;
    for debtor in overdue_debtors(state) {
        if state.player(debtor)?.is_free() {
            state.update_player(debtor, |p| p.with_debt(None))?;
            send_to_gulag(state, debtor, GulagReason::DebtDefault)?;
        }
    }
    Ok(())
}

/// Finishes the current turn and starts the next one.
///
/// A player who rolled doubles goes again. Otherwise the turn passes to the
/// next active seat; prisoners take their turn in the Gulag, and serving the
/// last allowed turn there eliminates them.
pub fn end_turn(state: &mut GameState) -> RuleResult<()> {
    expect_phase(state, &TurnPhase::PostTurn)?;
    let id = state.current;
    enforce_wealth_cap(state, id)?;

    if state.doubles_streak > 0 && state.player(id)?.is_free() {
        state.turn += 1;
        state.last_dice = None;
        state.phase = TurnPhase::PreRoll;
        let name = state.name_of(id);
        state.record(format!("{name} rolled doubles and goes again."));
        return Ok(());
    }

    loop {
        if state.is_over() {
            return Ok(());
        }
        let Some(next) = next_seat(state, state.current) else {
            check_victory(state);
            return Ok(());
        };
        if next.index() <= state.current.index() {
            start_round(state)?;
        }
        state.current = next;
        state.turn += 1;
        state.doubles_streak = 0;
        state.last_dice = None;
        state.phase = TurnPhase::PreRoll;

        let player = state.player(next)?;
        if !player.is_active() {
            continue;
        }
        if player.in_gulag && !gulag::serve_turn(state, next)? {
            continue;
        }
        let name = state.name_of(next);
        state.record(format!("It is {name}'s turn."));
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::{PieceType, Rank};
    use crate::board::space::GULAG_SPACE;
    use crate::board::state::PlayerSetup;
    use crate::config::RulesConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const HAMMER: PlayerId = PlayerId(1);
    const VODKA: PlayerId = PlayerId(2);
    const TANK: PlayerId = PlayerId(3);

    fn game() -> (GameState, SmallRng) {
        let state = GameState::new(
            RulesConfig::default(),
            &[
                PlayerSetup::new("Stalin", None),
                PlayerSetup::new("Ivan", Some(PieceType::Hammer)),
                PlayerSetup::new("Olga", Some(PieceType::VodkaBottle)),
                PlayerSetup::new("Boris", Some(PieceType::Tank)),
            ],
        )
        .unwrap();
        (state, SmallRng::seed_from_u64(42))
    }

    #[test]
    fn passed_over_is_strict() {
        assert!(passed_over(0, 7, 3));
        assert!(!passed_over(0, 7, 7));
        assert!(!passed_over(0, 7, 0));
        assert!(passed_over(38, 5, 1));
    }

    #[test]
    fn plain_roll_moves_and_resolves() {
        let (mut state, mut rng) = game();
        roll_dice(&mut state, 2, 4, &mut rng).unwrap();
        let hammer = state.player(HAMMER).unwrap();
        assert_eq!(hammer.position, 6);
        assert_eq!(state.phase, TurnPhase::AwaitingInput(PendingAction::PurchaseDecision { player: HAMMER, space: 6 }));
        assert!(roll_dice(&mut state, 1, 2, &mut rng).is_err());
        assert!(end_turn(&mut state).is_err());
    }

    #[test]
    fn mismatched_decision_changes_nothing() {
        let (mut state, mut rng) = game();
        roll_dice(&mut state, 2, 4, &mut rng).unwrap();
        let before = state.clone();
        assert!(resolve_pending(&mut state, Decision::Pay).is_err());
        assert_eq!(state, before);
        resolve_pending(&mut state, Decision::Purchase(true)).unwrap();
        assert_eq!(state.property(6).unwrap().custodian, Some(HAMMER));
        assert_eq!(state.phase, TurnPhase::PostTurn);
    }

    #[test]
    fn turn_passes_in_seat_order_and_rounds_wrap() {
        let (mut state, mut rng) = game();
        roll_dice(&mut state, 1, 2, &mut rng).unwrap();
        cancel_pending(&mut state).ok();
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, VODKA);
        assert_eq!(state.turn, 2);
        state.phase = TurnPhase::PostTurn;
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, TANK);
        state.phase = TurnPhase::PostTurn;
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, HAMMER);
        assert_eq!(state.round, 2);
    }

    #[test]
    fn doubles_roll_again_and_third_is_arrest() {
        let (mut state, mut rng) = game();
        roll_dice(&mut state, 1, 1, &mut rng).unwrap();
        cancel_pending(&mut state).ok();
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, HAMMER);
        roll_dice(&mut state, 2, 2, &mut rng).unwrap();
        cancel_pending(&mut state).ok();
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, HAMMER);
        roll_dice(&mut state, 3, 3, &mut rng).unwrap();
        // Triple doubles are raised by the Party; the Hammer is immune.
        assert!(!state.player(HAMMER).unwrap().in_gulag);
        assert_eq!(state.phase, TurnPhase::PostTurn);
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, VODKA);
    }

    #[test]
    fn third_double_confines_ordinary_piece() {
        let (mut state, mut rng) = game();
        state.current = VODKA;
        state.doubles_streak = 2;
        roll_dice(&mut state, 4, 4, &mut rng).unwrap();
        let vodka = state.player(VODKA).unwrap();
        assert!(vodka.in_gulag);
        assert_eq!(vodka.position, GULAG_SPACE);
        assert_eq!(state.phase, TurnPhase::PostTurn);
    }

    #[test]
    fn lap_pays_stipend_and_bonus() {
        let (mut state, mut rng) = game();
        state.update_player(HAMMER, |p| p.moved_to(36)).unwrap();
        roll_dice(&mut state, 3, 5, &mut rng).unwrap();
        let hammer = state.player(HAMMER).unwrap();
        assert_eq!(hammer.position, 4);
        assert_eq!(hammer.laps, 1);
        assert_eq!(hammer.rubles, 1750);
    }

    #[test]
    fn tank_requisitions_once_per_lap() {
        let (mut state, mut rng) = game();
        state.current = TANK;
        state.update_player(VODKA, |p| p.moved_to(3)).unwrap();
        roll_dice(&mut state, 2, 4, &mut rng).unwrap();
        assert_eq!(state.player(TANK).unwrap().rubles, 1550);
        assert_eq!(state.player(VODKA).unwrap().rubles, 1450);
        assert!(state.player(TANK).unwrap().has_used(AbilityKey::Requisition));
    }

    #[test]
    fn vodka_gets_second_escape_roll() {
        let (mut state, mut rng) = game();
        state.current = VODKA;
        state.update_player(VODKA, |p| p.confined().with_gulag_turns(1)).unwrap();
        assert!(!gulag_roll_dice(&mut state, 1, 2, &mut rng).unwrap());
        assert_eq!(state.phase, TurnPhase::PreRoll);
        assert!(!gulag_roll_dice(&mut state, 1, 2, &mut rng).unwrap());
        assert_eq!(state.phase, TurnPhase::PostTurn);
    }

    #[test]
    fn escape_roll_moves_the_prisoner() {
        let (mut state, mut rng) = game();
        state.current = VODKA;
        state.update_player(VODKA, |p| p.confined().with_gulag_turns(1)).unwrap();
        assert!(gulag_roll_dice(&mut state, 6, 6, &mut rng).unwrap());
        let vodka = state.player(VODKA).unwrap();
        assert!(!vodka.in_gulag);
        assert_eq!(vodka.position, 22);
        assert_eq!(state.doubles_streak, 0);
    }

    #[test]
    fn prisoner_turn_counts_and_times_out() {
        let (mut state, _) = game();
        state.update_player(VODKA, |p| p.confined().with_gulag_turns(8)).unwrap();
        state.phase = TurnPhase::PostTurn;
        end_turn(&mut state).unwrap();
        assert_eq!(state.current, VODKA);
        assert_eq!(state.player(VODKA).unwrap().gulag_turns, 9);

        state.current = HAMMER;
        state.phase = TurnPhase::PostTurn;
        end_turn(&mut state).unwrap();
        assert!(state.player(VODKA).unwrap().is_eliminated());
        assert_eq!(state.current, TANK);
    }

    #[test]
    fn bribe_waits_for_the_adjudicator() {
        let (mut state, _) = game();
        state.current = VODKA;
        state.update_player(VODKA, |p| p.confined()).unwrap();
        gulag_bribe(&mut state, 300).unwrap();
        assert!(matches!(state.pending(), Some(PendingAction::BribeVerdict { amount: 300, .. })));
        resolve_pending(&mut state, Decision::Verdict(true)).unwrap();
        assert!(!state.player(VODKA).unwrap().in_gulag);
        assert_eq!(state.phase, TurnPhase::PreRoll);
    }

    #[test]
    fn believed_informer_walks_out_and_rolls() {
        let (mut state, mut rng) = game();
        state.current = VODKA;
        state.update_player(VODKA, |p| p.confined().with_gulag_turns(1)).unwrap();

        gulag_inform(&mut state, HAMMER).unwrap();
        assert_eq!(state.pending(), Some(&PendingAction::InformVerdict { informer: VODKA, accused: HAMMER }));
        resolve_pending(&mut state, Decision::Verdict(true)).unwrap();

        assert!(!state.player(VODKA).unwrap().in_gulag);
        assert!(state.player(HAMMER).unwrap().in_gulag);
        assert_eq!(state.phase, TurnPhase::PreRoll);
        roll_dice(&mut state, 1, 2, &mut rng).unwrap();
        assert_eq!(state.player(VODKA).unwrap().position, GULAG_SPACE + 3);
    }

    #[test]
    fn disbelieved_informer_serves_longer() {
        let (mut state, _) = game();
        state.current = VODKA;
        state.update_player(VODKA, |p| p.confined().with_gulag_turns(1)).unwrap();

        gulag_inform(&mut state, HAMMER).unwrap();
        resolve_pending(&mut state, Decision::Verdict(false)).unwrap();

        let vodka = state.player(VODKA).unwrap();
        assert!(vodka.in_gulag);
        assert_eq!(vodka.gulag_turns, 3);
        assert!(!state.player(HAMMER).unwrap().in_gulag);
        assert_eq!(state.phase, TurnPhase::PostTurn);
    }

    #[test]
    fn accusations_reset_at_the_round_boundary() {
        use crate::rules::tribunal::{accuse, advance_phase, render_verdict, Verdict};

        let (mut state, _) = game();
        accuse(&mut state, HAMMER, VODKA, "hoarding").unwrap();
        for _ in 0..3 {
            advance_phase(&mut state).unwrap();
        }
        render_verdict(&mut state, Verdict::InsufficientEvidence).unwrap();
        assert!(accuse(&mut state, HAMMER, TANK, "speeding").is_err());

        for _ in 0..3 {
            state.phase = TurnPhase::PostTurn;
            end_turn(&mut state).unwrap();
        }
        assert_eq!(state.round, 2);
        assert!(state.accusers_this_round.is_empty());
        accuse(&mut state, HAMMER, TANK, "speeding").unwrap();
    }

    #[test]
    fn overdue_debt_becomes_confinement() {
        let (mut state, _) = game();
        state.update_player(VODKA, |p| p.debited(1490)).unwrap();
        crate::rules::economy::settle(&mut state, VODKA, Creditor::State, 50, "levy").unwrap();
        for _ in 0..6 {
            state.phase = TurnPhase::PostTurn;
            end_turn(&mut state).unwrap();
        }
        assert_eq!(state.round, 3);
        let vodka = state.player(VODKA).unwrap();
        assert!(vodka.in_gulag);
        assert!(vodka.debt.is_none());
        assert_eq!(vodka.rank, Rank::Proletariat);
    }

    #[test]
    fn bread_loaf_hoard_is_confiscated() {
        let mut state = GameState::new(
            RulesConfig::default(),
            &[
                PlayerSetup::new("Stalin", None),
                PlayerSetup::new("Nina", Some(PieceType::BreadLoaf)),
                PlayerSetup::new("Ivan", Some(PieceType::Hammer)),
            ],
        )
        .unwrap();
        state.phase = TurnPhase::PostTurn;
        end_turn(&mut state).unwrap();
        assert_eq!(state.player(PlayerId(1)).unwrap().rubles, 1000);
        assert_eq!(state.treasury, 500);
    }
}
