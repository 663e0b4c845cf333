//! The Gulag: confinement, escape and voucher liability.
//!
//! Entry consults the ability table first (a piece may deflect or divert the
//! arrest). A confined player sits on the Gulag corner and serves one turn
//! per round; each served turn widens the set of doubles that free them, and
//! serving the configured maximum is fatal.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::board::player::{AbilityKey, Creditor, EliminationReason, PlayerId};
use crate::board::state::{GameState, TurnPhase, VoucherAgreement};
use crate::error::{RuleError, RuleResult};

use super::ability::{self, Interception};
use super::economy::{space_name, transfer};
use super::elimination::eliminate;

/// Why a player is being sent to the Gulag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GulagReason {
    EnemyOfTheState,
    TripleDoubles,
    TribunalGuilty,
    DebtDefault,
    FailedTheft,
    AdjudicatorDecree,
    StationCapture,
    ForcedLabour,
    VoucherConsequence,
}

impl GulagReason {
    /// Reasons raised by another player rather than by the State.
    pub const fn is_player_initiated(self) -> bool {
        matches!(self, GulagReason::TribunalGuilty | GulagReason::TripleDoubles)
    }

    pub const fn describe(self) -> &'static str {
        match self {
            GulagReason::EnemyOfTheState => "declared an Enemy of the State",
            GulagReason::TripleDoubles => "rolled three doubles, suspiciously lucky",
            GulagReason::TribunalGuilty => "found guilty by the tribunal",
            GulagReason::DebtDefault => "defaulted on a debt",
            GulagReason::FailedTheft => "caught stealing State property",
            GulagReason::AdjudicatorDecree => "sentenced by decree",
            GulagReason::StationCapture => "captured at the station without fare",
            GulagReason::ForcedLabour => "sent to forced labour",
            GulagReason::VoucherConsequence => "held liable for a comrade's relapse",
        }
    }
}

/// What actually happened when a player was sent to the Gulag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GulagEntry {
    Confined,
    /// A piece ability kept the player free.
    Blocked,
    /// The player was diverted to a station instead.
    Redirected { station: u8 },
}

/// Double values that free a prisoner after `turns_served` turns.
pub fn required_doubles(turns_served: u8) -> RangeInclusive<u8> {
    match turns_served {
        0 | 1 => 6..=6,
        2 => 5..=6,
        3 => 4..=6,
        4 => 3..=6,
        _ => 1..=6,
    }
}

/// Ends the current player's turn if `id` is the current player.
fn end_turn_of(state: &mut GameState, id: PlayerId) {
    if state.current == id && !matches!(state.phase, TurnPhase::GameOver) {
        state.cut_turn_short();
    }
}

/// Sends a player to the Gulag, honouring ability overrides.
pub fn send_to_gulag(state: &mut GameState, id: PlayerId, reason: GulagReason) -> RuleResult<GulagEntry> {
    let player = state.player(id)?;
    if !player.is_active() || player.in_gulag {
        return Err(RuleError::NotEligible(id));
    }
    let name = player.name.clone();

    match ability::intercept_gulag(player, reason) {
        Interception::Blocked => {
            state.record(format!("{name} would have been {} but the Party protects them.", reason.describe()));
            Ok(GulagEntry::Blocked)
        }
        Interception::Redirect { station } => {
            state.update_player(id, |p| {
                p.moved_to(station).demoted().with_ability_used(AbilityKey::StationRedirect)
            })?;
            state.record(format!(
                "{name} was {} but seizes {} instead, losing rank.",
                reason.describe(),
                space_name(station)
            ));
            end_turn_of(state, id);
            Ok(GulagEntry::Redirected { station })
        }
        Interception::None => {
            state.update_player(id, |p| p.confined().demoted())?;
            state.record(format!("{name} was {} and is sent to the Gulag.", reason.describe()));
            end_turn_of(state, id);
            enforce_voucher_liability(state, id)?;
            Ok(GulagEntry::Confined)
        }
    }
}

/// Confines whoever vouched for `prisoner` if the liability is still live.
fn enforce_voucher_liability(state: &mut GameState, prisoner: PlayerId) -> RuleResult<()> {
    let round = state.round;
    let liable: Vec<PlayerId> = state
        .vouchers
        .iter()
        .filter(|v| v.active && v.prisoner == prisoner && round <= v.expires_round)
        .map(|v| v.voucher)
        .collect();

    for agreement in state.vouchers.iter_mut() {
        if agreement.prisoner == prisoner {
            agreement.active = false;
        }
    }
    for voucher in liable {
        state.update_player(voucher, |p| p.with_voucher_liability(None))?;
        if state.player(voucher)?.is_free() {
            send_to_gulag(state, voucher, GulagReason::VoucherConsequence)?;
        }
    }
    Ok(())
}

/// Deactivates voucher agreements whose window has passed.
pub fn expire_vouchers(state: &mut GameState) -> RuleResult<()> {
    let round = state.round;
    let expired: Vec<VoucherAgreement> = state
        .vouchers
        .iter()
        .filter(|v| v.active && round > v.expires_round)
        .copied()
        .collect();
    for agreement in state.vouchers.iter_mut() {
        if agreement.active && round > agreement.expires_round {
            agreement.active = false;
        }
    }
    for agreement in expired {
        state.update_player(agreement.voucher, |p| p.with_voucher_liability(None))?;
        let (v, p) = (state.name_of(agreement.voucher), state.name_of(agreement.prisoner));
        state.record(format!("{v} is no longer liable for {p}."));
    }
    Ok(())
}

/// Counts one served turn at the start of a prisoner's turn.
///
/// Returns false if the sentence limit was reached and the player eliminated.
pub fn serve_turn(state: &mut GameState, id: PlayerId) -> RuleResult<bool> {
    let player = state.player(id)?;
    if !player.in_gulag {
        return Err(RuleError::NotEligible(id));
    }
    let turns = player.gulag_turns.saturating_add(1);
    state.update_player(id, |p| p.with_gulag_turns(turns))?;
    check_timeout(state, id)
}

fn check_timeout(state: &mut GameState, id: PlayerId) -> RuleResult<bool> {
    if state.player(id)?.gulag_turns >= state.rules.gulag_timeout {
        eliminate(state, id, EliminationReason::GulagTimeout)?;
        return Ok(false);
    }
    Ok(true)
}

fn require_prisoner(state: &GameState, id: PlayerId) -> RuleResult<()> {
    let player = state.player(id)?;
    if !player.is_active() || !player.in_gulag {
        return Err(RuleError::NotEligible(id));
    }
    Ok(())
}

/// Frees a prisoner. Returns false if the release eliminated them.
pub fn release(state: &mut GameState, id: PlayerId) -> RuleResult<bool> {
    require_prisoner(state, id)?;
    state.update_player(id, |p| p.released())?;
    let name = state.name_of(id);
    if ability::collapses_on_release(state.player(id)?) {
        state.record(format!("{name} leaves the Gulag a broken proletarian."));
        eliminate(state, id, EliminationReason::RankCollapse)?;
        return Ok(false);
    }
    state.record(format!("{name} is released from the Gulag."));
    Ok(true)
}

/// Attempts escape with a roll. Returns true if the prisoner got out.
pub fn escape_by_roll(state: &mut GameState, id: PlayerId, d1: u8, d2: u8) -> RuleResult<bool> {
    require_prisoner(state, id)?;
    let turns = state.player(id)?.gulag_turns;
    if d1 == d2 && required_doubles(turns).contains(&d1) {
        return release(state, id);
    }
    let name = state.name_of(id);
    state.record(format!("{name} rolls {d1} and {d2} and stays in the Gulag."));
    Ok(false)
}

/// Buys freedom for the fixed fee, at the cost of one rank.
pub fn escape_by_payment(state: &mut GameState, id: PlayerId) -> RuleResult<bool> {
    require_prisoner(state, id)?;
    let fee = state.rules.gulag_fee;
    let rubles = state.player(id)?.rubles;
    if rubles < fee {
        return Err(RuleError::InsufficientFunds { player: id, required: fee, available: rubles });
    }
    transfer(state, id, Creditor::State, fee)?;
    state.update_player(id, |p| p.demoted())?;
    let name = state.name_of(id);
    state.record(format!("{name} pays {fee} rubles for release."));
    release(state, id)
}

/// A free player takes liability for the prisoner for a few rounds.
pub fn escape_by_voucher(state: &mut GameState, prisoner: PlayerId, voucher: PlayerId) -> RuleResult<bool> {
    require_prisoner(state, prisoner)?;
    let guarantor = state.player(voucher)?;
    if voucher == prisoner || !guarantor.is_free() || guarantor.vouching_for.is_some() {
        return Err(RuleError::NotEligible(voucher));
    }
    let expires_round = state.round + state.rules.voucher_rounds;
    state.vouchers.push(VoucherAgreement { prisoner, voucher, expires_round, active: true });
    state.update_player(voucher, |p| p.with_voucher_liability(Some(prisoner)))?;
    let (v, p) = (state.name_of(voucher), state.name_of(prisoner));
    state.record(format!("{v} vouches for {p} until round {expires_round}."));
    release(state, prisoner)
}

/// Checks that `informer` may denounce `accused` from the Gulag.
pub fn check_inform(state: &GameState, informer: PlayerId, accused: PlayerId) -> RuleResult<()> {
    require_prisoner(state, informer)?;
    if informer == accused || !state.player(accused)?.is_free() {
        return Err(RuleError::NotEligible(accused));
    }
    Ok(())
}

/// Applies the adjudicator's verdict on an informer's denunciation.
///
/// Guilty swaps the two: the accused goes in, the informer comes out.
/// Innocent lengthens the informer's sentence.
pub fn resolve_inform(state: &mut GameState, informer: PlayerId, accused: PlayerId, guilty: bool) -> RuleResult<bool> {
    check_inform(state, informer, accused)?;
    let (i, a) = (state.name_of(informer), state.name_of(accused));
    if guilty {
        state.record(format!("The adjudicator believes {i}: {a} is guilty."));
        send_to_gulag(state, accused, GulagReason::AdjudicatorDecree)?;
        return release(state, informer);
    }
    let penalty = state.rules.inform_penalty_turns;
    let turns = state.player(informer)?.gulag_turns.saturating_add(penalty);
    state.update_player(informer, |p| p.with_gulag_turns(turns))?;
    state.record(format!("The adjudicator finds {a} innocent; {i}'s sentence grows."));
    check_timeout(state, informer)?;
    Ok(false)
}

/// Hands a bribe to the adjudicator. The money is gone whatever they decide.
pub fn forfeit_bribe(state: &mut GameState, id: PlayerId, amount: i64) -> RuleResult<()> {
    require_prisoner(state, id)?;
    if amount < state.rules.bribe_minimum {
        return Err(RuleError::Invalid("bribe below the minimum"));
    }
    let rubles = state.player(id)?.rubles;
    if rubles < amount {
        return Err(RuleError::InsufficientFunds { player: id, required: amount, available: rubles });
    }
    transfer(state, id, Creditor::State, amount)?;
    let name = state.name_of(id);
    state.record(format!("{name} slips {amount} rubles to the adjudicator."));
    Ok(())
}

/// Applies the adjudicator's answer to a bribe already paid.
pub fn resolve_bribe(state: &mut GameState, id: PlayerId, accepted: bool) -> RuleResult<bool> {
    require_prisoner(state, id)?;
    if accepted {
        return release(state, id);
    }
    let name = state.name_of(id);
    state.record(format!("The adjudicator pockets {name}'s bribe and looks away."));
    Ok(false)
}

/// Spends a held release card.
pub fn escape_by_card(state: &mut GameState, id: PlayerId) -> RuleResult<bool> {
    require_prisoner(state, id)?;
    if state.player(id)?.release_cards.is_empty() {
        return Err(RuleError::Invalid("no release card held"));
    }
    let mut card = None;
    state.update_player(id, |p| {
        let (p, taken) = p.without_release_card();
        card = taken;
        p
    })?;
    if let Some(card) = card {
        state.deck_mut(card.deck).discard(card.card);
    }
    release(state, id)
}

/// The adjudicator sends a player to the Gulag directly.
pub fn decree(state: &mut GameState, id: PlayerId, reason: GulagReason) -> RuleResult<GulagEntry> {
    if !matches!(reason, GulagReason::AdjudicatorDecree | GulagReason::ForcedLabour) {
        return Err(RuleError::Invalid("not a decree"));
    }
    send_to_gulag(state, id, reason)
}

/// The adjudicator executes a player outright.
pub fn execute(state: &mut GameState, id: PlayerId) -> RuleResult<()> {
    eliminate(state, id, EliminationReason::Execution)
}

/// The adjudicator raises a player's rank by one step.
pub fn promote(state: &mut GameState, id: PlayerId) -> RuleResult<()> {
    if !state.player(id)?.is_active() {
        return Err(RuleError::NotEligible(id));
    }
    state.update_player(id, |p| p.promoted())?;
    let player = state.player(id)?;
    let line = format!("{} is promoted to {}.", player.name, player.rank.name());
    state.record(line);
    Ok(())
}
