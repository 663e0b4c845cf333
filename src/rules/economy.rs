//! Quotas, fees, transfers, debts and property management.
//!
//! Payments owed to "the State" land in the treasury. Payouts from the
//! State (lap stipends, mortgage loans, tribunal bonuses) are issued by the
//! State bank and never draw the treasury down.

use crate::board::player::{Creditor, Debt, EliminationReason, Player, PlayerId, Rank};
use crate::board::property::{Property, MAX_COLLECTIVIZATION};
use crate::board::space::{group_of, space_info, PropertyGroup, SpaceKind, STATIONS, UTILITIES};
use crate::board::state::GameState;
use crate::error::{RuleError, RuleResult};

use super::ability;
use super::elimination::eliminate;

/// Quota multiplier by collectivization level.
pub const COLLECTIVIZATION_MULTIPLIERS: [i64; 6] = [1, 3, 9, 15, 20, 30];

/// Station fee by number of stations the custodian holds.
pub const STATION_FEES: [i64; 5] = [0, 50, 100, 150, 200];

/// Dice multiplier by number of utilities the custodian holds.
pub const UTILITY_MULTIPLIERS: [i64; 3] = [0, 4, 10];

/// Proletarians pay double quota in this group.
pub const PROLETARIAT_SURCHARGE_GROUP: PropertyGroup = PropertyGroup::CollectiveFarms;

/// How a payment request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    /// The payer could not cover it and now owes a debt.
    Deferred,
    /// The payer could not cover it while already in debt.
    Bankrupt,
}

/// True if `custodian` holds every property of `group`.
pub fn owns_whole_group(state: &GameState, custodian: PlayerId, group: PropertyGroup) -> bool {
    group
        .spaces()
        .iter()
        .all(|&s| state.property(s).is_ok_and(|p| p.custodian == Some(custodian)))
}

/// True if the complete-group bonus applies to this property.
///
/// The bonus only applies while the property is uncollectivized; it never
/// stacks with a level multiplier.
pub fn group_bonus_applies(state: &GameState, property: &Property) -> bool {
    let (Some(custodian), Some(group)) = (property.custodian, group_of(property.space)) else {
        return false;
    };
    property.collectivization == 0 && owns_whole_group(state, custodian, group)
}

/// Quota owed by `payer` for an ordinary property, before any custody checks.
pub fn quota(state: &GameState, space: u8, payer: &Player) -> RuleResult<i64> {
    let property = state.property(space)?;
    let group = group_of(space).ok_or(RuleError::UnknownProperty(space))?;
    let base = space_info(space).map_or(0, |info| info.base_quota);

    let level = COLLECTIVIZATION_MULTIPLIERS[property.collectivization.min(MAX_COLLECTIVIZATION) as usize];
    let bonus = if group_bonus_applies(state, property) { 2 } else { 1 };
    let rank = if payer.rank == Rank::Proletariat && group == PROLETARIAT_SURCHARGE_GROUP { 2 } else { 1 };
    let (num, den) = ability::quota_modifier(payer, space);

    Ok(base * level * bonus * rank * num / den)
}

fn count_held(state: &GameState, custodian: PlayerId, spaces: &[u8]) -> usize {
    spaces
        .iter()
        .filter(|&&s| state.property(s).is_ok_and(|p| p.custodian == Some(custodian)))
        .count()
}

/// Fee for a station, by the number of stations its custodian holds.
pub fn station_fee(held: usize) -> i64 {
    STATION_FEES[held.min(STATION_FEES.len() - 1)]
}

/// Fee for a utility, by the number held and the dice total.
pub fn utility_fee(held: usize, dice_total: u8) -> i64 {
    UTILITY_MULTIPLIERS[held.min(UTILITY_MULTIPLIERS.len() - 1)] * dice_total as i64
}

/// The fee `payer` owes for landing on `space`, if any.
///
/// Returns None when the State holds the space, the property is mortgaged,
/// or the payer is the custodian.
pub fn fee_for(state: &GameState, space: u8, payer: PlayerId, dice_total: u8) -> RuleResult<Option<(PlayerId, i64)>> {
    let property = *state.property(space)?;
    let payer = state.player(payer)?;
    let Some(custodian) = property.custodian else {
        return Ok(None);
    };
    if custodian == payer.id || property.mortgaged {
        return Ok(None);
    }
    let fee = match property.kind() {
        Some(SpaceKind::Station) => station_fee(count_held(state, custodian, &STATIONS)),
        Some(SpaceKind::Utility) => {
            let (num, den) = ability::utility_modifier(payer);
            utility_fee(count_held(state, custodian, &UTILITIES), dice_total) * num / den
        }
        Some(SpaceKind::Property(_)) => quota(state, space, payer)?,
        _ => return Err(RuleError::UnknownProperty(space)),
    };
    Ok(Some((custodian, fee)))
}

/// Moves rubles from a player to a creditor. No affordability check.
///
/// Each side is re-read just before it is written.
pub fn transfer(state: &mut GameState, from: PlayerId, to: Creditor, amount: i64) -> RuleResult<()> {
    state.player(from)?;
    if let Creditor::Player(to) = to {
        state.player(to)?;
    }
    state.update_player(from, |p| p.debited(amount))?;
    match to {
        Creditor::State => state.adjust_treasury(amount),
        Creditor::Player(to) => state.update_player(to, |p| p.credited(amount))?,
    }
    Ok(())
}

/// Pays a State-issued amount to a player.
pub fn grant(state: &mut GameState, to: PlayerId, amount: i64) -> RuleResult<()> {
    state.update_player(to, |p| p.credited(amount))
}

/// Requests a payment. An unaffordable payment becomes a debt; a second
/// unaffordable payment while a debt is outstanding bankrupts the payer.
pub fn settle(
    state: &mut GameState,
    payer: PlayerId,
    creditor: Creditor,
    amount: i64,
    reason: &str,
) -> RuleResult<PaymentOutcome> {
    let player = state.player(payer)?;
    if player.rubles >= amount {
        transfer(state, payer, creditor, amount)?;
        return Ok(PaymentOutcome::Paid);
    }
    if player.debt.is_some() {
        eliminate(state, payer, EliminationReason::Bankruptcy)?;
        return Ok(PaymentOutcome::Bankrupt);
    }
    create_debt(state, payer, creditor, amount, reason)?;
    Ok(PaymentOutcome::Deferred)
}

/// Records a debt on the debtor, stamped with the current round.
pub fn create_debt(
    state: &mut GameState,
    debtor: PlayerId,
    creditor: Creditor,
    amount: i64,
    reason: &str,
) -> RuleResult<()> {
    let debt = Debt {
        debtor,
        creditor,
        amount,
        created_round: state.round,
        reason: reason.to_string(),
    };
    state.update_player(debtor, |p| p.with_debt(Some(debt)))?;
    let name = state.name_of(debtor);
    state.record(format!("{name} cannot pay {amount} rubles ({reason}) and goes into debt."));
    Ok(())
}

/// Pays off the debtor's outstanding debt in full.
pub fn pay_debt(state: &mut GameState, debtor: PlayerId) -> RuleResult<()> {
    let player = state.player(debtor)?;
    let debt = player.debt.clone().ok_or(RuleError::Invalid("no outstanding debt"))?;
    if player.rubles < debt.amount {
        return Err(RuleError::InsufficientFunds { player: debtor, required: debt.amount, available: player.rubles });
    }
    let creditor = live_creditor(state, debt.creditor)?;
    transfer(state, debtor, creditor, debt.amount)?;
    state.update_player(debtor, |p| p.with_debt(None))?;
    let name = state.name_of(debtor);
    state.record(format!("{name} settles a debt of {} rubles.", debt.amount));
    Ok(())
}

/// The creditor a claim is paid to now. A creditor who left the game
/// forfeits the claim to the State.
pub fn live_creditor(state: &GameState, creditor: Creditor) -> RuleResult<Creditor> {
    match creditor {
        Creditor::Player(id) if !state.player(id)?.is_active() => Ok(Creditor::State),
        other => Ok(other),
    }
}

/// Debtors whose debt has gone unpaid for a full round.
pub fn overdue_debtors(state: &GameState) -> Vec<PlayerId> {
    state
        .active_players()
        .filter(|p| p.debt.as_ref().is_some_and(|d| state.round >= d.created_round + 2))
        .map(|p| p.id)
        .collect()
}

/// Buys a State-held property at list price.
pub fn purchase(state: &mut GameState, buyer: PlayerId, space: u8) -> RuleResult<()> {
    let property = *state.property(space)?;
    let player = state.player(buyer)?;
    if property.custodian.is_some() || !ability::may_hold(player, space) {
        return Err(RuleError::NotEligible(buyer));
    }
    let price = property.price();
    if player.rubles < price {
        return Err(RuleError::InsufficientFunds { player: buyer, required: price, available: player.rubles });
    }
    transfer(state, buyer, Creditor::State, price)?;
    assign_custody(state, space, Some(buyer))?;
    let name = state.name_of(buyer);
    state.record(format!("{name} takes custody of {} for {price} rubles.", space_name(space)));
    Ok(())
}

/// Moves custody of a property, keeping both player records in sync.
///
/// Fails if the new custodian is barred from the property.
pub fn assign_custody(state: &mut GameState, space: u8, to: Option<PlayerId>) -> RuleResult<()> {
    let property = *state.property(space)?;
    if let Some(to) = to {
        if ability::is_excluded(state.player(to)?, space) {
            return Err(RuleError::NotEligible(to));
        }
    }
    if let Some(from) = property.custodian {
        state.update_player(from, |p| p.without_property(space))?;
    }
    match to {
        Some(to) => {
            state.update_player(to, |p| p.with_property(space))?;
            state.update_property(space, |p| p.with_custodian(Some(to)))?;
        }
        None => state.update_property(space, |p| p.returned_to_state())?,
    }
    Ok(())
}

fn require_custodian(state: &GameState, player: PlayerId, space: u8) -> RuleResult<Property> {
    let property = *state.property(space)?;
    if property.custodian != Some(player) || !state.player(player)?.is_active() {
        return Err(RuleError::NotEligible(player));
    }
    Ok(property)
}

/// Mortgages an uncollectivized property for half its price.
pub fn mortgage(state: &mut GameState, player: PlayerId, space: u8) -> RuleResult<()> {
    let property = require_custodian(state, player, space)?;
    if property.mortgaged {
        return Err(RuleError::Invalid("already mortgaged"));
    }
    if let Some(group) = group_of(space) {
        let improved = group
            .spaces()
            .iter()
            .any(|&s| state.property(s).is_ok_and(|p| p.collectivization > 0));
        if improved {
            return Err(RuleError::Invalid("decollectivize the group first"));
        }
    }
    let loan = property.price() / 2;
    state.update_property(space, |p| p.mortgaged())?;
    grant(state, player, loan)?;
    let name = state.name_of(player);
    state.record(format!("{name} mortgages {} for {loan} rubles.", space_name(space)));
    Ok(())
}

/// Lifts a mortgage for its loan plus ten percent.
pub fn unmortgage(state: &mut GameState, player: PlayerId, space: u8) -> RuleResult<()> {
    let property = require_custodian(state, player, space)?;
    if !property.mortgaged {
        return Err(RuleError::Invalid("not mortgaged"));
    }
    let cost = property.price() / 2 * 11 / 10;
    let rubles = state.player(player)?.rubles;
    if rubles < cost {
        return Err(RuleError::InsufficientFunds { player, required: cost, available: rubles });
    }
    transfer(state, player, Creditor::State, cost)?;
    state.update_property(space, |p| p.unmortgaged())?;
    let name = state.name_of(player);
    state.record(format!("{name} lifts the mortgage on {} for {cost} rubles.", space_name(space)));
    Ok(())
}

/// Raises a property's collectivization level by one.
///
/// Requires the whole group, no mortgages in it, and even development.
pub fn collectivize(state: &mut GameState, player: PlayerId, space: u8) -> RuleResult<()> {
    let property = require_custodian(state, player, space)?;
    let group = group_of(space).ok_or(RuleError::UnknownProperty(space))?;
    if !owns_whole_group(state, player, group) {
        return Err(RuleError::Invalid("the whole group is required"));
    }
    let levels: Vec<Property> = group.spaces().iter().filter_map(|&s| state.property(s).ok().copied()).collect();
    if levels.iter().any(|p| p.mortgaged) {
        return Err(RuleError::Invalid("a property in the group is mortgaged"));
    }
    let lowest = levels.iter().map(|p| p.collectivization).min().unwrap_or(0);
    if property.collectivization >= MAX_COLLECTIVIZATION || property.collectivization > lowest {
        return Err(RuleError::Invalid("collectivize the group evenly"));
    }
    let cost = group.collectivization_cost();
    let rubles = state.player(player)?.rubles;
    if rubles < cost {
        return Err(RuleError::InsufficientFunds { player, required: cost, available: rubles });
    }
    transfer(state, player, Creditor::State, cost)?;
    let level = property.collectivization + 1;
    state.update_property(space, |p| p.with_collectivization(level))?;
    let name = state.name_of(player);
    state.record(format!("{name} collectivizes {} to level {level}.", space_name(space)));
    Ok(())
}

/// Lowers a property's collectivization level by one, refunding half the cost.
pub fn decollectivize(state: &mut GameState, player: PlayerId, space: u8) -> RuleResult<()> {
    let property = require_custodian(state, player, space)?;
    let group = group_of(space).ok_or(RuleError::UnknownProperty(space))?;
    let highest = group
        .spaces()
        .iter()
        .filter_map(|&s| state.property(s).ok().map(|p| p.collectivization))
        .max()
        .unwrap_or(0);
    if property.collectivization == 0 || property.collectivization < highest {
        return Err(RuleError::Invalid("decollectivize the group evenly"));
    }
    let level = property.collectivization - 1;
    state.update_property(space, |p| p.with_collectivization(level))?;
    grant(state, player, group.collectivization_cost() / 2)?;
    let name = state.name_of(player);
    state.record(format!("{name} decollectivizes {} to level {level}.", space_name(space)));
    Ok(())
}

/// Rubles plus the realisable value of every holding.
pub fn net_worth(state: &GameState, id: PlayerId) -> RuleResult<i64> {
    let player = state.player(id)?;
    let mut worth = player.rubles;
    for &space in &player.properties {
        let property = state.property(space)?;
        worth += if property.mortgaged { property.price() / 2 } else { property.price() };
        if let Some(group) = group_of(space) {
            worth += property.collectivization as i64 * group.collectivization_cost();
        }
    }
    Ok(worth)
}

pub fn space_name(space: u8) -> &'static str {
    space_info(space).map_or("an unknown space", |info| info.name)
}
