//! Piece abilities.
//!
//! A closed table keyed by piece. Every other rules module asks this module
//! how a piece bends the default rules; nothing else matches on `PieceType`.

use crate::board::player::{AbilityKey, PieceType, Player, Rank};
use crate::board::space::{group_of, nearest_station, PropertyGroup};
use crate::config::RulesConfig;

use super::gulag::GulagReason;
use super::tribunal::WitnessSide;

/// Static rule overrides for one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityProfile {
    pub piece: PieceType,
    pub title: &'static str,
    pub starting_rank: Rank,
    /// Immune to Gulag reasons raised by other players.
    pub blocks_player_gulag: bool,
    /// First confinement ever is diverted to the nearest station.
    pub station_redirect: bool,
    /// Pays half quota within this group.
    pub halved_quota_group: Option<PropertyGroup>,
    pub halved_utility_fees: bool,
    pub lap_bonus: bool,
    /// May never hold custody of this group.
    pub excluded_group: Option<PropertyGroup>,
    /// Cannot be accused by a lower-ranked player.
    pub rank_shield: bool,
    /// Must testify on this side whenever they testify.
    pub forced_witness_side: Option<WitnessSide>,
    /// Eliminated when released while at the lowest rank.
    pub collapses_at_bottom: bool,
    /// Holdings above the configured cap are confiscated.
    pub wealth_capped: bool,
    pub abilities: &'static [AbilityKey],
}

const BASE: AbilityProfile = AbilityProfile {
    piece: PieceType::Hammer,
    title: "",
    starting_rank: Rank::Proletariat,
    blocks_player_gulag: false,
    station_redirect: false,
    halved_quota_group: None,
    halved_utility_fees: false,
    lap_bonus: false,
    excluded_group: None,
    rank_shield: false,
    forced_witness_side: None,
    collapses_at_bottom: false,
    wealth_capped: false,
    abilities: &[],
};

/// The ability table, in `ALL_PIECES` order.
pub static PROFILES: [AbilityProfile; 8] = [
    AbilityProfile {
        piece: PieceType::Hammer,
        title: "Hammer: cannot be sent to the Gulag by other players; bonus on every lap",
        blocks_player_gulag: true,
        lap_bonus: true,
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::Sickle,
        title: "Sickle: half quota on Collective Farms; may harvest one cheap property; barred from the Kremlin",
        halved_quota_group: Some(PropertyGroup::CollectiveFarms),
        excluded_group: Some(PropertyGroup::Kremlin),
        abilities: &[AbilityKey::Harvest],
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::RedStar,
        title: "Red Star: starts as a party member; released at the bottom rank means execution",
        starting_rank: Rank::PartyMember,
        collapses_at_bottom: true,
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::Tank,
        title: "Tank: first arrest captures a station instead; requisitions from one passed player per lap",
        station_redirect: true,
        abilities: &[AbilityKey::StationRedirect, AbilityKey::Requisition],
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::BreadLoaf,
        title: "Bread Loaf: one ration appeal to willing comrades; hoarded wealth is confiscated",
        wealth_capped: true,
        abilities: &[AbilityKey::RationAppeal],
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::IronCurtain,
        title: "Iron Curtain: may make one property disappear back to the State",
        abilities: &[AbilityKey::Disappear],
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::VodkaBottle,
        title: "Vodka Bottle: half utility fees; a second escape roll each round",
        halved_utility_fees: true,
        abilities: &[AbilityKey::SecondEscapeRoll],
        ..BASE
    },
    AbilityProfile {
        piece: PieceType::LeninStatue,
        title: "Lenin Statue: cannot be denounced by lower ranks; always testifies for the accuser",
        rank_shield: true,
        forced_witness_side: Some(WitnessSide::Accuser),
        ..BASE
    },
];

/// Returns the profile for a piece.
pub fn profile(piece: PieceType) -> &'static AbilityProfile {
    // PROFILES is in ALL_PIECES order, which matches declaration order.
    &PROFILES[piece as usize]
}

fn profile_of(player: &Player) -> Option<&'static AbilityProfile> {
    player.piece.map(profile)
}

pub fn starting_rank(piece: PieceType) -> Rank {
    profile(piece).starting_rank
}

/// The adjudicator sits above every party rank.
pub const fn adjudicator_rank() -> Rank {
    Rank::InnerCircle
}

/// True if the piece has the named ability at all.
pub fn grants(piece: PieceType, key: AbilityKey) -> bool {
    profile(piece).abilities.contains(&key)
}

/// True if the player has the ability and has not used it in its scope.
pub fn can_use(player: &Player, key: AbilityKey) -> bool {
    player.piece.is_some_and(|piece| grants(piece, key)) && !player.has_used(key)
}

/// What happens instead of a normal confinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Confine normally.
    None,
    /// The player stays free and nothing else happens.
    Blocked,
    /// The player is moved to a station, demoted, and the redirect is spent.
    Redirect { station: u8 },
}

/// Asks whether a piece overrides a Gulag entry.
pub fn intercept_gulag(player: &Player, reason: GulagReason) -> Interception {
    let Some(profile) = profile_of(player) else {
        return Interception::None;
    };
    if profile.blocks_player_gulag && reason.is_player_initiated() {
        return Interception::Blocked;
    }
    if profile.station_redirect && !player.has_used(AbilityKey::StationRedirect) {
        return Interception::Redirect { station: nearest_station(player.position) };
    }
    Interception::None
}

/// Multiplier applied to a quota paid by `payer` on `space`, as (numerator, denominator).
pub fn quota_modifier(payer: &Player, space: u8) -> (i64, i64) {
    match (profile_of(payer), group_of(space)) {
        (Some(profile), Some(group)) if profile.halved_quota_group == Some(group) => (1, 2),
        _ => (1, 1),
    }
}

/// Multiplier applied to a utility fee paid by `payer`, as (numerator, denominator).
pub fn utility_modifier(payer: &Player) -> (i64, i64) {
    match profile_of(payer) {
        Some(profile) if profile.halved_utility_fees => (1, 2),
        _ => (1, 1),
    }
}

/// Extra stipend for completing a lap.
pub fn lap_bonus(player: &Player, rules: &RulesConfig) -> i64 {
    match profile_of(player) {
        Some(profile) if profile.lap_bonus => rules.hammer_lap_bonus,
        _ => 0,
    }
}

/// True if the piece is barred from ever holding `space`.
pub fn is_excluded(player: &Player, space: u8) -> bool {
    match (profile_of(player), group_of(space)) {
        (Some(profile), Some(group)) => profile.excluded_group == Some(group),
        _ => false,
    }
}

/// True if `player` may become custodian of `space`: not excluded by piece,
/// and of sufficient rank for the property group.
pub fn may_hold(player: &Player, space: u8) -> bool {
    if !player.is_active() || is_excluded(player, space) {
        return false;
    }
    group_of(space).map_or(true, |group| player.rank >= group.minimum_rank())
}

/// True if `accused` is shielded from an accusation by `accuser`.
pub fn shielded_from(accused: &Player, accuser: &Player) -> bool {
    profile_of(accused).is_some_and(|p| p.rank_shield) && accuser.rank < accused.rank
}

pub fn forced_witness_side(player: &Player) -> Option<WitnessSide> {
    profile_of(player).and_then(|p| p.forced_witness_side)
}

/// True if releasing this player right now eliminates them.
pub fn collapses_on_release(player: &Player) -> bool {
    profile_of(player).is_some_and(|p| p.collapses_at_bottom) && player.rank == Rank::Proletariat
}

/// The amount a wealth-capped player must surrender, if any.
pub fn confiscation_due(player: &Player, rules: &RulesConfig) -> Option<i64> {
    match profile_of(player) {
        Some(profile) if profile.wealth_capped && player.rubles > rules.bread_loaf_cap => {
            Some(player.rubles - rules.bread_loaf_cap)
        }
        _ => None,
    }
}

/// Human-readable summary of the player's abilities and what is left of them.
pub fn ability_status(player: &Player) -> String {
    let Some(profile) = profile_of(player) else {
        return "Adjudicator: renders verdicts, accepts bribes, issues decrees".to_string();
    };
    let mut out = profile.title.to_string();
    for &key in profile.abilities {
        let state = if player.has_used(key) { "used" } else { "available" };
        out.push_str(&format!("; {}: {}", key.name(), state));
    }
    out
}
