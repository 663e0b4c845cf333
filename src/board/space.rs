//! Board space definitions for the standard forty-space board.
//!
//! Spaces are identified by their index (0..40) clockwise from the start
//! corner. Space metadata (name, kind, price, base quota) is stored in a
//! compile-time lookup table indexed by the space id.

use serde::{Deserialize, Serialize};

use super::player::Rank;

/// The number of spaces on the board.
pub const BOARD_SIZE: u8 = 40;

/// The start corner. Passing it completes a lap.
pub const START_SPACE: u8 = 0;

/// The Gulag corner. Confined players sit here; others are only visiting.
pub const GULAG_SPACE: u8 = 10;

/// The Breadline corner, where every player contributes to the communal levy.
pub const BREADLINE_SPACE: u8 = 20;

/// The "Enemy of the State" corner, which sends the lander to the Gulag.
pub const ENEMY_SPACE: u8 = 30;

/// The four transit stations in board order.
pub const STATIONS: [u8; 4] = [5, 15, 25, 35];

/// The two utilities in board order.
pub const UTILITIES: [u8; 2] = [12, 28];

/// A colour group of ordinary properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyGroup {
    SiberianCamps,
    CollectiveFarms,
    IndustrialCentres,
    Ministries,
    MilitaryFacilities,
    MediaCentres,
    EliteResidences,
    Kremlin,
}

/// All property groups in board order.
pub const ALL_GROUPS: [PropertyGroup; 8] = [
    PropertyGroup::SiberianCamps,
    PropertyGroup::CollectiveFarms,
    PropertyGroup::IndustrialCentres,
    PropertyGroup::Ministries,
    PropertyGroup::MilitaryFacilities,
    PropertyGroup::MediaCentres,
    PropertyGroup::EliteResidences,
    PropertyGroup::Kremlin,
];

impl PropertyGroup {
    /// Returns the display name of the group.
    pub const fn name(self) -> &'static str {
        match self {
            PropertyGroup::SiberianCamps => "Siberian Camps",
            PropertyGroup::CollectiveFarms => "Collective Farms",
            PropertyGroup::IndustrialCentres => "Industrial Centres",
            PropertyGroup::Ministries => "Government Ministries",
            PropertyGroup::MilitaryFacilities => "Military Facilities",
            PropertyGroup::MediaCentres => "State Media",
            PropertyGroup::EliteResidences => "Party Elite Residences",
            PropertyGroup::Kremlin => "Kremlin Complex",
        }
    }

    /// Returns the space ids belonging to this group.
    pub const fn spaces(self) -> &'static [u8] {
        match self {
            PropertyGroup::SiberianCamps => &[1, 3],
            PropertyGroup::CollectiveFarms => &[6, 8, 9],
            PropertyGroup::IndustrialCentres => &[11, 13, 14],
            PropertyGroup::Ministries => &[16, 18, 19],
            PropertyGroup::MilitaryFacilities => &[21, 23, 24],
            PropertyGroup::MediaCentres => &[26, 27, 29],
            PropertyGroup::EliteResidences => &[31, 32, 34],
            PropertyGroup::Kremlin => &[37, 39],
        }
    }

    /// Returns the lowest rank allowed to take custody of the group.
    pub const fn minimum_rank(self) -> Rank {
        match self {
            PropertyGroup::SiberianCamps
            | PropertyGroup::CollectiveFarms
            | PropertyGroup::IndustrialCentres => Rank::Proletariat,
            PropertyGroup::Ministries | PropertyGroup::MilitaryFacilities => Rank::PartyMember,
            PropertyGroup::MediaCentres | PropertyGroup::EliteResidences => Rank::Commissar,
            PropertyGroup::Kremlin => Rank::InnerCircle,
        }
    }

    /// Returns the cost of one collectivization level, priced by board side.
    pub const fn collectivization_cost(self) -> i64 {
        match self {
            PropertyGroup::SiberianCamps | PropertyGroup::CollectiveFarms => 50,
            PropertyGroup::IndustrialCentres | PropertyGroup::Ministries => 100,
            PropertyGroup::MilitaryFacilities | PropertyGroup::MediaCentres => 150,
            PropertyGroup::EliteResidences | PropertyGroup::Kremlin => 200,
        }
    }
}

/// Which card deck a card space draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeckKind {
    PartyDirective,
    CommunistTest,
}

/// The fixed-payment spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxKind {
    RevolutionaryContribution,
    PartyDues,
}

/// Classifies a board space by how landing on it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    Start,
    Gulag,
    Breadline,
    EnemyOfTheState,
    Property(PropertyGroup),
    Station,
    Utility,
    Tax(TaxKind),
    Card(DeckKind),
}

impl SpaceKind {
    /// Returns true if the space can have a custodian.
    pub const fn is_ownable(self) -> bool {
        matches!(
            self,
            SpaceKind::Property(_) | SpaceKind::Station | SpaceKind::Utility
        )
    }
}

/// Static metadata for a board space.
pub struct SpaceInfo {
    pub name: &'static str,
    pub kind: SpaceKind,
    /// Purchase price; zero for unownable spaces.
    pub price: i64,
    /// Unimproved quota for ordinary properties; zero otherwise.
    pub base_quota: i64,
}

const fn corner(name: &'static str, kind: SpaceKind) -> SpaceInfo {
    SpaceInfo { name, kind, price: 0, base_quota: 0 }
}

const fn property(name: &'static str, group: PropertyGroup, price: i64, base_quota: i64) -> SpaceInfo {
    SpaceInfo { name, kind: SpaceKind::Property(group), price, base_quota }
}

const fn station(name: &'static str) -> SpaceInfo {
    SpaceInfo { name, kind: SpaceKind::Station, price: 200, base_quota: 0 }
}

const fn utility(name: &'static str) -> SpaceInfo {
    SpaceInfo { name, kind: SpaceKind::Utility, price: 150, base_quota: 0 }
}

const fn card(name: &'static str, deck: DeckKind) -> SpaceInfo {
    SpaceInfo { name, kind: SpaceKind::Card(deck), price: 0, base_quota: 0 }
}

const fn tax(name: &'static str, kind: TaxKind) -> SpaceInfo {
    SpaceInfo { name, kind: SpaceKind::Tax(kind), price: 0, base_quota: 0 }
}

use self::DeckKind::{CommunistTest, PartyDirective};
use self::PropertyGroup::{
    CollectiveFarms, EliteResidences, IndustrialCentres, Kremlin, MediaCentres,
    MilitaryFacilities, Ministries, SiberianCamps,
};

/// Compile-time lookup table: index by space id.
pub static SPACE_INFO: [SpaceInfo; BOARD_SIZE as usize] = [
    corner("Stop", SpaceKind::Start),
    property("Camp Vorkuta", SiberianCamps, 60, 2),
    card("Party Directive", PartyDirective),
    property("Camp Kolyma", SiberianCamps, 60, 4),
    tax("Revolutionary Contribution", TaxKind::RevolutionaryContribution),
    station("Moscow Station"),
    property("Kolkhoz No. 1", CollectiveFarms, 100, 6),
    card("Communist Test", CommunistTest),
    property("Kolkhoz No. 2", CollectiveFarms, 100, 6),
    property("Kolkhoz No. 3", CollectiveFarms, 120, 8),
    corner("Gulag", SpaceKind::Gulag),
    property("Tractor Factory", IndustrialCentres, 140, 10),
    utility("People's Power Station"),
    property("Steel Mill", IndustrialCentres, 140, 10),
    property("Munitions Plant", IndustrialCentres, 160, 12),
    station("Leningrad Station"),
    property("Ministry of Truth", Ministries, 180, 14),
    card("Party Directive", PartyDirective),
    property("Ministry of Plenty", Ministries, 180, 14),
    property("Ministry of Love", Ministries, 200, 16),
    corner("Breadline", SpaceKind::Breadline),
    property("Red Army Barracks", MilitaryFacilities, 220, 18),
    card("Communist Test", CommunistTest),
    property("Naval Yard", MilitaryFacilities, 220, 18),
    property("Missile Silo", MilitaryFacilities, 240, 20),
    station("Stalingrad Station"),
    property("Pravda Press", MediaCentres, 260, 22),
    property("Radio Moscow", MediaCentres, 260, 22),
    utility("People's Water Trust"),
    property("Propaganda Bureau", MediaCentres, 280, 24),
    corner("Enemy of the State", SpaceKind::EnemyOfTheState),
    property("Dacha Row", EliteResidences, 300, 26),
    property("Politburo Flats", EliteResidences, 300, 26),
    card("Party Directive", PartyDirective),
    property("Nomenklatura Estate", EliteResidences, 320, 28),
    station("Vladivostok Station"),
    card("Communist Test", CommunistTest),
    property("Lenin's Tomb", Kremlin, 350, 35),
    tax("Party Dues", TaxKind::PartyDues),
    property("Stalin's Office", Kremlin, 400, 50),
];

/// Returns the static metadata for a space, or None if the id is off the board.
pub fn space_info(space: u8) -> Option<&'static SpaceInfo> {
    SPACE_INFO.get(space as usize)
}

/// Returns the kind of a space, or None if the id is off the board.
pub fn space_kind(space: u8) -> Option<SpaceKind> {
    space_info(space).map(|info| info.kind)
}

/// Returns the property group of a space, if it is an ordinary property.
pub fn group_of(space: u8) -> Option<PropertyGroup> {
    match space_kind(space)? {
        SpaceKind::Property(group) => Some(group),
        _ => None,
    }
}

/// Returns every ownable space id in board order.
pub fn ownable_spaces() -> impl Iterator<Item = u8> {
    (0..BOARD_SIZE).filter(|&s| SPACE_INFO[s as usize].kind.is_ownable())
}

/// Returns the station closest to `position` by absolute board distance.
///
/// Ties resolve to the earlier station in board order.
pub fn nearest_station(position: u8) -> u8 {
    let mut best = STATIONS[0];
    for &station in &STATIONS[1..] {
        if position.abs_diff(station) < position.abs_diff(best) {
            best = station;
        }
    }
    best
}

/// Advances a position by `steps`, wrapping around the board.
///
/// Returns the new position and whether the start corner was passed or landed on.
pub fn advance(position: u8, steps: u8) -> (u8, bool) {
    let raw = position as u16 + steps as u16;
    let wrapped = (raw % BOARD_SIZE as u16) as u8;
    (wrapped, raw >= BOARD_SIZE as u16)
}
