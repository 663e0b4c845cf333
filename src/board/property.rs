//! Property records: custody, collectivization level and mortgage state.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::space::{space_info, SpaceKind};

/// Highest collectivization level a property can reach.
pub const MAX_COLLECTIVIZATION: u8 = 5;

/// The canonical record for one ownable space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub space: u8,
    /// None while the State holds the property.
    pub custodian: Option<PlayerId>,
    pub collectivization: u8,
    pub mortgaged: bool,
}

impl Property {
    /// Creates an unowned, unimproved record for a space.
    pub const fn state_owned(space: u8) -> Self {
        Property { space, custodian: None, collectivization: 0, mortgaged: false }
    }

    /// Returns the board kind of the underlying space.
    pub fn kind(&self) -> Option<SpaceKind> {
        space_info(self.space).map(|info| info.kind)
    }

    pub fn price(&self) -> i64 {
        space_info(self.space).map_or(0, |info| info.price)
    }

    pub fn with_custodian(mut self, custodian: Option<PlayerId>) -> Self {
        self.custodian = custodian;
        self
    }

    /// Returns the property to the State with its improvements stripped.
    pub fn returned_to_state(self) -> Self {
        Property::state_owned(self.space)
    }

    /// Mortgaging always strips collectivization.
    pub fn mortgaged(mut self) -> Self {
        self.mortgaged = true;
        self.collectivization = 0;
        self
    }

    pub fn unmortgaged(mut self) -> Self {
        self.mortgaged = false;
        self
    }

    /// Sets the level, clamped to the valid range and forced to 0 while mortgaged.
    pub fn with_collectivization(mut self, level: u8) -> Self {
        self.collectivization = if self.mortgaged { 0 } else { level.min(MAX_COLLECTIVIZATION) };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mortgage_strips_collectivization() {
        let p = Property::state_owned(6).with_collectivization(3).mortgaged();
        assert!(p.mortgaged);
        assert_eq!(p.collectivization, 0);
    }

    #[test]
    fn mortgaged_property_cannot_be_improved() {
        let p = Property::state_owned(6).mortgaged().with_collectivization(2);
        assert_eq!(p.collectivization, 0);
    }

    #[test]
    fn collectivization_is_clamped() {
        let p = Property::state_owned(39).with_collectivization(9);
        assert_eq!(p.collectivization, MAX_COLLECTIVIZATION);
    }

    #[test]
    fn return_to_state_resets_everything() {
        let p = Property::state_owned(11)
            .with_custodian(Some(PlayerId(2)))
            .with_collectivization(4)
            .returned_to_state();
        assert_eq!(p, Property::state_owned(11));
    }
}
