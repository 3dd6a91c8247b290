//! Per-participant turn quotas.
//!
//! Every category has its own explicit counter, zero until units are
//! registered for the round. Normal turns are split into units that always
//! move alone (`other`) and per-class counts that may be grouped by
//! multi-unit movement rules.

use serde::{Deserialize, Serialize};

use crate::category::TurnCategory;
use crate::options::MultiUnitRules;

/// Ground unit classes that multi-unit movement rules can group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Battle meks.
    Mek,
    /// Ground vehicles.
    Vehicle,
    /// ProtoMeks.
    ProtoMek,
    /// Conventional and battle-armor infantry.
    Infantry,
}

impl UnitClass {
    /// Number of classes.
    pub const COUNT: usize = 4;

    /// Every class.
    pub const ALL: [Self; Self::COUNT] = [Self::Mek, Self::Vehicle, Self::ProtoMek, Self::Infantry];

    const fn index(self) -> usize {
        match self {
            Self::Mek => 0,
            Self::Vehicle => 1,
            Self::ProtoMek => 2,
            Self::Infantry => 3,
        }
    }

    /// Short name used in logs and errors.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Mek => "mek",
            Self::Vehicle => "vehicle",
            Self::ProtoMek => "protomek",
            Self::Infantry => "infantry",
        }
    }
}

/// Turn counters for one participant and one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnQuotas {
    other: u32,
    multi: [u32; UnitClass::COUNT],
    even: u32,
    space_station: u32,
    jumpship: u32,
    warship: u32,
    dropship: u32,
    small_craft: u32,
    telemissile: u32,
    aero: u32,
}

impl TurnQuotas {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            other: 0,
            multi: [0; UnitClass::COUNT],
            even: 0,
            space_station: 0,
            jumpship: 0,
            warship: 0,
            dropship: 0,
            small_craft: 0,
            telemissile: 0,
            aero: 0,
        }
    }

    /// Reset every counter to zero. Done at the start of each round.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Register one unit in `category`.
    ///
    /// A normal-category unit registered here always takes its own turn.
    pub fn increment(&mut self, category: TurnCategory) {
        self.add(category, 1);
    }

    /// Register `count` units in `category`.
    pub fn add(&mut self, category: TurnCategory, count: u32) {
        let counter = self.counter_mut(category);
        *counter = counter.saturating_add(count);
    }

    /// Register one unit of a class that multi-unit rules may group.
    pub fn increment_multi(&mut self, class: UnitClass) {
        self.add_multi(class, 1);
    }

    /// Register `count` units of a class that multi-unit rules may group.
    pub fn add_multi(&mut self, class: UnitClass, count: u32) {
        let counter = &mut self.multi[class.index()];
        *counter = counter.saturating_add(count);
    }

    /// Normal-category units that always move alone.
    #[must_use]
    pub const fn other(&self) -> u32 {
        self.other
    }

    /// Raw unit count registered for `class`.
    #[must_use]
    pub const fn multi(&self, class: UnitClass) -> u32 {
        self.multi[class.index()]
    }

    /// Normal turns owed once multi-unit groups are collapsed.
    #[must_use]
    pub fn normal_turns(&self, rules: &MultiUnitRules) -> u32 {
        UnitClass::ALL
            .into_iter()
            .map(|class| rules.turns_for(class, self.multi(class)))
            .fold(self.other, u32::saturating_add)
    }

    /// Turns owed in `category`.
    #[must_use]
    pub fn turns(&self, category: TurnCategory, rules: &MultiUnitRules) -> u32 {
        match category {
            TurnCategory::Normal => self.normal_turns(rules),
            TurnCategory::Even => self.even,
            TurnCategory::SpaceStation => self.space_station,
            TurnCategory::JumpShip => self.jumpship,
            TurnCategory::WarShip => self.warship,
            TurnCategory::DropShip => self.dropship,
            TurnCategory::SmallCraft => self.small_craft,
            TurnCategory::TeleMissile => self.telemissile,
            TurnCategory::Aero => self.aero,
        }
    }

    /// Whether no turns are owed in any category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    fn counter_mut(&mut self, category: TurnCategory) -> &mut u32 {
        match category {
            TurnCategory::Normal => &mut self.other,
            TurnCategory::Even => &mut self.even,
            TurnCategory::SpaceStation => &mut self.space_station,
            TurnCategory::JumpShip => &mut self.jumpship,
            TurnCategory::WarShip => &mut self.warship,
            TurnCategory::DropShip => &mut self.dropship,
            TurnCategory::SmallCraft => &mut self.small_craft,
            TurnCategory::TeleMissile => &mut self.telemissile,
            TurnCategory::Aero => &mut self.aero,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_quotas_are_zero() {
        let quotas = TurnQuotas::new();
        let rules = MultiUnitRules::default();
        assert!(quotas.is_empty());
        for category in TurnCategory::BUILD_ORDER {
            assert_eq!(quotas.turns(category, &rules), 0);
        }
    }

    #[test]
    fn test_increment_routes_to_category() {
        let mut quotas = TurnQuotas::new();
        let rules = MultiUnitRules::default();

        quotas.increment(TurnCategory::DropShip);
        quotas.increment(TurnCategory::DropShip);
        quotas.increment(TurnCategory::Even);
        quotas.add(TurnCategory::Aero, 4);

        assert_eq!(quotas.turns(TurnCategory::DropShip, &rules), 2);
        assert_eq!(quotas.turns(TurnCategory::Even, &rules), 1);
        assert_eq!(quotas.turns(TurnCategory::Aero, &rules), 4);
        assert_eq!(quotas.turns(TurnCategory::WarShip, &rules), 0);
    }

    #[test]
    fn test_normal_turns_collapse_multi_units() {
        let mut quotas = TurnQuotas::new();
        quotas.add(TurnCategory::Normal, 2);
        quotas.add_multi(UnitClass::Infantry, 7);
        quotas.increment_multi(UnitClass::Mek);

        let ungrouped = MultiUnitRules::default();
        assert_eq!(quotas.normal_turns(&ungrouped), 10);

        let grouped = MultiUnitRules {
            infantry: Some(3),
            ..MultiUnitRules::default()
        };
        assert_eq!(quotas.normal_turns(&grouped), 2 + 3 + 1);
        assert_eq!(quotas.other(), 2);
        assert_eq!(quotas.multi(UnitClass::Infantry), 7);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut quotas = TurnQuotas::new();
        quotas.add(TurnCategory::Normal, 3);
        quotas.add_multi(UnitClass::Vehicle, 2);
        quotas.increment(TurnCategory::SpaceStation);
        quotas.clear();
        assert!(quotas.is_empty());
    }

    #[test]
    fn test_huge_counts_saturate() {
        let mut quotas = TurnQuotas::new();
        quotas.add(TurnCategory::Normal, u32::MAX);
        quotas.increment(TurnCategory::Normal);
        quotas.add_multi(UnitClass::Mek, u32::MAX);
        quotas.increment_multi(UnitClass::Mek);

        assert_eq!(quotas.other(), u32::MAX);
        assert_eq!(quotas.multi(UnitClass::Mek), u32::MAX);
        assert_eq!(quotas.normal_turns(&MultiUnitRules::default()), u32::MAX);
    }
}
