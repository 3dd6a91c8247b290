//! Rule options consumed by the initiative engine.
//!
//! Options are plain data with `serde` defaults so they can be embedded in
//! scenario files:
//!
//! ```
//! use initiative_core::options::InitiativeOptions;
//!
//! let options = InitiativeOptions {
//!     front_load: true,
//!     ..InitiativeOptions::default()
//! };
//! assert!(options.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{InitiativeError, Result};
use crate::quota::UnitClass;

/// Rule options for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitiativeOptions {
    /// Round turns-per-pass up instead of down, moving turns to earlier passes.
    pub front_load: bool,
    /// Apply streak compensation after each team initiative roll.
    pub use_compensation: bool,
    /// Participants are individual combatants rather than teams.
    pub individual_initiative: bool,
    /// Multi-unit movement rules used to collapse raw unit counts.
    pub multi_unit: MultiUnitRules,
}

impl InitiativeOptions {
    /// Check option values that the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.multi_unit.validate()
    }
}

/// Group sizes for classes that move several units per turn.
///
/// `None` disables multi-unit movement for that class: each unit then takes
/// its own turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiUnitRules {
    /// Meks moved per turn.
    pub mek: Option<u32>,
    /// Vehicles moved per turn.
    pub vehicle: Option<u32>,
    /// ProtoMeks moved per turn.
    pub protomek: Option<u32>,
    /// Infantry units moved per turn.
    pub infantry: Option<u32>,
}

impl MultiUnitRules {
    /// Group size for `class`, if multi-unit movement is enabled for it.
    #[must_use]
    pub const fn group_size(&self, class: UnitClass) -> Option<u32> {
        match class {
            UnitClass::Mek => self.mek,
            UnitClass::Vehicle => self.vehicle,
            UnitClass::ProtoMek => self.protomek,
            UnitClass::Infantry => self.infantry,
        }
    }

    /// Number of turns `count` units of `class` need.
    ///
    /// Grouped classes need `ceil(count / group)` turns.
    #[must_use]
    pub fn turns_for(&self, class: UnitClass, count: u32) -> u32 {
        match self.group_size(class) {
            Some(group) if group > 0 => count.div_ceil(group),
            _ => count,
        }
    }

    /// Reject zero-sized groups.
    pub fn validate(&self) -> Result<()> {
        for class in UnitClass::ALL {
            if self.group_size(class) == Some(0) {
                return Err(InitiativeError::InvalidOption(format!(
                    "{} group size must be at least 1",
                    class.short_name()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_off() {
        let options = InitiativeOptions::default();
        assert!(!options.front_load);
        assert!(!options.use_compensation);
        assert!(!options.individual_initiative);
        assert_eq!(options.multi_unit, MultiUnitRules::default());
    }

    #[test]
    fn test_turns_for_collapses_grouped_classes() {
        let rules = MultiUnitRules {
            infantry: Some(3),
            protomek: Some(5),
            ..MultiUnitRules::default()
        };
        assert_eq!(rules.turns_for(UnitClass::Infantry, 7), 3);
        assert_eq!(rules.turns_for(UnitClass::Infantry, 6), 2);
        assert_eq!(rules.turns_for(UnitClass::ProtoMek, 5), 1);
        assert_eq!(rules.turns_for(UnitClass::Mek, 4), 4);
        assert_eq!(rules.turns_for(UnitClass::Infantry, 0), 0);
    }

    #[test]
    fn test_zero_group_size_is_rejected() {
        let options = InitiativeOptions {
            multi_unit: MultiUnitRules {
                vehicle: Some(0),
                ..MultiUnitRules::default()
            },
            ..InitiativeOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert!(matches!(err, InitiativeError::InvalidOption(msg) if msg.contains("vehicle")));
    }
}
