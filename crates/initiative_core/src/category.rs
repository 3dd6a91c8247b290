//! Turn categories.
//!
//! Each category is an independent pool of turns. The apportionment pass
//! runs once per category in [`TurnCategory::BUILD_ORDER`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// An independent pool of turns within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TurnCategory {
    /// Ground turns, including collapsed multi-unit groups.
    Normal,
    /// Turns granted only once every normal turn is used up.
    Even,
    /// Space stations.
    SpaceStation,
    /// Jumpships.
    JumpShip,
    /// Warships.
    WarShip,
    /// Dropships.
    DropShip,
    /// Small craft.
    SmallCraft,
    /// Telemissiles.
    TeleMissile,
    /// Any other aerospace unit.
    Aero,
}

impl TurnCategory {
    /// Number of categories.
    pub const COUNT: usize = 9;

    /// Every category, in apportionment order.
    ///
    /// Markers of every category except [`TurnCategory::Even`] are appended
    /// to the combined sequence in this order.
    pub const BUILD_ORDER: [Self; Self::COUNT] = [
        Self::Normal,
        Self::SpaceStation,
        Self::JumpShip,
        Self::WarShip,
        Self::DropShip,
        Self::SmallCraft,
        Self::TeleMissile,
        Self::Aero,
        Self::Even,
    ];

    /// Dense index for per-category storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Even => 1,
            Self::SpaceStation => 2,
            Self::JumpShip => 3,
            Self::WarShip => 4,
            Self::DropShip => 5,
            Self::SmallCraft => 6,
            Self::TeleMissile => 7,
            Self::Aero => 8,
        }
    }

    /// Whether markers of this category also go into the combined sequence.
    ///
    /// Even turns are consumed by a separate phase and stay in their own queue.
    #[must_use]
    pub const fn is_merged(self) -> bool {
        !matches!(self, Self::Even)
    }

    /// Whether this is one of the space-operating categories.
    #[must_use]
    pub const fn is_space(self) -> bool {
        !matches!(self, Self::Normal | Self::Even)
    }

    /// Short name used in logs and reports.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Even => "even",
            Self::SpaceStation => "space_station",
            Self::JumpShip => "jumpship",
            Self::WarShip => "warship",
            Self::DropShip => "dropship",
            Self::SmallCraft => "small_craft",
            Self::TeleMissile => "telemissile",
            Self::Aero => "aero",
        }
    }
}

impl fmt::Display for TurnCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
