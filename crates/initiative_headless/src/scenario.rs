//! Scenario loading and configuration.
//!
//! Scenarios describe the teams taking part in a game, the units each one
//! fields every round, and the rule options the session runs under.

use std::path::Path;

use initiative_core::category::TurnCategory;
use initiative_core::error::InitiativeError;
use initiative_core::options::InitiativeOptions;
use initiative_core::participant::{Combatant, ParticipantId, Team};
use initiative_core::quota::{TurnQuotas, UnitClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Rejected by the initiative engine.
    #[error("Invalid scenario: {0}")]
    Initiative(#[from] InitiativeError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Seed used when the command line does not override it.
    #[serde(default)]
    pub seed: u64,
    /// Rounds to play.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Rule options for the session.
    #[serde(default)]
    pub options: InitiativeOptions,
    /// Participating teams.
    pub teams: Vec<TeamSetup>,
}

fn default_rounds() -> u32 {
    10
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// A two-team lance skirmish with some air support on the Blue side.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "Lance Skirmish".to_string(),
            seed: 12345,
            rounds: 10,
            options: InitiativeOptions {
                use_compensation: true,
                ..InitiativeOptions::default()
            },
            teams: vec![
                TeamSetup {
                    id: 1,
                    name: "Red".to_string(),
                    init_bonus: 0,
                    units: UnitCounts {
                        meks: 4,
                        vehicles: 2,
                        ..UnitCounts::default()
                    },
                },
                TeamSetup {
                    id: 2,
                    name: "Blue".to_string(),
                    init_bonus: 1,
                    units: UnitCounts {
                        meks: 3,
                        aero: 2,
                        ..UnitCounts::default()
                    },
                },
            ],
        }
    }

    /// Check rule options and team ids.
    ///
    /// With individual initiative every unit needs its own id above the
    /// highest team id, so those ids must still fit in a `u32`.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.options.validate()?;
        for (i, team) in self.teams.iter().enumerate() {
            if self.teams[..i].iter().any(|t| t.id == team.id) {
                return Err(InitiativeError::DuplicateParticipant(ParticipantId(team.id)).into());
            }
        }
        if self.options.individual_initiative {
            let highest = self.teams.iter().map(|t| u64::from(t.id)).max().unwrap_or(0);
            let units = self
                .teams
                .iter()
                .map(|t| t.units.total())
                .fold(0, u64::saturating_add);
            if highest.saturating_add(units) > u64::from(u32::MAX) {
                return Err(InitiativeError::InvalidOption(format!(
                    "{units} units after team id {highest} exceed the combatant id range"
                ))
                .into());
            }
        }
        Ok(())
    }

    /// One [`Team`] per setup, with no turns registered yet.
    #[must_use]
    pub fn build_teams(&self) -> Vec<Team> {
        self.teams
            .iter()
            .map(|setup| {
                Team::new(ParticipantId(setup.id), setup.name.clone())
                    .with_init_bonus(setup.init_bonus)
            })
            .collect()
    }

    /// One [`Combatant`] per unit, for individual initiative.
    ///
    /// Combatant ids are numbered after the highest team id so the two
    /// never collide in reports. Each combatant is paired with the single
    /// unit it moves.
    #[must_use]
    pub fn build_combatants(&self, teams: &[Team]) -> Vec<(Combatant, UnitCounts)> {
        let mut next_id = self
            .teams
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let mut combatants = Vec::new();
        for (setup, team) in self.teams.iter().zip(teams) {
            for unit in setup.units.split() {
                let mut combatant = Combatant::new(ParticipantId(next_id), team.id);
                combatant.sync_team_bonus(team);
                combatants.push((combatant, unit));
                next_id = next_id.saturating_add(1);
            }
        }
        combatants
    }
}

/// One team's setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSetup {
    /// Team id, unique within the scenario.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Aggregate initiative bonus.
    #[serde(default)]
    pub init_bonus: i32,
    /// Units fielded every round.
    #[serde(default)]
    pub units: UnitCounts,
}

/// Unit counts per movement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCounts {
    /// Battle meks.
    pub meks: u32,
    /// Ground vehicles.
    pub vehicles: u32,
    /// ProtoMeks.
    pub protomeks: u32,
    /// Infantry.
    pub infantry: u32,
    /// Normal-phase units that always move alone.
    pub other: u32,
    /// Units that move in the trailing even block.
    pub even: u32,
    /// Space stations.
    pub space_stations: u32,
    /// JumpShips.
    pub jumpships: u32,
    /// WarShips.
    pub warships: u32,
    /// DropShips.
    pub dropships: u32,
    /// Small craft.
    pub small_craft: u32,
    /// TeleMissiles.
    pub telemissiles: u32,
    /// Aerospace fighters.
    pub aero: u32,
}

impl UnitCounts {
    fn class_counts(&self) -> [(UnitClass, u32); UnitClass::COUNT] {
        [
            (UnitClass::Mek, self.meks),
            (UnitClass::Vehicle, self.vehicles),
            (UnitClass::ProtoMek, self.protomeks),
            (UnitClass::Infantry, self.infantry),
        ]
    }

    fn category_counts(&self) -> [(TurnCategory, u32); 9] {
        [
            (TurnCategory::Normal, self.other),
            (TurnCategory::Even, self.even),
            (TurnCategory::SpaceStation, self.space_stations),
            (TurnCategory::JumpShip, self.jumpships),
            (TurnCategory::WarShip, self.warships),
            (TurnCategory::DropShip, self.dropships),
            (TurnCategory::SmallCraft, self.small_craft),
            (TurnCategory::TeleMissile, self.telemissiles),
            (TurnCategory::Aero, self.aero),
        ]
    }

    /// Total number of units.
    #[must_use]
    pub fn total(&self) -> u64 {
        let classes: u64 = self.class_counts().iter().map(|&(_, n)| u64::from(n)).sum();
        let categories: u64 = self
            .category_counts()
            .iter()
            .map(|&(_, n)| u64::from(n))
            .sum();
        classes + categories
    }

    /// Register every unit in `quotas`.
    pub fn register(&self, quotas: &mut TurnQuotas) {
        for (class, count) in self.class_counts() {
            quotas.add_multi(class, count);
        }
        for (category, count) in self.category_counts() {
            quotas.add(category, count);
        }
    }

    /// Split into single-unit counts, classes first.
    #[must_use]
    pub fn split(&self) -> Vec<UnitCounts> {
        let mut units = Vec::new();
        for (class, count) in self.class_counts() {
            let mut one = UnitCounts::default();
            match class {
                UnitClass::Mek => one.meks = 1,
                UnitClass::Vehicle => one.vehicles = 1,
                UnitClass::ProtoMek => one.protomeks = 1,
                UnitClass::Infantry => one.infantry = 1,
            }
            units.extend(std::iter::repeat(one).take(count as usize));
        }
        for (category, count) in self.category_counts() {
            let mut one = UnitCounts::default();
            *one.category_mut(category) = 1;
            units.extend(std::iter::repeat(one).take(count as usize));
        }
        units
    }

    fn category_mut(&mut self, category: TurnCategory) -> &mut u32 {
        match category {
            TurnCategory::Normal => &mut self.other,
            TurnCategory::Even => &mut self.even,
            TurnCategory::SpaceStation => &mut self.space_stations,
            TurnCategory::JumpShip => &mut self.jumpships,
            TurnCategory::WarShip => &mut self.warships,
            TurnCategory::DropShip => &mut self.dropships,
            TurnCategory::SmallCraft => &mut self.small_craft,
            TurnCategory::TeleMissile => &mut self.telemissiles,
            TurnCategory::Aero => &mut self.aero,
        }
    }
}
