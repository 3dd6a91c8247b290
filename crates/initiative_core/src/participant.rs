//! Participants competing for turns.
//!
//! A participant is anything that rolls initiative and is owed turns: a
//! [`Team`] under team initiative, or a single [`Combatant`] under
//! individual initiative. Both implement [`TurnOrdered`], and each computes
//! its own roll bonus through [`BonusSource`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quota::TurnQuotas;
use crate::resolver::Compensation;
use crate::roll::InitiativeRoll;

/// Stable identifier of a participant; the marker placed in turn sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Create a new participant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that contributes a flat bonus to an initiative roll.
pub trait BonusSource {
    /// Bonus added to the 2d6 total.
    ///
    /// `compensation` says whether streak compensation may contribute; it is
    /// disabled for tie-break rerolls.
    fn initiative_bonus(&self, compensation: Compensation) -> i32;
}

/// A participant in turn ordering.
pub trait TurnOrdered: BonusSource {
    /// Whether this kind of participant accrues streak compensation.
    const ACCRUES_COMPENSATION: bool;

    /// Identifier used as the turn marker.
    fn id(&self) -> ParticipantId;

    /// This round's initiative roll.
    fn initiative(&self) -> &InitiativeRoll;

    /// Mutable access to this round's initiative roll.
    fn initiative_mut(&mut self) -> &mut InitiativeRoll;

    /// Turns owed this round.
    fn quotas(&self) -> &TurnQuotas;

    /// Mutable access to the turns owed this round.
    fn quotas_mut(&mut self) -> &mut TurnQuotas;

    /// Accumulated streak compensation.
    fn compensation_bonus(&self) -> u32 {
        0
    }

    /// Overwrite the accumulated streak compensation.
    fn set_compensation_bonus(&mut self, _bonus: u32) {}
}

/// A team rolling initiative as one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Identifier.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Aggregate bonus of the team (best commander, equipment, quirks).
    pub init_bonus: i32,
    /// Bonus earned by not winning initiative in previous rounds.
    pub compensation_bonus: u32,
    /// This round's initiative roll.
    pub initiative: InitiativeRoll,
    /// Turns owed this round.
    pub quotas: TurnQuotas,
}

impl Team {
    /// Create a team with no bonus and no turns.
    #[must_use]
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            init_bonus: 0,
            compensation_bonus: 0,
            initiative: InitiativeRoll::new(),
            quotas: TurnQuotas::new(),
        }
    }

    /// Set the aggregate initiative bonus.
    #[must_use]
    pub fn with_init_bonus(mut self, bonus: i32) -> Self {
        self.init_bonus = bonus;
        self
    }

    /// Set the owed turns.
    #[must_use]
    pub fn with_quotas(mut self, quotas: TurnQuotas) -> Self {
        self.quotas = quotas;
        self
    }
}

impl BonusSource for Team {
    fn initiative_bonus(&self, compensation: Compensation) -> i32 {
        match compensation {
            Compensation::Enabled => {
                let streak = i32::try_from(self.compensation_bonus).unwrap_or(i32::MAX);
                self.init_bonus.saturating_add(streak)
            }
            Compensation::Disabled => self.init_bonus,
        }
    }
}

impl TurnOrdered for Team {
    const ACCRUES_COMPENSATION: bool = true;

    fn id(&self) -> ParticipantId {
        self.id
    }

    fn initiative(&self) -> &InitiativeRoll {
        &self.initiative
    }

    fn initiative_mut(&mut self) -> &mut InitiativeRoll {
        &mut self.initiative
    }

    fn quotas(&self) -> &TurnQuotas {
        &self.quotas
    }

    fn quotas_mut(&mut self) -> &mut TurnQuotas {
        &mut self.quotas
    }

    fn compensation_bonus(&self) -> u32 {
        self.compensation_bonus
    }

    fn set_compensation_bonus(&mut self, bonus: u32) {
        self.compensation_bonus = bonus;
    }
}

/// A single combatant rolling its own initiative.
///
/// Its bonus is the owning team's aggregate bonus plus a personal bonus.
/// Combatants never accrue streak compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Identifier.
    pub id: ParticipantId,
    /// Owning team.
    pub team: ParticipantId,
    /// Snapshot of the owning team's aggregate bonus.
    pub team_bonus: i32,
    /// Pilot or crew initiative bonus.
    pub personal_bonus: i32,
    /// This round's initiative roll.
    pub initiative: InitiativeRoll,
    /// Turns owed this round.
    pub quotas: TurnQuotas,
}

impl Combatant {
    /// Create a combatant owned by `team`.
    #[must_use]
    pub fn new(id: ParticipantId, team: ParticipantId) -> Self {
        Self {
            id,
            team,
            team_bonus: 0,
            personal_bonus: 0,
            initiative: InitiativeRoll::new(),
            quotas: TurnQuotas::new(),
        }
    }

    /// Set the personal initiative bonus.
    #[must_use]
    pub fn with_personal_bonus(mut self, bonus: i32) -> Self {
        self.personal_bonus = bonus;
        self
    }

    /// Set the owed turns.
    #[must_use]
    pub fn with_quotas(mut self, quotas: TurnQuotas) -> Self {
        self.quotas = quotas;
        self
    }

    /// Copy the owning team's aggregate bonus, without its compensation.
    pub fn sync_team_bonus(&mut self, team: &Team) {
        self.team_bonus = team.initiative_bonus(Compensation::Disabled);
    }
}

impl BonusSource for Combatant {
    fn initiative_bonus(&self, _compensation: Compensation) -> i32 {
        self.team_bonus.saturating_add(self.personal_bonus)
    }
}

impl TurnOrdered for Combatant {
    const ACCRUES_COMPENSATION: bool = false;

    fn id(&self) -> ParticipantId {
        self.id
    }

    fn initiative(&self) -> &InitiativeRoll {
        &self.initiative
    }

    fn initiative_mut(&mut self) -> &mut InitiativeRoll {
        &mut self.initiative
    }

    fn quotas(&self) -> &TurnQuotas {
        &self.quotas
    }

    fn quotas_mut(&mut self) -> &mut TurnQuotas {
        &mut self.quotas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_bonus_includes_compensation_only_when_enabled() {
        let mut team = Team::new(ParticipantId(1), "Red").with_init_bonus(2);
        team.set_compensation_bonus(3);

        assert_eq!(team.initiative_bonus(Compensation::Enabled), 5);
        assert_eq!(team.initiative_bonus(Compensation::Disabled), 2);
    }

    #[test]
    fn test_combatant_bonus_is_team_plus_personal() {
        let mut team = Team::new(ParticipantId(1), "Red").with_init_bonus(2);
        team.compensation_bonus = 4;

        let mut combatant = Combatant::new(ParticipantId(10), team.id).with_personal_bonus(-1);
        combatant.sync_team_bonus(&team);

        assert_eq!(combatant.initiative_bonus(Compensation::Enabled), 1);
        assert_eq!(combatant.initiative_bonus(Compensation::Disabled), 1);
    }

    #[test]
    fn test_combatant_ignores_compensation_updates() {
        let mut combatant = Combatant::new(ParticipantId(10), ParticipantId(1));
        combatant.set_compensation_bonus(5);
        assert_eq!(combatant.compensation_bonus(), 0);
        assert!(!Combatant::ACCRUES_COMPENSATION);
        assert!(Team::ACCRUES_COMPENSATION);
    }

    #[test]
    fn test_participant_id_display() {
        assert_eq!(ParticipantId::new(7).to_string(), "#7");
    }
}
