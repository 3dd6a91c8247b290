//! Test fixtures and helpers.
//!
//! Pre-built teams and combatants for consistent testing.

use initiative_core::category::TurnCategory;
use initiative_core::participant::{Combatant, ParticipantId, Team};
use initiative_core::roll::InitiativeRoll;

/// Identifier used for the "Red" team in fixtures.
pub const RED: ParticipantId = ParticipantId(1);

/// Identifier used for the "Blue" team in fixtures.
pub const BLUE: ParticipantId = ParticipantId(2);

/// Identifier used for the "Green" team in fixtures.
pub const GREEN: ParticipantId = ParticipantId(3);

/// A team with `normal` normal turns and no roll yet.
#[must_use]
pub fn team(id: ParticipantId, name: &str, normal: u32) -> Team {
    let mut team = Team::new(id, name);
    team.quotas.add(TurnCategory::Normal, normal);
    team
}

/// A team with a fixed initiative history and `normal` normal turns.
#[must_use]
pub fn team_with_roll(id: ParticipantId, name: &str, rolls: &[i32], normal: u32) -> Team {
    let mut team = team(id, name, normal);
    team.initiative = InitiativeRoll::from_rolls(rolls.iter().copied());
    team
}

/// Red and Blue with the given normal quotas and Red holding the lower roll.
#[must_use]
pub fn red_blue(red_normal: u32, blue_normal: u32) -> Vec<Team> {
    vec![
        team_with_roll(RED, "Red", &[5], red_normal),
        team_with_roll(BLUE, "Blue", &[9], blue_normal),
    ]
}

/// `count` teams with ids starting at 1 and no turns owed.
#[must_use]
pub fn numbered_teams(count: u32) -> Vec<Team> {
    (1..=count)
        .map(|i| Team::new(ParticipantId(i), format!("Team {i}")))
        .collect()
}

/// Teams owing the given normal quotas, ids starting at 1.
#[must_use]
pub fn teams_with_normal_quotas(quotas: &[u32]) -> Vec<Team> {
    quotas
        .iter()
        .zip(1u32..)
        .map(|(&normal, i)| team(ParticipantId(i), &format!("Team {i}"), normal))
        .collect()
}

/// A combatant of `team` with a personal bonus and one normal turn.
#[must_use]
pub fn combatant(id: u32, team: &Team, personal_bonus: i32) -> Combatant {
    let mut combatant =
        Combatant::new(ParticipantId(id), team.id).with_personal_bonus(personal_bonus);
    combatant.sync_team_bonus(team);
    combatant.quotas.increment(TurnCategory::Normal);
    combatant
}
