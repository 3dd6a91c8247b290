//! Scenario runner producing per-round reports.
//!
//! Every round the runner clears all quotas, registers each participant's
//! units again, then lets the session resolve initiative and build the turn
//! order. Reports are plain serde data so the binary can print them as JSON
//! lines on stdout.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use initiative_core::participant::{ParticipantId, TurnOrdered};
use initiative_core::sequence::TurnSequenceSummary;
use initiative_core::session::{clear_quotas, InitiativeSession};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::scenario::{Scenario, ScenarioError, UnitCounts};

/// One participant's standing after a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollReport {
    /// Participant id.
    pub id: ParticipantId,
    /// Name of the team the participant plays for.
    pub team: String,
    /// Every roll this round, e.g. `"7 / 10"`.
    pub rolls: String,
    /// Most recent attempt. Ranking starts from the opening roll.
    pub latest: Option<i32>,
    /// Compensation bonus carried into the next round.
    pub compensation: u32,
}

/// Everything observable about one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Participant that won initiative.
    pub winner: Option<ParticipantId>,
    /// Team of the winning participant.
    pub winning_team: Option<String>,
    /// Participants by ascending initiative.
    pub order: Vec<ParticipantId>,
    /// Roll details in scenario order.
    pub rolls: Vec<RollReport>,
    /// Allocated turns.
    pub sequence: TurnSequenceSummary,
}

/// A full game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed the session was created with.
    pub seed: u64,
    /// One report per round.
    pub rounds: Vec<RoundReport>,
}

impl GameReport {
    /// Stable hash of the serialized report.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match serde_json::to_string(self) {
            Ok(json) => json.hash(&mut hasher),
            Err(_) => self.rounds.len().hash(&mut hasher),
        }
        hasher.finish()
    }

    /// Initiative wins per team name.
    #[must_use]
    pub fn wins_by_team(&self) -> BTreeMap<String, u32> {
        let mut wins = BTreeMap::new();
        for team in self.rounds.iter().filter_map(|r| r.winning_team.as_ref()) {
            *wins.entry(team.clone()).or_insert(0) += 1;
        }
        wins
    }

    /// Highest compensation bonus reached per team name.
    #[must_use]
    pub fn peak_compensation(&self) -> BTreeMap<String, u32> {
        let mut peaks: BTreeMap<String, u32> = BTreeMap::new();
        for roll in self.rounds.iter().flat_map(|r| &r.rolls) {
            let peak = peaks.entry(roll.team.clone()).or_insert(0);
            *peak = (*peak).max(roll.compensation);
        }
        peaks
    }
}

/// Play `scenario` with the given seed.
///
/// Teams roll as a whole unless the scenario asks for individual
/// initiative, in which case every unit rolls as its own combatant.
pub fn run_scenario(scenario: &Scenario, seed: u64) -> Result<GameReport, ScenarioError> {
    scenario.validate()?;
    let mut session = InitiativeSession::seeded(scenario.options, seed)?;
    let teams = scenario.build_teams();

    info!(
        scenario = %scenario.name,
        seed,
        rounds = scenario.rounds,
        individual = scenario.options.individual_initiative,
        "Starting game"
    );

    let rounds = if scenario.options.individual_initiative {
        let (mut combatants, units): (Vec<_>, Vec<_>) =
            scenario.build_combatants(&teams).into_iter().unzip();
        let names: Vec<String> = combatants
            .iter()
            .map(|c| team_name(scenario, c.team))
            .collect();
        play(&mut session, &mut combatants, &units, &names, scenario.rounds)?
    } else {
        let mut teams = teams;
        let units: Vec<UnitCounts> = scenario.teams.iter().map(|t| t.units).collect();
        let names: Vec<String> = scenario.teams.iter().map(|t| t.name.clone()).collect();
        play(&mut session, &mut teams, &units, &names, scenario.rounds)?
    };

    Ok(GameReport {
        scenario: scenario.name.clone(),
        seed,
        rounds,
    })
}

fn team_name(scenario: &Scenario, id: ParticipantId) -> String {
    scenario
        .teams
        .iter()
        .find(|t| ParticipantId(t.id) == id)
        .map_or_else(|| id.to_string(), |t| t.name.clone())
}

fn play<P: TurnOrdered>(
    session: &mut InitiativeSession,
    participants: &mut [P],
    units: &[UnitCounts],
    names: &[String],
    rounds: u32,
) -> Result<Vec<RoundReport>, ScenarioError> {
    let mut reports = Vec::with_capacity(rounds as usize);
    for _ in 0..rounds {
        clear_quotas(participants);
        for (participant, counts) in participants.iter_mut().zip(units) {
            counts.register(participant.quotas_mut());
        }

        let outcome = session.run_round(participants)?;
        let winning_team = outcome.winner.and_then(|winner| {
            participants
                .iter()
                .position(|p| p.id() == winner)
                .map(|i| names[i].clone())
        });
        let rolls = participants
            .iter()
            .zip(names)
            .map(|(p, team)| RollReport {
                id: p.id(),
                team: team.clone(),
                rolls: p.initiative().to_string(),
                latest: p.initiative().latest(),
                compensation: p.compensation_bonus(),
            })
            .collect();

        debug!(
            round = outcome.round,
            combined = outcome.sequence.combined_size(),
            "Round complete"
        );

        reports.push(RoundReport {
            round: outcome.round,
            winner: outcome.winner,
            winning_team,
            order: outcome.order,
            rolls,
            sequence: outcome.sequence.summary(),
        });
    }
    Ok(reports)
}

/// Run the same seed `runs` times and compare full reports.
///
/// The scenario is always played at least once.
pub fn verify_determinism(scenario: &Scenario, seed: u64, runs: u32) -> Result<bool, ScenarioError> {
    let expected = run_scenario(scenario, seed)?;
    for run in 1..runs {
        if run_scenario(scenario, seed)? != expected {
            tracing::warn!(run, "Run diverged from the first");
            return Ok(false);
        }
    }
    Ok(true)
}
