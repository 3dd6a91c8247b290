//! Initiative resolution.
//!
//! Each round every participant's roll is cleared and rolled once. Groups
//! that end up with identical rolls are rerolled among themselves, as many
//! times as it takes, before the order is final. With streak compensation on,
//! the top-level call then updates every team's compensation bonus from the
//! round's winner and the previous round's winner.
//!
//! Tie-break rerolls never include compensation: the flag is passed
//! explicitly down the recursion as [`Compensation::Disabled`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dice::Dice;
use crate::participant::{ParticipantId, TurnOrdered};

/// Whether streak compensation takes part in a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compensation {
    /// Compensation feeds the roll bonus and is updated afterwards.
    Enabled,
    /// Compensation is ignored.
    Disabled,
}

impl Compensation {
    /// Map the rule option to a compensation mode.
    #[must_use]
    pub const fn from_option(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Streak state carried from one round to the next.
///
/// Owned by a single game session so that games sharing a process never see
/// each other's winners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakHistory {
    last_round_winner: Option<ParticipantId>,
}

impl StreakHistory {
    /// Winner of the previous compensated round, if any.
    #[must_use]
    pub const fn last_round_winner(&self) -> Option<ParticipantId> {
        self.last_round_winner
    }

    /// Forget the previous winner.
    pub fn reset(&mut self) {
        self.last_round_winner = None;
    }
}

/// Clear, roll and fully tie-break initiative for one round.
///
/// Returns the participant with the highest final roll, or `None` for an
/// empty list. When `compensation` is enabled and the participants accrue
/// compensation, every compensation bonus and `history` are updated.
pub fn roll_initiative<P, D>(
    participants: &mut [P],
    dice: &mut D,
    compensation: Compensation,
    history: &mut StreakHistory,
) -> Option<ParticipantId>
where
    P: TurnOrdered,
    D: Dice + ?Sized,
{
    let compensation = if P::ACCRUES_COMPENSATION {
        compensation
    } else {
        Compensation::Disabled
    };

    for participant in participants.iter_mut() {
        participant.initiative_mut().clear();
    }

    let everyone: Vec<usize> = (0..participants.len()).collect();
    roll_and_resolve(participants, &everyone, None, dice, compensation);

    let winner = highest_roll(participants)?;
    info!(winner = %winner, "Initiative winner");

    if compensation == Compensation::Enabled {
        apply_compensation(participants, winner, history);
    }
    Some(winner)
}

/// Grant authorized rerolls, then tie-break again.
///
/// Each requested participant overwrites its latest attempt; everyone else
/// keeps theirs. Compensation takes no part in a reroll.
pub fn reroll_initiative<P, D>(participants: &mut [P], requests: &[ParticipantId], dice: &mut D)
where
    P: TurnOrdered,
    D: Dice + ?Sized,
{
    let everyone: Vec<usize> = (0..participants.len()).collect();
    roll_and_resolve(
        participants,
        &everyone,
        Some(requests),
        dice,
        Compensation::Disabled,
    );
}

/// Indices of `participants` sorted ascending by initiative.
///
/// The sort is stable, so equal rolls keep their list order.
#[must_use]
pub fn initiative_order<P: TurnOrdered>(participants: &[P]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..participants.len()).collect();
    order.sort_by(|&a, &b| participants[a].initiative().cmp(participants[b].initiative()));
    order
}

/// Participant holding the highest roll.
#[must_use]
pub fn highest_roll<P: TurnOrdered>(participants: &[P]) -> Option<ParticipantId> {
    initiative_order(participants)
        .last()
        .map(|&index| participants[index].id())
}

fn roll_and_resolve<P, D>(
    participants: &mut [P],
    members: &[usize],
    rerolls: Option<&[ParticipantId]>,
    dice: &mut D,
    compensation: Compensation,
) where
    P: TurnOrdered,
    D: Dice + ?Sized,
{
    for &index in members {
        let participant = &mut participants[index];
        let id = participant.id();
        let bonus = participant.initiative_bonus(compensation);
        let total = match rerolls {
            None => participant.initiative_mut().add_roll(dice, bonus),
            Some(requests) if requests.contains(&id) => {
                participant.initiative_mut().replace_roll(dice, bonus)
            }
            Some(_) => continue,
        };
        debug!(participant = %id, bonus, total, "Initiative roll");
    }

    catch_up(participants, members, dice);

    for group in tie_groups(participants, members) {
        debug!(
            tied = ?group.iter().map(|&i| participants[i].id()).collect::<Vec<_>>(),
            "Rerolling initiative tie"
        );
        roll_and_resolve(participants, &group, None, dice, Compensation::Disabled);
    }
}

/// Roll for members whose history another member extends.
///
/// After an authorized reroll a participant can land on the opening total of
/// a group that was already separated. It rolls once per missing attempt
/// until it either diverges or draws level, so the tie scan sees it.
fn catch_up<P, D>(participants: &mut [P], members: &[usize], dice: &mut D)
where
    P: TurnOrdered,
    D: Dice + ?Sized,
{
    loop {
        let trailing: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&index| {
                members.iter().any(|&other| {
                    participants[index]
                        .initiative()
                        .trails(participants[other].initiative())
                })
            })
            .collect();
        if trailing.is_empty() {
            return;
        }
        for index in trailing {
            let participant = &mut participants[index];
            let bonus = participant.initiative_bonus(Compensation::Disabled);
            let total = participant.initiative_mut().add_roll(dice, bonus);
            debug!(participant = %participant.id(), total, "Initiative catch-up roll");
        }
    }
}

/// Groups of two or more members sharing an identical roll.
fn tie_groups<P: TurnOrdered>(participants: &[P], members: &[usize]) -> Vec<Vec<usize>> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|&a, &b| participants[a].initiative().cmp(participants[b].initiative()));

    let mut groups = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for index in sorted {
        let continues = current
            .last()
            .is_some_and(|&prev| participants[prev].initiative() == participants[index].initiative());
        if !continues {
            if current.len() > 1 {
                groups.push(std::mem::take(&mut current));
            }
            current.clear();
        }
        current.push(index);
    }
    if current.len() > 1 {
        groups.push(current);
    }
    groups
}

fn apply_compensation<P: TurnOrdered>(
    participants: &mut [P],
    winner: ParticipantId,
    history: &mut StreakHistory,
) {
    let previous = history.last_round_winner;
    for participant in participants.iter_mut() {
        let id = participant.id();
        if id == winner {
            participant.set_compensation_bonus(0);
        } else if Some(id) != previous {
            let bonus = participant.compensation_bonus().saturating_add(1);
            participant.set_compensation_bonus(bonus);
            debug!(participant = %id, bonus, "Initiative compensation increased");
        }
    }
    history.last_round_winner = Some(winner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{ScriptedDice, SeededDice};
    use crate::participant::{Combatant, Team};

    fn teams(count: u32) -> Vec<Team> {
        (1..=count)
            .map(|i| Team::new(ParticipantId(i), format!("Team {i}")))
            .collect()
    }

    fn latest_rolls(teams: &[Team]) -> Vec<Vec<i32>> {
        teams.iter().map(|t| t.initiative.rolls().to_vec()).collect()
    }

    #[test]
    fn test_distinct_rolls_need_no_tie_break() {
        let mut teams = teams(2);
        let mut dice = ScriptedDice::new([3, 4, 5, 6]);
        let mut history = StreakHistory::default();

        let winner = roll_initiative(&mut teams, &mut dice, Compensation::Disabled, &mut history);

        assert_eq!(latest_rolls(&teams), vec![vec![7], vec![11]]);
        assert_eq!(winner, Some(ParticipantId(2)));
        assert_eq!(history.last_round_winner(), None);
    }

    #[test]
    fn test_bonus_is_added_to_roll() {
        let mut teams = vec![
            Team::new(ParticipantId(1), "Red").with_init_bonus(3),
            Team::new(ParticipantId(2), "Blue").with_init_bonus(-2),
        ];
        let mut dice = ScriptedDice::new([1, 1, 6, 6]);
        let mut history = StreakHistory::default();

        roll_initiative(&mut teams, &mut dice, Compensation::Disabled, &mut history);
        assert_eq!(latest_rolls(&teams), vec![vec![5], vec![10]]);
    }

    #[test]
    fn test_tie_rerolls_only_the_tied_group() {
        let mut teams = teams(3);
        // 7, 7, 10 then the tied pair rolls 5 and 9.
        let mut dice = ScriptedDice::new([3, 4, 4, 3, 5, 5, 2, 3, 4, 5]);
        let mut history = StreakHistory::default();

        let winner = roll_initiative(&mut teams, &mut dice, Compensation::Disabled, &mut history);

        assert_eq!(
            latest_rolls(&teams),
            vec![vec![7, 5], vec![7, 9], vec![10]]
        );
        assert_eq!(winner, Some(ParticipantId(3)));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_repeated_ties_keep_rerolling() {
        let mut teams = teams(2);
        // 8/8, then 6/6, then 12/2.
        let mut dice = ScriptedDice::new([4, 4, 5, 3, 3, 3, 2, 4, 6, 6, 1, 1]);
        let mut history = StreakHistory::default();

        roll_initiative(&mut teams, &mut dice, Compensation::Disabled, &mut history);

        assert_eq!(
            latest_rolls(&teams),
            vec![vec![8, 6, 12], vec![8, 6, 2]]
        );
        let order = initiative_order(&teams);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_tie_break_reroll_ignores_compensation() {
        let mut teams = teams(2);
        teams[0].compensation_bonus = 2;
        // Opening: 5+2=7 vs 7. Reroll without compensation: 4 vs 9.
        let mut dice = ScriptedDice::new([2, 3, 3, 4, 2, 2, 4, 5]);
        let mut history = StreakHistory::default();

        roll_initiative(&mut teams, &mut dice, Compensation::Enabled, &mut history);

        assert_eq!(latest_rolls(&teams), vec![vec![7, 4], vec![7, 9]]);
    }

    #[test]
    fn test_compensation_rewards_non_winners() {
        let mut teams = teams(3);
        let mut history = StreakHistory::default();

        // Round 1: team 3 wins; nobody won before.
        let mut dice = ScriptedDice::new([1, 2, 2, 2, 6, 6]);
        roll_initiative(&mut teams, &mut dice, Compensation::Enabled, &mut history);
        let bonuses: Vec<u32> = teams.iter().map(|t| t.compensation_bonus).collect();
        assert_eq!(bonuses, vec![1, 1, 0]);
        assert_eq!(history.last_round_winner(), Some(ParticipantId(3)));

        // Round 2: team 1 wins with totals 11, 5, 2 (bonuses 1, 1, 0).
        let mut dice = ScriptedDice::new([5, 5, 2, 2, 1, 1]);
        roll_initiative(&mut teams, &mut dice, Compensation::Enabled, &mut history);
        let bonuses: Vec<u32> = teams.iter().map(|t| t.compensation_bonus).collect();
        // Team 3 won last round, so it does not accrue.
        assert_eq!(bonuses, vec![0, 2, 0]);
        assert_eq!(history.last_round_winner(), Some(ParticipantId(1)));
    }

    #[test]
    fn test_compensation_is_skipped_for_combatants() {
        let mut combatants = vec![
            Combatant::new(ParticipantId(10), ParticipantId(1)),
            Combatant::new(ParticipantId(11), ParticipantId(2)),
        ];
        let mut dice = ScriptedDice::new([1, 1, 6, 6]);
        let mut history = StreakHistory::default();

        let winner =
            roll_initiative(&mut combatants, &mut dice, Compensation::Enabled, &mut history);

        assert_eq!(winner, Some(ParticipantId(11)));
        assert_eq!(history.last_round_winner(), None);
    }

    #[test]
    fn test_single_participant_wins_trivially() {
        let mut teams = teams(1);
        let mut dice = SeededDice::new(1);
        let mut history = StreakHistory::default();

        let winner = roll_initiative(&mut teams, &mut dice, Compensation::Enabled, &mut history);

        assert_eq!(winner, Some(ParticipantId(1)));
        assert_eq!(teams[0].initiative.len(), 1);
        assert_eq!(teams[0].compensation_bonus, 0);
    }

    #[test]
    fn test_empty_round_has_no_winner() {
        let mut teams: Vec<Team> = Vec::new();
        let mut dice = SeededDice::new(1);
        let mut history = StreakHistory::default();
        assert_eq!(
            roll_initiative(&mut teams, &mut dice, Compensation::Enabled, &mut history),
            None
        );
    }

    #[test]
    fn test_clear_happens_every_round() {
        let mut teams = teams(2);
        let mut dice = SeededDice::new(42);
        let mut history = StreakHistory::default();
        for _ in 0..5 {
            roll_initiative(&mut teams, &mut dice, Compensation::Disabled, &mut history);
            let first = &teams[0].initiative;
            let second = &teams[1].initiative;
            assert_eq!(first.len(), second.len());
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_reroll_replaces_only_requested() {
        let mut teams = teams(3);
        for (team, roll) in teams.iter_mut().zip([5, 8, 10]) {
            team.initiative = crate::roll::InitiativeRoll::from_rolls([roll]);
        }
        let mut dice = ScriptedDice::new([6, 6]);

        reroll_initiative(&mut teams, &[ParticipantId(1)], &mut dice);

        assert_eq!(latest_rolls(&teams), vec![vec![12], vec![8], vec![10]]);
        assert_eq!(teams[0].initiative.replaced_roll(), Some(5));
        assert_eq!(highest_roll(&teams), Some(ParticipantId(1)));
    }

    #[test]
    fn test_reroll_into_tie_is_resolved() {
        let mut teams = teams(2);
        teams[0].initiative = crate::roll::InitiativeRoll::from_rolls([5]);
        teams[1].initiative = crate::roll::InitiativeRoll::from_rolls([8]);
        // Reroll to 8, then the tie resolves 3 vs 11.
        let mut dice = ScriptedDice::new([4, 4, 1, 2, 5, 6]);

        reroll_initiative(&mut teams, &[ParticipantId(1)], &mut dice);

        assert_eq!(latest_rolls(&teams), vec![vec![8, 3], vec![8, 11]]);
    }

    #[test]
    fn test_reroll_onto_separated_group_rolls_again() {
        let mut teams = teams(3);
        teams[0].initiative = crate::roll::InitiativeRoll::from_rolls([7, 5]);
        teams[1].initiative = crate::roll::InitiativeRoll::from_rolls([7, 9]);
        teams[2].initiative = crate::roll::InitiativeRoll::from_rolls([10]);
        // Team 3 rerolls to 7, then catches up with a 6.
        let mut dice = ScriptedDice::new([3, 4, 1, 5]);

        reroll_initiative(&mut teams, &[ParticipantId(3)], &mut dice);

        assert_eq!(
            latest_rolls(&teams),
            vec![vec![7, 5], vec![7, 9], vec![7, 6]]
        );
        assert_eq!(initiative_order(&teams), vec![0, 2, 1]);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_catch_up_into_tie_is_resolved() {
        let mut teams = teams(3);
        teams[0].initiative = crate::roll::InitiativeRoll::from_rolls([7, 5]);
        teams[1].initiative = crate::roll::InitiativeRoll::from_rolls([7, 9]);
        teams[2].initiative = crate::roll::InitiativeRoll::from_rolls([10]);
        // Reroll to 7, catch up to 9 level with team 2, then 2 vs 12.
        let mut dice = ScriptedDice::new([3, 4, 4, 5, 1, 1, 6, 6]);

        reroll_initiative(&mut teams, &[ParticipantId(3)], &mut dice);

        assert_eq!(
            latest_rolls(&teams),
            vec![vec![7, 5], vec![7, 9, 2], vec![7, 9, 12]]
        );
        assert_eq!(highest_roll(&teams), Some(ParticipantId(3)));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_initiative_order_is_ascending() {
        let mut teams = teams(3);
        for (team, roll) in teams.iter_mut().zip([9, 4, 6]) {
            team.initiative = crate::roll::InitiativeRoll::from_rolls([roll]);
        }
        assert_eq!(initiative_order(&teams), vec![1, 2, 0]);
    }
}
