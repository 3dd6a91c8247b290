//! Initiative rolls.
//!
//! An [`InitiativeRoll`] keeps every resolution attempt of a round: the
//! opening roll plus one entry per tie-break the participant took part in.
//! Ordering walks the attempts from the opening roll onwards, so the opening
//! roll separates participants from different tie groups and, inside a tie
//! group (identical history), the most recent attempt decides.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::Dice;

/// The sequence of initiative totals a participant rolled this round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitiativeRoll {
    rolls: Vec<i32>,
    /// Index and previous value of the last entry overwritten by a reroll.
    replaced: Option<(usize, i32)>,
}

impl InitiativeRoll {
    /// Create an empty roll.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rolls: Vec::new(),
            replaced: None,
        }
    }

    /// Build a roll from already-known totals, oldest first.
    pub fn from_rolls(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            replaced: None,
        }
    }

    /// Forget every attempt. Called once at the start of each round.
    pub fn clear(&mut self) {
        self.rolls.clear();
        self.replaced = None;
    }

    /// Roll 2d6, add `bonus`, and append the total as a new attempt.
    pub fn add_roll<D: Dice + ?Sized>(&mut self, dice: &mut D, bonus: i32) -> i32 {
        let total = dice.roll_2d6() + bonus;
        self.rolls.push(total);
        total
    }

    /// Roll 2d6, add `bonus`, and overwrite the most recent attempt.
    ///
    /// On an empty roll this behaves like [`InitiativeRoll::add_roll`].
    pub fn replace_roll<D: Dice + ?Sized>(&mut self, dice: &mut D, bonus: i32) -> i32 {
        let total = dice.roll_2d6() + bonus;
        let Some(last_index) = self.rolls.len().checked_sub(1) else {
            self.rolls.push(total);
            return total;
        };
        self.replaced = Some((last_index, self.rolls[last_index]));
        self.rolls[last_index] = total;
        total
    }

    /// The most recent attempt, if any.
    #[must_use]
    pub fn latest(&self) -> Option<i32> {
        self.rolls.last().copied()
    }

    /// The attempt at `index` (0 is the opening roll).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<i32> {
        self.rolls.get(index).copied()
    }

    /// All attempts, oldest first.
    #[must_use]
    pub fn rolls(&self) -> &[i32] {
        &self.rolls
    }

    /// Number of attempts recorded this round.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    /// Whether no attempt has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    /// The value an authorized reroll overwrote, if one happened this round.
    #[must_use]
    pub fn replaced_roll(&self) -> Option<i32> {
        self.replaced.map(|(_, value)| value)
    }

    /// Whether an authorized reroll happened this round.
    #[must_use]
    pub fn was_replaced(&self) -> bool {
        self.replaced.is_some()
    }

    /// Whether `other` continues this exact history with further attempts.
    ///
    /// Such a pair is still level on every attempt both have rolled, so it
    /// is not yet separated by the dice.
    #[must_use]
    pub fn trails(&self, other: &Self) -> bool {
        self.rolls.len() < other.rolls.len() && other.rolls.starts_with(&self.rolls)
    }
}

impl PartialEq for InitiativeRoll {
    fn eq(&self, other: &Self) -> bool {
        self.rolls == other.rolls
    }
}

impl Eq for InitiativeRoll {}

impl PartialOrd for InitiativeRoll {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InitiativeRoll {
    fn cmp(&self, other: &Self) -> Ordering {
        for (mine, theirs) in self.rolls.iter().zip(&other.rolls) {
            match mine.cmp(theirs) {
                Ordering::Equal => {}
                decided => return decided,
            }
        }
        // Only reachable for a trailing history, which resolution never
        // leaves behind. Keeps the order total.
        self.rolls.len().cmp(&other.rolls.len())
    }
}

impl fmt::Display for InitiativeRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rolls.is_empty() {
            return f.write_str("-");
        }
        let replaced_index = self.replaced.map(|(index, _)| index);
        for (index, roll) in self.rolls.iter().enumerate() {
            if index > 0 {
                f.write_str(" / ")?;
            }
            write!(f, "{roll}")?;
            if replaced_index == Some(index) {
                f.write_str("*")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_clear_empties_roll() {
        let mut roll = InitiativeRoll::from_rolls([7, 9]);
        roll.clear();
        assert!(roll.is_empty());
        assert_eq!(roll.latest(), None);
        assert!(!roll.was_replaced());
    }

    #[test]
    fn test_add_roll_appends_dice_plus_bonus() {
        let mut dice = ScriptedDice::new([3, 4, 6, 6]);
        let mut roll = InitiativeRoll::new();

        assert_eq!(roll.add_roll(&mut dice, 2), 9);
        assert_eq!(roll.add_roll(&mut dice, -3), 9);
        assert_eq!(roll.rolls(), &[9, 9]);
    }

    #[test]
    fn test_negative_bonus_can_go_below_zero() {
        let mut dice = ScriptedDice::new([1, 1]);
        let mut roll = InitiativeRoll::new();
        assert_eq!(roll.add_roll(&mut dice, -5), -3);
    }

    #[test]
    fn test_replace_roll_overwrites_latest_only() {
        let mut dice = ScriptedDice::new([2, 2, 5, 6]);
        let mut roll = InitiativeRoll::from_rolls([8, 6]);

        roll.replace_roll(&mut dice, 0);
        assert_eq!(roll.rolls(), &[8, 4]);
        assert_eq!(roll.replaced_roll(), Some(6));

        roll.replace_roll(&mut dice, 1);
        assert_eq!(roll.rolls(), &[8, 12]);
        assert_eq!(roll.replaced_roll(), Some(4));
    }

    #[test]
    fn test_replace_records_index_of_latest() {
        let mut dice = ScriptedDice::new([1, 2]);
        let mut roll = InitiativeRoll::from_rolls([7, 9, 11]);

        assert_eq!(roll.replace_roll(&mut dice, 0), 3);
        assert_eq!(roll.rolls(), &[7, 9, 3]);
        assert_eq!(roll.replaced_roll(), Some(11));
        assert!(roll.was_replaced());
    }

    #[test]
    fn test_trailing_history() {
        let opening = InitiativeRoll::from_rolls([7]);
        let broken = InitiativeRoll::from_rolls([7, 5]);
        let other = InitiativeRoll::from_rolls([8, 5]);

        assert!(opening.trails(&broken));
        assert!(!broken.trails(&opening));
        assert!(!opening.trails(&other));
        assert!(!opening.trails(&opening));
    }

    #[test]
    fn test_replace_on_empty_roll_appends() {
        let mut dice = ScriptedDice::new([4, 4]);
        let mut roll = InitiativeRoll::new();
        roll.replace_roll(&mut dice, 0);
        assert_eq!(roll.rolls(), &[8]);
        assert!(!roll.was_replaced());
    }

    #[test]
    fn test_opening_roll_dominates() {
        let tied_then_won = InitiativeRoll::from_rolls([7, 12]);
        let higher_opening = InitiativeRoll::from_rolls([8]);
        assert!(tied_then_won < higher_opening);
    }

    #[test]
    fn test_tie_break_decides_within_group() {
        let a = InitiativeRoll::from_rolls([7, 5]);
        let b = InitiativeRoll::from_rolls([7, 9]);
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a, InitiativeRoll::from_rolls([7, 5]));
    }

    #[test]
    fn test_sorting_orders_ascending() {
        let mut rolls = vec![
            InitiativeRoll::from_rolls([9]),
            InitiativeRoll::from_rolls([4]),
            InitiativeRoll::from_rolls([9, 3, 11]),
            InitiativeRoll::from_rolls([9, 3, 2]),
        ];
        rolls.sort();
        let latest: Vec<_> = rolls.iter().map(|r| r.rolls().to_vec()).collect();
        assert_eq!(
            latest,
            vec![vec![4], vec![9], vec![9, 3, 2], vec![9, 3, 11]]
        );
    }

    #[test]
    fn test_display_lists_attempts() {
        let mut roll = InitiativeRoll::from_rolls([7, 9]);
        assert_eq!(roll.to_string(), "7 / 9");

        let mut dice = ScriptedDice::new([5, 5]);
        roll.replace_roll(&mut dice, 0);
        assert_eq!(roll.to_string(), "7 / 10*");
        assert_eq!(InitiativeRoll::new().to_string(), "-");
    }
}
