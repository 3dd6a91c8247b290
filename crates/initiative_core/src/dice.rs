//! Dice sources.
//!
//! The engine never touches system randomness. Every roll goes through a
//! [`Dice`] implementation owned by the caller, so a session seeded with the
//! same value replays the same rounds.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A source of six-sided die results.
pub trait Dice {
    /// Roll one die, returning a value in `1..=6`.
    fn roll_d6(&mut self) -> i32;

    /// Roll two dice and sum them.
    fn roll_2d6(&mut self) -> i32 {
        self.roll_d6() + self.roll_d6()
    }
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll_d6(&mut self) -> i32 {
        (**self).roll_d6()
    }
}

/// Deterministic dice backed by a seeded ChaCha stream.
#[derive(Debug, Clone)]
pub struct SeededDice {
    seed: u64,
    rng: ChaCha20Rng,
}

impl SeededDice {
    /// Create dice seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// The seed these dice were created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Dice for SeededDice {
    fn roll_d6(&mut self) -> i32 {
        self.rng.gen_range(1..=6)
    }
}

/// Dice that replay a fixed list of faces, then fall back to seeded dice.
///
/// Used to replay recorded rolls and to force ties in tests. Faces are
/// returned verbatim, without range checks.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: VecDeque<i32>,
    fallback: SeededDice,
}

impl ScriptedDice {
    /// Replay `faces` in order. Once exhausted, rolls come from seed 0.
    pub fn new(faces: impl IntoIterator<Item = i32>) -> Self {
        Self::with_fallback(faces, 0)
    }

    /// Replay `faces` in order, then continue from dice seeded with `seed`.
    pub fn with_fallback(faces: impl IntoIterator<Item = i32>, seed: u64) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: SeededDice::new(seed),
        }
    }

    /// Number of scripted faces not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl Dice for ScriptedDice {
    fn roll_d6(&mut self) -> i32 {
        match self.faces.pop_front() {
            Some(face) => face,
            None => self.fallback.roll_d6(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_stay_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..1000 {
            let face = dice.roll_d6();
            assert!((1..=6).contains(&face));
            let total = dice.roll_2d6();
            assert!((2..=12).contains(&total));
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededDice::new(12345);
        let mut b = SeededDice::new(12345);
        let rolls_a: Vec<i32> = (0..50).map(|_| a.roll_2d6()).collect();
        let rolls_b: Vec<i32> = (0..50).map(|_| b.roll_2d6()).collect();
        assert_eq!(rolls_a, rolls_b);
        assert_eq!(a.seed(), 12345);
    }

    #[test]
    fn test_scripted_dice_replay_then_fall_back() {
        let mut dice = ScriptedDice::with_fallback([3, 4, 6], 99);
        assert_eq!(dice.roll_2d6(), 7);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll_d6(), 6);

        let mut reference = SeededDice::new(99);
        assert_eq!(dice.roll_d6(), reference.roll_d6());
    }

    #[test]
    fn test_dice_through_mutable_reference() {
        fn roll_twice(mut dice: impl Dice) -> i32 {
            dice.roll_d6() + dice.roll_d6()
        }

        let mut dice = ScriptedDice::new([1, 2, 5]);
        assert_eq!(roll_twice(&mut dice), 3);
        assert_eq!(dice.roll_d6(), 5);
    }
}
