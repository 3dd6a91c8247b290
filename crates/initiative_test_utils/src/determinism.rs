//! Determinism testing utilities.
//!
//! Provides a harness for verifying that initiative sessions produce
//! identical rounds given identical seeds and inputs.
//!
//! # Testing Strategy
//!
//! Every client of a game computes the turn order locally, so the whole
//! pipeline must be reproducible. Sources of non-determinism include:
//!
//! - **System randomness**: every die must come from the session's dice.
//! - **Unstable sorting**: participants with equal rolls must keep list order.
//! - **HashMap iteration order**: quota and report maps use ordered maps.
//! - **Shared state**: streak history must belong to a single session.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use initiative_core::category::TurnCategory;
use initiative_core::dice::Dice;
use initiative_core::participant::TurnOrdered;
use initiative_core::session::{InitiativeSession, RoundOutcome};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of rounds played per run.
    pub rounds: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Initiative is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of independent runs
/// * `rounds` - Number of steps per run
/// * `setup` - Function creating the initial state
/// * `step` - Function advancing the state by one round
/// * `hash` - Function hashing the final state
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    rounds: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..rounds {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Play `rounds` rounds and hash every outcome.
///
/// # Panics
///
/// Panics if a round fails; fixtures are expected to be valid.
pub fn play_rounds<P, D>(
    session: &mut InitiativeSession<D>,
    participants: &mut [P],
    rounds: u32,
) -> u64
where
    P: TurnOrdered,
    D: Dice,
{
    let mut hasher = DefaultHasher::new();
    for _ in 0..rounds {
        let outcome = session
            .run_round(participants)
            .expect("fixture round should succeed");
        hash_outcome(&outcome, &mut hasher);
        for participant in participants.iter() {
            participant.initiative().rolls().hash(&mut hasher);
            participant.compensation_bonus().hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Verify that sessions built by `setup` replay identically.
///
/// `setup` must create a fresh session and participant list each time.
pub fn verify_session_determinism<P, D, F>(setup: F, runs: usize, rounds: u32) -> DeterminismResult
where
    P: TurnOrdered,
    D: Dice,
    F: Fn() -> (InitiativeSession<D>, Vec<P>),
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let (mut session, mut participants) = setup();
            play_rounds(&mut session, &mut participants, rounds)
        })
        .collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    tracing::debug!(runs, rounds, is_deterministic, "Session determinism check");
    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Run `num_sessions` sessions on separate threads and collect their hashes.
///
/// Catches state leaking between games that share a process.
pub fn run_parallel_sessions<P, D, F>(
    setup: F,
    num_sessions: usize,
    rounds: u32,
) -> DeterminismResult
where
    P: TurnOrdered + Send,
    D: Dice + Send,
    F: Fn() -> (InitiativeSession<D>, Vec<P>) + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    let (mut session, mut participants) = setup();
                    play_rounds(&mut session, &mut participants, rounds)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect::<Vec<u64>>()
    });
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Hash everything observable about a round outcome.
pub fn hash_outcome<H: Hasher>(outcome: &RoundOutcome, hasher: &mut H) {
    outcome.round.hash(hasher);
    outcome.winner.hash(hasher);
    outcome.order.hash(hasher);
    outcome.sequence.combined().as_slice().hash(hasher);
    for category in TurnCategory::BUILD_ORDER {
        outcome.sequence.queue(category).as_slice().hash(hasher);
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for initiative testing.
pub mod strategies {
    use proptest::prelude::*;

    /// A single quota, zero included.
    pub fn arb_quota() -> impl Strategy<Value = u32> {
        0u32..40
    }

    /// Quotas for 1 to `max_participants` participants.
    pub fn arb_quota_set(max_participants: usize) -> impl Strategy<Value = Vec<u32>> {
        proptest::collection::vec(arb_quota(), 1..=max_participants)
    }

    /// An initiative bonus, negative values included.
    pub fn arb_bonus() -> impl Strategy<Value = i32> {
        -6i32..=6
    }

    /// Bonuses for 1 to `max_participants` teams.
    pub fn arb_bonus_set(max_participants: usize) -> impl Strategy<Value = Vec<i32>> {
        proptest::collection::vec(arb_bonus(), 1..=max_participants)
    }
}
