//! Per-game initiative session.
//!
//! The session owns everything that outlives a single round: the rule
//! options, the dice and the streak history. Each game gets its own session,
//! so several games can run side by side in one process.
//!
//! # Example
//!
//! ```
//! use initiative_core::prelude::*;
//!
//! let mut session = InitiativeSession::seeded(InitiativeOptions::default(), 7).unwrap();
//! let mut teams = vec![
//!     Team::new(ParticipantId(1), "Red"),
//!     Team::new(ParticipantId(2), "Blue"),
//! ];
//! teams[0].quotas.add(TurnCategory::Normal, 2);
//! teams[1].quotas.add(TurnCategory::Normal, 5);
//!
//! let mut outcome = session.run_round(&mut teams).unwrap();
//! assert_eq!(outcome.sequence.size(TurnCategory::Normal), 7);
//! while let Some(_marker) = outcome.sequence.next_combined() {}
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::apportion::{ensure_unique_ids, generate_turn_order};
use crate::dice::{Dice, SeededDice};
use crate::error::Result;
use crate::options::InitiativeOptions;
use crate::participant::{ParticipantId, TurnOrdered};
use crate::resolver::{
    initiative_order, reroll_initiative, roll_initiative, Compensation, StreakHistory,
};
use crate::sequence::TurnSequence;

/// Initiative state for one game.
#[derive(Debug, Clone)]
pub struct InitiativeSession<D = SeededDice> {
    options: InitiativeOptions,
    dice: D,
    history: StreakHistory,
    round: u32,
}

impl InitiativeSession<SeededDice> {
    /// Create a session rolling seeded dice.
    pub fn seeded(options: InitiativeOptions, seed: u64) -> Result<Self> {
        Self::new(options, SeededDice::new(seed))
    }
}

impl<D: Dice> InitiativeSession<D> {
    /// Create a session after validating `options`.
    pub fn new(options: InitiativeOptions, dice: D) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            dice,
            history: StreakHistory::default(),
            round: 0,
        })
    }

    /// Rule options of this game.
    #[must_use]
    pub const fn options(&self) -> &InitiativeOptions {
        &self.options
    }

    /// Number of rounds started so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Streak state carried between rounds.
    #[must_use]
    pub const fn history(&self) -> &StreakHistory {
        &self.history
    }

    /// The dice this session rolls.
    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    /// Clear, roll and tie-break initiative, then apply compensation.
    pub fn roll_initiative<P: TurnOrdered>(
        &mut self,
        participants: &mut [P],
    ) -> Result<Option<ParticipantId>> {
        ensure_unique_ids(participants)?;
        Ok(roll_initiative(
            participants,
            &mut self.dice,
            Compensation::from_option(self.options.use_compensation),
            &mut self.history,
        ))
    }

    /// Grant authorized rerolls to `requests` and tie-break again.
    pub fn reroll<P: TurnOrdered>(
        &mut self,
        participants: &mut [P],
        requests: &[ParticipantId],
    ) -> Result<()> {
        ensure_unique_ids(participants)?;
        reroll_initiative(participants, requests, &mut self.dice);
        Ok(())
    }

    /// Apportion every category using this game's options.
    pub fn generate_turn_order<P: TurnOrdered>(&self, participants: &[P]) -> Result<TurnSequence> {
        generate_turn_order(participants, &self.options)
    }

    /// Resolve initiative and build the turn order for a new round.
    ///
    /// Quotas must already be populated for the round.
    pub fn run_round<P: TurnOrdered>(&mut self, participants: &mut [P]) -> Result<RoundOutcome> {
        self.round += 1;
        let winner = self.roll_initiative(participants)?;
        let sequence = self.generate_turn_order(participants)?;
        let order = initiative_order(participants)
            .into_iter()
            .map(|index| participants[index].id())
            .collect();

        info!(
            round = self.round,
            winner = ?winner,
            turns = sequence.combined_size(),
            "Round turn order generated"
        );

        Ok(RoundOutcome {
            round: self.round,
            winner,
            order,
            sequence,
        })
    }
}

/// Reset every participant's quotas before units are registered for a round.
pub fn clear_quotas<P: TurnOrdered>(participants: &mut [P]) {
    for participant in participants {
        participant.quotas_mut().clear();
    }
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Round number, starting at 1.
    pub round: u32,
    /// Participant with the highest initiative.
    pub winner: Option<ParticipantId>,
    /// Participants by ascending initiative.
    pub order: Vec<ParticipantId>,
    /// Allocated turns.
    pub sequence: TurnSequence,
}
