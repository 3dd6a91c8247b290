//! # Initiative Core
//!
//! Initiative resolution and turn-order apportionment for a round-based
//! tactical game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (every die comes from a caller-owned [`dice::Dice`])
//!
//! Once per round, every participant rolls initiative, ties are rerolled
//! among the tied participants until the order is strict, and each turn
//! category is apportioned across the participants, lowest initiative
//! first. The resulting [`sequence::TurnSequence`] is drained one marker at
//! a time by the phase scheduler.
//!
//! ## Crate Structure
//!
//! - [`roll`] - Initiative rolls and their ordering
//! - [`resolver`] - Rolling, tie-breaking and streak compensation
//! - [`apportion`] - Turn apportionment across participants
//! - [`sequence`] - Bounded turn queues
//! - [`session`] - Per-game state tying it all together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod apportion;
pub mod category;
pub mod dice;
pub mod error;
pub mod options;
pub mod participant;
pub mod quota;
pub mod resolver;
pub mod roll;
pub mod sequence;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::apportion::{apportion, generate_turn_order, Apportionment};
    pub use crate::category::TurnCategory;
    pub use crate::dice::{Dice, ScriptedDice, SeededDice};
    pub use crate::error::{InitiativeError, Result};
    pub use crate::options::{InitiativeOptions, MultiUnitRules};
    pub use crate::participant::{BonusSource, Combatant, ParticipantId, Team, TurnOrdered};
    pub use crate::quota::{TurnQuotas, UnitClass};
    pub use crate::resolver::{Compensation, StreakHistory};
    pub use crate::roll::InitiativeRoll;
    pub use crate::sequence::{MarkerQueue, TurnSequence, TurnSequenceSummary};
    pub use crate::session::{clear_quotas, InitiativeSession, RoundOutcome};
}
