//! Error types for initiative resolution and turn-order generation.

use thiserror::Error;

use crate::category::TurnCategory;
use crate::participant::ParticipantId;

/// Result type alias using [`InitiativeError`].
pub type Result<T> = std::result::Result<T, InitiativeError>;

/// Top-level error type for the initiative engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitiativeError {
    /// More markers were added to a category than its declared capacity.
    ///
    /// This is a bookkeeping defect (a quota changed after the capacity was
    /// computed). The round's turn generation is aborted.
    #[error("Turn sequence overflow: {category} capacity is {capacity}")]
    CapacityExceeded {
        /// Category whose queue overflowed.
        category: TurnCategory,
        /// Capacity declared at construction.
        capacity: usize,
    },

    /// A rule option failed validation.
    #[error("Invalid rule option: {0}")]
    InvalidOption(String),

    /// Two participants share the same identifier.
    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(ParticipantId),
}
