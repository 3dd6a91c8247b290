//! Turn apportionment.
//!
//! Turns of one category are handed out in passes over the participants,
//! lowest initiative first. `min` starts as the smallest non-zero quota;
//! on each pass a participant with `r` turns left places `r / min` of them
//! (`ceil(r / min)` when front-loading), then `min` drops by one. Large
//! quotas therefore spread across the passes in proportion to the smallest
//! one instead of being placed in one block, and the smallest quota always
//! appears in the first pass.
//!
//! # Example
//!
//! ```
//! use initiative_core::apportion::apportion;
//!
//! // Red (2 turns) rolled lower than Blue (5 turns).
//! let slots = apportion(&[2, 5], false).slots;
//! assert_eq!(slots, vec![0, 1, 1, 0, 1, 1, 1]);
//! ```

use std::collections::BTreeSet;

use tracing::debug;

use crate::category::TurnCategory;
use crate::error::{InitiativeError, Result};
use crate::options::InitiativeOptions;
use crate::participant::TurnOrdered;
use crate::resolver::initiative_order;
use crate::sequence::TurnSequence;

/// Result of apportioning one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Apportionment {
    /// Slot index of each placed turn, in placement order.
    pub slots: Vec<usize>,
    /// Passes the allocation loop took.
    pub passes: u32,
}

/// Distribute `quotas` (indexed by slot, lowest initiative first) into an
/// interleaved turn order.
#[must_use]
pub fn apportion(quotas: &[u32], front_load: bool) -> Apportionment {
    let mut remaining: Vec<u32> = quotas.to_vec();
    let mut total: u64 = remaining.iter().map(|&q| u64::from(q)).sum();
    let Some(mut min) = remaining.iter().copied().filter(|&q| q > 0).min() else {
        return Apportionment::default();
    };

    let mut result = Apportionment {
        slots: Vec::with_capacity(usize::try_from(total).unwrap_or(0)),
        passes: 0,
    };
    while total > 0 {
        for (slot, left) in remaining.iter_mut().enumerate() {
            if *left == 0 {
                continue;
            }
            let turns = if front_load {
                left.div_ceil(min)
            } else {
                *left / min
            };
            result
                .slots
                .extend(std::iter::repeat(slot).take(turns as usize));
            *left -= turns;
            total -= u64::from(turns);
        }
        result.passes += 1;
        debug!(pass = result.passes, min, left = total, "Apportionment pass");
        min = min.saturating_sub(1).max(1);
    }
    result
}

/// Build the round's turn sequence from every participant's quotas.
///
/// Participants are ordered by ascending initiative; each category is
/// apportioned independently in [`TurnCategory::BUILD_ORDER`].
pub fn generate_turn_order<P: TurnOrdered>(
    participants: &[P],
    options: &InitiativeOptions,
) -> Result<TurnSequence> {
    ensure_unique_ids(participants)?;

    let order = initiative_order(participants);
    let quotas_for = |category: TurnCategory| -> Vec<u32> {
        order
            .iter()
            .map(|&index| {
                participants[index]
                    .quotas()
                    .turns(category, &options.multi_unit)
            })
            .collect()
    };

    let mut sequence = TurnSequence::new(|category| {
        quotas_for(category).iter().map(|&q| q as usize).sum()
    });

    for category in TurnCategory::BUILD_ORDER {
        let allocation = apportion(&quotas_for(category), options.front_load);
        for slot in &allocation.slots {
            sequence.add(category, participants[order[*slot]].id())?;
        }
        if !allocation.slots.is_empty() {
            debug!(
                category = %category,
                markers = allocation.slots.len(),
                passes = allocation.passes,
                "Category apportioned"
            );
        }
    }
    Ok(sequence)
}

/// Reject lists where two participants share an id.
pub fn ensure_unique_ids<P: TurnOrdered>(participants: &[P]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for participant in participants {
        if !seen.insert(participant.id()) {
            return Err(InitiativeError::DuplicateParticipant(participant.id()));
        }
    }
    Ok(())
}
