//! Turn sequences handed to the phase scheduler.
//!
//! A [`TurnSequence`] holds one bounded queue of markers per category plus a
//! combined queue. Capacities are declared up front from the quota totals;
//! adding past a capacity is a bookkeeping defect and fails the whole
//! generation instead of truncating.
//!
//! Queues are drained front to back. A consumed marker cannot be rewound.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::category::TurnCategory;
use crate::error::{InitiativeError, Result};
use crate::participant::ParticipantId;

/// A bounded, single-pass queue of turn markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerQueue {
    markers: Vec<ParticipantId>,
    capacity: usize,
    cursor: usize,
}

impl MarkerQueue {
    /// Create an empty queue that accepts `capacity` markers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            markers: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    fn try_push(&mut self, id: ParticipantId) -> bool {
        if self.markers.len() >= self.capacity {
            return false;
        }
        self.markers.push(id);
        true
    }

    /// Whether an unconsumed marker is left.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor < self.markers.len()
    }

    /// Markers added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether no marker was ever added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Declared capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Markers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.markers.len() - self.cursor
    }

    /// Every marker, consumed or not, in order.
    #[must_use]
    pub fn as_slice(&self) -> &[ParticipantId] {
        &self.markers
    }
}

impl Iterator for MarkerQueue {
    type Item = ParticipantId;

    fn next(&mut self) -> Option<Self::Item> {
        let marker = self.markers.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(marker)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

/// Allocated turns for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequence {
    queues: Vec<MarkerQueue>,
    combined: MarkerQueue,
}

impl TurnSequence {
    /// Create empty queues with the capacity returned by `capacity_of`.
    ///
    /// The combined queue accepts the sum of every merged category.
    pub fn new(mut capacity_of: impl FnMut(TurnCategory) -> usize) -> Self {
        let mut capacities = [0usize; TurnCategory::COUNT];
        for category in TurnCategory::BUILD_ORDER {
            capacities[category.index()] = capacity_of(category);
        }
        let combined = TurnCategory::BUILD_ORDER
            .into_iter()
            .filter(|c| c.is_merged())
            .map(|c| capacities[c.index()])
            .sum();
        Self {
            queues: capacities
                .into_iter()
                .map(MarkerQueue::with_capacity)
                .collect(),
            combined: MarkerQueue::with_capacity(combined),
        }
    }

    /// Append a marker to `category` and, for merged categories, to the
    /// combined queue.
    pub fn add(&mut self, category: TurnCategory, id: ParticipantId) -> Result<()> {
        let merged = category.is_merged();
        let queue = &mut self.queues[category.index()];
        let combined_full = merged && self.combined.len() >= self.combined.capacity();
        if combined_full || !queue.try_push(id) {
            error!(
                category = %category,
                capacity = queue.capacity(),
                participant = %id,
                "Turn sequence capacity exceeded"
            );
            return Err(InitiativeError::CapacityExceeded {
                category,
                capacity: queue.capacity(),
            });
        }
        if merged {
            self.combined.try_push(id);
        }
        Ok(())
    }

    /// Whether `category` still has an unconsumed marker.
    #[must_use]
    pub fn has_more(&self, category: TurnCategory) -> bool {
        self.queues[category.index()].has_more()
    }

    /// Consume the next marker of `category`.
    pub fn next_marker(&mut self, category: TurnCategory) -> Option<ParticipantId> {
        self.queues[category.index()].next()
    }

    /// Whether the combined queue still has an unconsumed marker.
    #[must_use]
    pub fn has_more_combined(&self) -> bool {
        self.combined.has_more()
    }

    /// Consume the next marker of the combined queue.
    pub fn next_combined(&mut self) -> Option<ParticipantId> {
        self.combined.next()
    }

    /// Markers added to `category`.
    #[must_use]
    pub fn size(&self, category: TurnCategory) -> usize {
        self.queues[category.index()].len()
    }

    /// Declared capacity of `category`.
    #[must_use]
    pub fn capacity(&self, category: TurnCategory) -> usize {
        self.queues[category.index()].capacity()
    }

    /// Unconsumed markers of `category`.
    #[must_use]
    pub fn remaining(&self, category: TurnCategory) -> usize {
        self.queues[category.index()].remaining()
    }

    /// Markers in the combined queue.
    #[must_use]
    pub fn combined_size(&self) -> usize {
        self.combined.len()
    }

    /// The queue of `category`.
    #[must_use]
    pub fn queue(&self, category: TurnCategory) -> &MarkerQueue {
        &self.queues[category.index()]
    }

    /// The combined queue.
    #[must_use]
    pub fn combined(&self) -> &MarkerQueue {
        &self.combined
    }

    /// Snapshot of every non-empty queue for reports.
    #[must_use]
    pub fn summary(&self) -> TurnSequenceSummary {
        let categories = TurnCategory::BUILD_ORDER
            .into_iter()
            .filter(|&c| !self.queue(c).is_empty())
            .map(|c| (c, self.queue(c).as_slice().to_vec()))
            .collect();
        TurnSequenceSummary {
            combined: self.combined.as_slice().to_vec(),
            categories,
        }
    }
}

/// Serializable view of a [`TurnSequence`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequenceSummary {
    /// Combined queue, in production order.
    pub combined: Vec<ParticipantId>,
    /// Each non-empty category queue.
    pub categories: BTreeMap<TurnCategory, Vec<ParticipantId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: ParticipantId = ParticipantId(1);
    const BLUE: ParticipantId = ParticipantId(2);

    fn capacities(normal: usize, even: usize, aero: usize) -> TurnSequence {
        TurnSequence::new(|c| match c {
            TurnCategory::Normal => normal,
            TurnCategory::Even => even,
            TurnCategory::Aero => aero,
            _ => 0,
        })
    }

    #[test]
    fn test_combined_capacity_excludes_even() {
        let seq = capacities(3, 2, 1);
        assert_eq!(seq.capacity(TurnCategory::Normal), 3);
        assert_eq!(seq.capacity(TurnCategory::Even), 2);
        assert_eq!(seq.combined().capacity(), 4);
    }

    #[test]
    fn test_markers_drain_in_order() {
        let mut seq = capacities(3, 0, 0);
        seq.add(TurnCategory::Normal, RED).unwrap();
        seq.add(TurnCategory::Normal, BLUE).unwrap();
        seq.add(TurnCategory::Normal, RED).unwrap();

        assert!(seq.has_more(TurnCategory::Normal));
        assert_eq!(seq.next_marker(TurnCategory::Normal), Some(RED));
        assert_eq!(seq.remaining(TurnCategory::Normal), 2);
        assert_eq!(seq.next_marker(TurnCategory::Normal), Some(BLUE));
        assert_eq!(seq.next_marker(TurnCategory::Normal), Some(RED));
        assert!(!seq.has_more(TurnCategory::Normal));
        assert_eq!(seq.next_marker(TurnCategory::Normal), None);
        // Consumption never rewinds.
        assert_eq!(seq.size(TurnCategory::Normal), 3);
        assert_eq!(seq.remaining(TurnCategory::Normal), 0);
    }

    #[test]
    fn test_even_markers_stay_out_of_combined() {
        let mut seq = capacities(1, 1, 1);
        seq.add(TurnCategory::Normal, RED).unwrap();
        seq.add(TurnCategory::Even, BLUE).unwrap();
        seq.add(TurnCategory::Aero, BLUE).unwrap();

        assert_eq!(seq.combined().as_slice(), &[RED, BLUE]);
        assert_eq!(seq.queue(TurnCategory::Even).as_slice(), &[BLUE]);
        assert_eq!(seq.combined_size(), 2);
    }

    #[test]
    fn test_category_and_combined_cursors_are_independent() {
        let mut seq = capacities(2, 0, 0);
        seq.add(TurnCategory::Normal, RED).unwrap();
        seq.add(TurnCategory::Normal, BLUE).unwrap();

        assert_eq!(seq.next_combined(), Some(RED));
        assert_eq!(seq.next_marker(TurnCategory::Normal), Some(RED));
        assert_eq!(seq.next_marker(TurnCategory::Normal), Some(BLUE));
        assert!(seq.has_more_combined());
        assert_eq!(seq.next_combined(), Some(BLUE));
        assert!(!seq.has_more_combined());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut seq = capacities(1, 0, 0);
        seq.add(TurnCategory::Normal, RED).unwrap();

        let err = seq.add(TurnCategory::Normal, BLUE).unwrap_err();
        assert_eq!(
            err,
            InitiativeError::CapacityExceeded {
                category: TurnCategory::Normal,
                capacity: 1,
            }
        );
        assert_eq!(seq.size(TurnCategory::Normal), 1);
        assert_eq!(seq.combined_size(), 1);
    }

    #[test]
    fn test_zero_capacity_rejects_first_marker() {
        let mut seq = capacities(0, 0, 0);
        assert!(seq.add(TurnCategory::WarShip, RED).is_err());
        assert!(seq.add(TurnCategory::Even, RED).is_err());
    }

    #[test]
    fn test_queue_iterates_remaining_markers() {
        let mut seq = capacities(3, 0, 0);
        for id in [RED, RED, BLUE] {
            seq.add(TurnCategory::Normal, id).unwrap();
        }
        let mut queue = seq.queue(TurnCategory::Normal).clone();
        assert_eq!(queue.next(), Some(RED));
        assert_eq!(queue.size_hint(), (2, Some(2)));
        let rest: Vec<_> = queue.collect();
        assert_eq!(rest, vec![RED, BLUE]);
    }

    #[test]
    fn test_summary_lists_non_empty_queues() {
        let mut seq = capacities(1, 1, 0);
        seq.add(TurnCategory::Normal, RED).unwrap();
        seq.add(TurnCategory::Even, BLUE).unwrap();

        let summary = seq.summary();
        assert_eq!(summary.combined, vec![RED]);
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[&TurnCategory::Even], vec![BLUE]);
    }
}
