//! Bounded checkpoint storage for rollback support.
//!
//! The host records one checkpoint per tick, immediately before calling the
//! automaton step for the next step. Capacity is a small fixed window
//! (default 8): rollback is a recovery path for slow replicas, not a general
//! history mechanism, so the window bounds both memory and how far behind a
//! replica may fall before resynchronization is required.

use std::collections::VecDeque;

use petri_grid::Grid;

/// Default number of retained checkpoints.
pub const DEFAULT_CHECKPOINT_CAPACITY: usize = 8;

/// A full grid snapshot at a completed step boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// The step the snapshot describes.
    pub step: u64,
    /// Deep copy of the grid as it stood at that step.
    pub grid: Grid,
}

/// Fixed-capacity FIFO of checkpoints; the oldest entry is evicted when full.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    entries: VecDeque<Checkpoint>,
    capacity: usize,
}

impl CheckpointStore {
    /// Create a store retaining at most `capacity` checkpoints (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Record a checkpoint, evicting the oldest entry when at capacity.
    pub fn record(&mut self, step: u64, grid: Grid) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Checkpoint { step, grid });
    }

    /// Find the most recent checkpoint at or before `step`.
    #[must_use]
    pub fn restore_point(&self, step: u64) -> Option<&Checkpoint> {
        self.entries.iter().rev().find(|entry| entry.step <= step)
    }

    /// The oldest retained step, if any checkpoint exists.
    #[must_use]
    pub fn oldest_step(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.step)
    }

    /// Number of retained checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no checkpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CheckpointStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKPOINT_CAPACITY)
    }
}
