//! User-originated edits tagged with the step they belong to.
//!
//! An interaction is created by whichever replica the user is driving,
//! stamped with that replica's current step, appended to the session log,
//! and eventually folded into every replica's grid at exactly that step.
//! Interactions are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::InteractionId;
use crate::pattern::Pattern;

/// How a draw interaction writes the pattern's set cells into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StampMode {
    /// Write the given liveness explicitly: `Set(true)` makes covered cells
    /// alive, `Set(false)` makes them dead.
    Set(bool),
    /// Flip covered cells: alive becomes dead; dead or empty becomes alive.
    Toggle,
}

/// A user edit to the shared grid.
///
/// `id` is the deduplication key (collision-free across replicas); `step`
/// is the automaton step the edit logically belongs to, assigned by the
/// originating replica. `submitted_at` is diagnostic only -- replay order
/// is the log's arrival order, never the wall clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Interaction {
    /// Stamp a pattern onto the grid, centered on the anchor cell.
    Draw {
        /// Globally unique deduplication token.
        id: InteractionId,
        /// The step at which the edit takes effect.
        step: u64,
        /// Anchor column (the pattern's geometric center).
        anchor_col: usize,
        /// Anchor row (the pattern's geometric center).
        anchor_row: usize,
        /// The stamp shape.
        pattern: Pattern,
        /// Write semantics for the pattern's set cells.
        mode: StampMode,
        /// Wall-clock submission time (diagnostic only).
        submitted_at: DateTime<Utc>,
    },
    /// Reset every cell of the grid to empty.
    Clear {
        /// Globally unique deduplication token.
        id: InteractionId,
        /// The step at which the edit takes effect.
        step: u64,
        /// Wall-clock submission time (diagnostic only).
        submitted_at: DateTime<Utc>,
    },
}

impl Interaction {
    /// The interaction's deduplication token.
    pub const fn id(&self) -> InteractionId {
        match self {
            Self::Draw { id, .. } | Self::Clear { id, .. } => *id,
        }
    }

    /// The automaton step the interaction belongs to.
    pub const fn step(&self) -> u64 {
        match self {
            Self::Draw { step, .. } | Self::Clear { step, .. } => *step,
        }
    }

    /// A short kind label for structured logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Draw { .. } => "draw",
            Self::Clear { .. } => "clear",
        }
    }
}
