//! Tri-state cell representation for the automaton grid.
//!
//! A cell is never modeled as a nullable boolean: the distinction between
//! "never existed" and "was alive, now dead" matters to the renderer and
//! must survive every serialization round trip.

use serde::{Deserialize, Serialize};

/// The state of a single grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// No cell ever existed here -- outside ever-initialized bounds, or
    /// untouched space after a grid grew.
    #[default]
    Empty,
    /// A living cell.
    Alive,
    /// A previously alive cell, now dead.
    Dead,
}

impl CellState {
    /// Whether the cell is currently alive.
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// The wire symbol for this state, as used in grid snapshots.
    ///
    /// The alphabet is `"true"` (alive), `"false"` (dead), and
    /// `"undefined"` (empty).
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Empty => "undefined",
            Self::Alive => "true",
            Self::Dead => "false",
        }
    }

    /// Parse a wire symbol back into a cell state.
    ///
    /// Returns `None` for anything outside the three-symbol alphabet.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "undefined" => Some(Self::Empty),
            "true" => Some(Self::Alive),
            "false" => Some(Self::Dead),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for state in [CellState::Empty, CellState::Alive, CellState::Dead] {
            assert_eq!(CellState::from_symbol(state.symbol()), Some(state));
        }
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        assert_eq!(CellState::from_symbol("null"), None);
        assert_eq!(CellState::from_symbol(""), None);
        assert_eq!(CellState::from_symbol("True"), None);
    }

    #[test]
    fn only_alive_is_alive() {
        assert!(CellState::Alive.is_alive());
        assert!(!CellState::Dead.is_alive());
        assert!(!CellState::Empty.is_alive());
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(CellState::default(), CellState::Empty);
    }
}
