//! Immutable stamp shapes and their clockwise rotation.
//!
//! A [`Pattern`] is a small boolean matrix describing which cells a draw
//! interaction touches. Patterns are shared read-only between selectors and
//! interactions, so every transform returns a new value and never mutates
//! the original.

use serde::{Deserialize, Serialize};

/// An immutable rectangular stamp shape.
///
/// Rows are addressed top-to-bottom, cells within a row left-to-right.
/// Rows may be shorter than the pattern width; missing trailing cells are
/// implied `false`. The width is the length of the longest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct Pattern {
    /// The rows of the shape, possibly ragged.
    rows: Vec<Vec<bool>>,
    /// Cached maximum row length.
    width: usize,
}

impl Pattern {
    /// Create a pattern from explicit rows.
    ///
    /// The width is computed as the maximum row length; shorter rows keep
    /// their implied-`false` tail.
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Build a pattern from ASCII art, one string per row.
    ///
    /// `'X'` marks a set cell; every other character is unset. Handy for
    /// keeping large shapes readable in source.
    pub fn from_art(art: &[&str]) -> Self {
        Self::new(
            art.iter()
                .map(|line| line.chars().map(|c| c == 'X').collect())
                .collect(),
        )
    }

    /// Width of the shape (length of the longest row).
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height of the shape (number of rows).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Whether the shape has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    /// Whether the cell at column `x`, row `y` is set.
    ///
    /// Positions outside the shape (including the implied tail of a short
    /// row) read as `false`.
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Number of set cells in the shape.
    pub fn set_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|&&cell| cell).count())
            .sum()
    }

    /// Rotate the shape clockwise by `quarter_turns` x 90 degrees.
    ///
    /// The turn count is normalized modulo 4 first, so 0 (and 4, 8, ...)
    /// returns a value equal to the input. Implemented as repeated
    /// transpose-reversal rather than recursion.
    pub fn rotate_cw(&self, quarter_turns: u32) -> Self {
        let turns = quarter_turns.checked_rem(4).unwrap_or(0);
        let mut rotated = self.clone();
        for _ in 0..turns {
            rotated = rotated.rotate_once();
        }
        rotated
    }

    /// One clockwise quarter turn: the cell at `(x, y)` moves to column
    /// `height - 1 - y`, row `x` of the result.
    fn rotate_once(&self) -> Self {
        let height = self.height();
        let rows = (0..self.width)
            .map(|x| (0..height).rev().map(|y| self.is_set(x, y)).collect())
            .collect();
        Self::new(rows)
    }
}

impl From<Vec<Vec<bool>>> for Pattern {
    fn from(rows: Vec<Vec<bool>>) -> Self {
        Self::new(rows)
    }
}

impl From<Pattern> for Vec<Vec<bool>> {
    fn from(pattern: Pattern) -> Self {
        pattern.rows
    }
}
