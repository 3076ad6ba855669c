//! Error types for the `petri-grid` crate.
//!
//! All fallible grid operations return [`GridError`] through the standard
//! [`Result`] type alias. Grid mutation is atomic: when an operation
//! returns an error, the grid is unchanged.

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A stamp or cell write would touch a cell outside the grid.
    ///
    /// Coordinates are reported as signed values because an anchored stamp
    /// can extend past the left or top edge into negative space.
    #[error("cell ({col}, {row}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Target column (may be negative).
        col: i64,
        /// Target row (may be negative).
        row: i64,
        /// Grid width at the time of the attempt.
        width: usize,
        /// Grid height at the time of the attempt.
        height: usize,
    },

    /// A snapshot symbol was outside the `true`/`false`/`undefined`
    /// alphabet.
    #[error("unknown cell symbol in snapshot: {symbol:?}")]
    UnknownSymbol {
        /// The offending symbol.
        symbol: String,
    },

    /// A snapshot column had a different length than the first column.
    #[error("ragged snapshot: column {column} has {actual} cells, expected {expected}")]
    RaggedSnapshot {
        /// Index of the offending column.
        column: usize,
        /// Expected column length (taken from the first column).
        expected: usize,
        /// Actual column length.
        actual: usize,
    },
}
