//! Cellular-automaton engine: the grid, its step rule, stamping, and the
//! snapshot codec.
//!
//! Everything in this crate is deterministic and synchronous. The
//! replication layer owns a [`Grid`] and decides *when* to step it; this
//! crate only knows *how*.
//!
//! # Modules
//!
//! - [`catalog`] -- The built-in library of named stamp shapes.
//! - [`codec`] -- Lossless symbol-matrix encode/decode for grid snapshots.
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- The tri-state cell matrix, the step rule, resize, clear.
//! - [`stamp`] -- Pattern stamping with center anchoring and full-footprint
//!   validation.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod grid;
pub mod stamp;

pub use error::GridError;
pub use grid::Grid;
pub use stamp::{apply_stamp, stamp_footprint};
