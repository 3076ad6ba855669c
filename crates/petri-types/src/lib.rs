//! Shared type definitions for the Petri session engine.
//!
//! This crate is the dependency leaf of the workspace: it holds the data
//! types every other crate agrees on, with no engine logic attached.
//!
//! # Modules
//!
//! - [`cell`] -- The tri-state [`CellState`] and its wire symbols.
//! - [`ids`] -- The [`InteractionId`] newtype (UUID v7, time-ordered).
//! - [`interaction`] -- [`Interaction`] records and the [`StampMode`]
//!   write semantics for draw edits.
//! - [`pattern`] -- Immutable [`Pattern`] stamp shapes and their clockwise
//!   rotation.

pub mod cell;
pub mod ids;
pub mod interaction;
pub mod pattern;

pub use cell::CellState;
pub use ids::InteractionId;
pub use interaction::{Interaction, StampMode};
pub use pattern::Pattern;
