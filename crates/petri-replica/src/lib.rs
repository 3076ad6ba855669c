//! Replication for the cellular-automaton session engine: checkpointed
//! rollback/replay over an abstract append-only session log.
//!
//! One authoritative host replica advances the shared step counter and
//! retains a bounded checkpoint window; client replicas mirror it by
//! replaying the same interactions at the same steps. Determinism of the
//! automaton does the heavy lifting -- replicas converge because they fold
//! identical edits into identical steps.
//!
//! # Modules
//!
//! - [`checkpoint`] -- Bounded FIFO of grid snapshots for rollback.
//! - [`config`] -- YAML session configuration.
//! - [`error`] -- Error types for the replication layer.
//! - [`log`] -- The abstract session log and the in-memory reference
//!   implementation.
//! - [`replica`] -- The role-aware replica state machine.
//! - [`runner`] -- Async tick loop with pause/resume/stop controls.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod log;
pub mod replica;
pub mod runner;

pub use checkpoint::{Checkpoint, CheckpointStore, DEFAULT_CHECKPOINT_CAPACITY};
pub use config::{ConfigError, SessionConfig};
pub use error::ReplicaError;
pub use log::{LogError, LogRecord, MemoryLog, SessionLog};
pub use replica::{Replica, ReplicaRole, SessionJoin, TickReport};
pub use runner::{
    NoOpCallback, RunEndReason, RunResult, RunnerError, SessionControls, TickCallback,
    run_session,
};
