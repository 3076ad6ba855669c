//! Error types for the replication layer.

use petri_grid::GridError;

use crate::log::LogError;

/// Errors that can occur while operating a replica.
#[derive(Debug, thiserror::Error)]
pub enum ReplicaError {
    /// Rollback was required but no retained checkpoint reaches back far
    /// enough. The replica cannot recover locally and must be resynchronized
    /// from the authoritative session state.
    #[error(
        "rollback to step {needed_step} impossible (oldest retained checkpoint: {oldest_retained:?})"
    )]
    RollbackImpossible {
        /// The step the replica would have to roll back to.
        needed_step: u64,
        /// The oldest checkpointed step still retained, if any.
        oldest_retained: Option<u64>,
    },

    /// The operation is only available to a standalone replica.
    #[error("operation rejected: replication is active")]
    ReplicationActive,

    /// The operation is only available to a hosting replica.
    #[error("operation rejected: replica is not hosting")]
    NotHosting,

    /// The step counter would overflow.
    #[error("step counter overflow")]
    StepOverflow,

    /// A grid operation failed.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// A session log operation failed.
    #[error("session log error: {source}")]
    Log {
        /// The underlying log error.
        #[from]
        source: LogError,
    },
}
