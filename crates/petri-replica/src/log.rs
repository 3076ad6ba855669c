//! The abstract session log and its in-memory reference implementation.
//!
//! A session log is an ordered, append-only, replicated record stream. The
//! host appends interactions and step announcements; every replica
//! (including the appender) observes the same records in the same order,
//! which is what makes arrival-order replay well defined.
//!
//! [`MemoryLog`] is the in-process reference backend: a shared vector plus
//! fan-out channels. Replicas in the same process share one instance; a
//! networked backend only has to implement [`SessionLog`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use petri_types::Interaction;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One record in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum LogRecord {
    /// A user edit, appended by whichever replica originated it.
    Interaction(Interaction),
    /// The host announcing that the shared step counter has advanced.
    StepAdvance {
        /// The host's step counter after the advance.
        step: u64,
    },
    /// Advisory flag from the host: whether the simulation is running.
    SimulationEnabled {
        /// The new flag value.
        enabled: bool,
    },
}

/// Errors that can occur against a session log backend.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The backend rejected or lost the operation.
    #[error("session log backend failure: {message}")]
    Backend {
        /// Backend-specific failure description.
        message: String,
    },
}

/// An ordered, append-only record stream shared by all replicas of a session.
pub trait SessionLog: Send + Sync {
    /// Append a record to the end of the log.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Backend`] if the backend cannot durably accept
    /// the record.
    fn append(&self, record: LogRecord) -> Result<(), LogError>;

    /// Subscribe to the log starting at `cursor`.
    ///
    /// Returns the backlog of records already present at or after the
    /// cursor, plus a live tail receiving every record appended afterwards.
    /// The subscriber sees its own appends echoed back.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Backend`] if the subscription cannot be set up.
    fn subscribe_from(
        &self,
        cursor: usize,
    ) -> Result<(Vec<LogRecord>, mpsc::UnboundedReceiver<LogRecord>), LogError>;

    /// Number of records currently in the log.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Backend`] if the backend cannot be queried.
    fn record_count(&self) -> Result<usize, LogError>;
}

#[derive(Debug, Default)]
struct MemoryLogInner {
    records: Vec<LogRecord>,
    subscribers: Vec<mpsc::UnboundedSender<LogRecord>>,
}

/// In-memory session log with subscriber fan-out.
#[derive(Debug, Default)]
pub struct MemoryLog {
    inner: Mutex<MemoryLogInner>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryLogInner> {
        // Appends cannot leave the vector inconsistent, so a poisoned lock
        // is still safe to reuse.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionLog for MemoryLog {
    fn append(&self, record: LogRecord) -> Result<(), LogError> {
        let mut inner = self.lock();
        inner.records.push(record.clone());
        // Drop subscribers whose receiving side has gone away.
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(record.clone()).is_ok());
        Ok(())
    }

    fn subscribe_from(
        &self,
        cursor: usize,
    ) -> Result<(Vec<LogRecord>, mpsc::UnboundedReceiver<LogRecord>), LogError> {
        let mut inner = self.lock();
        let backlog = inner
            .records
            .get(cursor..)
            .map(<[LogRecord]>::to_vec)
            .unwrap_or_default();
        let (sender, receiver) = mpsc::unbounded_channel();
        inner.subscribers.push(sender);
        Ok((backlog, receiver))
    }

    fn record_count(&self) -> Result<usize, LogError> {
        Ok(self.lock().records.len())
    }
}
