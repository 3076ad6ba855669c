//! Async tick loop with session controls.
//!
//! This module provides [`run_session`], the top-level async function that
//! drives a replica's tick loop with support for:
//!
//! - **Bounded runs**: stop after `max_ticks`
//! - **Pause/resume**: halt and continue the tick loop without losing state
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Requested stop**: immediate clean stop from another task
//!
//! The runner wraps the single-tick [`Replica::tick`] method and adds the
//! control plane around it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;
use tracing::info;

use crate::error::ReplicaError;
use crate::replica::{Replica, TickReport};

/// Errors that can occur during a session run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying replica error.
        #[from]
        source: ReplicaError,
    },
}

/// The reason a session run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested through the session controls.
    StopRequested,
}

/// Result of a session run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last tick report, if any tick completed.
    pub final_report: Option<TickReport>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to re-render the grid, publish metrics,
/// or snoop on convergence in tests.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, report: &TickReport, replica: &Replica);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport, _replica: &Replica) {}
}

/// Shared control state for a running session.
///
/// Wrapped in [`Arc`] and shared between the tick loop and whatever task
/// drives the user interface. Atomic fields keep reads lock-free on the
/// tick loop hot path.
#[derive(Debug)]
pub struct SessionControls {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    tick_interval_ms: AtomicU64,
    max_ticks: u64,
}

impl SessionControls {
    /// Create controls with the given tick interval and tick limit
    /// (0 = unlimited).
    #[must_use]
    pub const fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::const_new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
        }
    }

    /// Check whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop. The tick loop sleeps until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop and wake it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused.
    ///
    /// Returns immediately if not paused. Otherwise blocks until
    /// [`resume`](Self::resume) is called, or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    /// Request a clean stop before the next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        // A paused loop must wake to observe the stop.
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. Must be at least 10ms.
    ///
    /// Returns the previous interval on success, or `None` if the value
    /// was rejected (below 10ms).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < 10 {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    /// Check whether the tick limit has been reached.
    pub const fn tick_limit_reached(&self, total_ticks: u64) -> bool {
        self.max_ticks > 0 && total_ticks >= self.max_ticks
    }

    /// Get the configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}

/// Run a replica's tick loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a tick fails unrecoverably (for
/// example [`ReplicaError::RollbackImpossible`]).
pub async fn run_session(
    replica: &mut Replica,
    controls: &Arc<SessionControls>,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut last_report: Option<TickReport> = None;
    let mut total_ticks: u64 = 0;

    info!(
        role = ?replica.role(),
        max_ticks = controls.max_ticks(),
        tick_interval_ms = controls.tick_interval_ms(),
        "session starting"
    );

    loop {
        if controls.is_paused() {
            info!("session paused, waiting for resume");
            controls.wait_if_paused().await;
            info!("session resumed");
        }

        if controls.is_stop_requested() {
            info!(total_ticks, "session stop requested");
            return Ok(RunResult {
                end_reason: RunEndReason::StopRequested,
                final_report: last_report,
                total_ticks,
            });
        }

        let report = replica.tick()?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&report, replica);

        if controls.tick_limit_reached(total_ticks) {
            info!(
                step = report.step,
                total_ticks,
                max_ticks = controls.max_ticks(),
                "tick limit reached"
            );
            return Ok(RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                final_report: Some(report),
                total_ticks,
            });
        }

        last_report = Some(report);

        let interval_ms = controls.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}
