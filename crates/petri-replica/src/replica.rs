//! The replica state machine: ingestion, rollback, replay, and role-aware
//! step advancement.
//!
//! A replica owns exactly one grid. All mutation funnels through `&mut self`
//! methods, so grid state is single-owner by construction; the log
//! subscription feeds an inbox channel that [`Replica::tick`] drains at the
//! start of every tick.
//!
//! Roles are fixed for the lifetime of the replica:
//!
//! - **Standalone** runs the automaton locally with no log attached.
//! - **Host** is authoritative: it checkpoints before every step, announces
//!   step advances on the log, and is the only replica able to roll back.
//! - **Client** mirrors the host: it never steps on its own, catching up
//!   whenever the host announces a new step and folding queued interactions
//!   in at their designated step.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use petri_grid::{Grid, apply_stamp, codec};
use petri_types::{CellState, Interaction, InteractionId, Pattern, StampMode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::checkpoint::CheckpointStore;
use crate::error::ReplicaError;
use crate::log::{LogRecord, SessionLog};

/// The replication role a replica runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaRole {
    /// No replication; the replica drives its own simulation.
    Standalone,
    /// Authoritative session owner.
    Host,
    /// Follower mirroring a host's session.
    Client,
}

/// Role-specific replica state.
#[derive(Debug)]
enum RoleState {
    Standalone,
    Hosting {
        checkpoints: CheckpointStore,
    },
    Connected {
        /// Interactions observed ahead of the local step, applied during
        /// catch-up at their designated step.
        pending: Vec<Interaction>,
    },
}

/// Handshake payload a host serves to a joining client.
///
/// The snapshot and cursor are taken at the same instant, so a client that
/// decodes the snapshot and subscribes from the cursor observes a gap-free
/// continuation of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionJoin {
    /// Full grid serialization (column-major symbol matrix).
    pub snapshot: Vec<Vec<String>>,
    /// The host's step counter at snapshot time.
    pub step: u64,
    /// Advisory simulation-enabled flag.
    pub simulation_enabled: bool,
    /// Log position the client should subscribe from.
    pub log_cursor: usize,
}

/// What happened during one [`Replica::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Step counter after the tick.
    pub step: u64,
    /// Alive cells after the tick.
    pub alive_cells: usize,
    /// Interactions folded into the grid this tick (directly or via replay).
    pub interactions_applied: usize,
    /// The step rolled back to, when rollback occurred.
    pub rolled_back_to: Option<u64>,
    /// Automaton steps performed this tick (client catch-up may exceed 1).
    pub steps_advanced: u64,
}

/// One running instance of the automaton plus replication engine.
pub struct Replica {
    grid: Grid,
    step: u64,
    simulation_enabled: bool,
    handled: BTreeSet<InteractionId>,
    /// Every handled interaction in log arrival order; the replay source.
    history: Vec<Interaction>,
    /// Records observed at subscription time, drained by the first tick.
    backlog: Vec<LogRecord>,
    inbox: Option<mpsc::UnboundedReceiver<LogRecord>>,
    log: Option<Arc<dyn SessionLog>>,
    role: RoleState,
}

impl core::fmt::Debug for Replica {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Replica")
            .field("role", &self.role())
            .field("step", &self.step)
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("handled", &self.handled.len())
            .finish_non_exhaustive()
    }
}

impl Replica {
    /// Create a standalone replica with an empty grid.
    #[must_use]
    pub fn standalone(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            step: 0,
            simulation_enabled: true,
            handled: BTreeSet::new(),
            history: Vec::new(),
            backlog: Vec::new(),
            inbox: None,
            log: None,
            role: RoleState::Standalone,
        }
    }

    /// Create a hosting replica with an empty grid, subscribed to the log
    /// from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Log`] if the log subscription fails.
    pub fn host(
        log: Arc<dyn SessionLog>,
        width: usize,
        height: usize,
        checkpoint_capacity: usize,
    ) -> Result<Self, ReplicaError> {
        let (backlog, inbox) = log.subscribe_from(0)?;
        info!(width, height, checkpoint_capacity, "hosting session");
        Ok(Self {
            grid: Grid::new(width, height),
            step: 0,
            simulation_enabled: true,
            handled: BTreeSet::new(),
            history: Vec::new(),
            backlog,
            inbox: Some(inbox),
            log: Some(log),
            role: RoleState::Hosting {
                checkpoints: CheckpointStore::new(checkpoint_capacity),
            },
        })
    }

    /// Join an existing session as a client, from a host's join payload.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Grid`] if the snapshot does not decode, or
    /// [`ReplicaError::Log`] if the log subscription fails.
    pub fn connect(log: Arc<dyn SessionLog>, join: &SessionJoin) -> Result<Self, ReplicaError> {
        let grid = codec::decode(&join.snapshot)?;
        let (backlog, inbox) = log.subscribe_from(join.log_cursor)?;
        info!(
            step = join.step,
            width = grid.width(),
            height = grid.height(),
            "connected to session"
        );
        Ok(Self {
            grid,
            step: join.step,
            simulation_enabled: join.simulation_enabled,
            handled: BTreeSet::new(),
            history: Vec::new(),
            backlog,
            inbox: Some(inbox),
            log: Some(log),
            role: RoleState::Connected {
                pending: Vec::new(),
            },
        })
    }

    /// Produce the handshake payload served to a joining client.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::NotHosting`] unless this replica is the host,
    /// or [`ReplicaError::Log`] if the log cannot report its length.
    pub fn join_payload(&self) -> Result<SessionJoin, ReplicaError> {
        let (RoleState::Hosting { .. }, Some(log)) = (&self.role, &self.log) else {
            return Err(ReplicaError::NotHosting);
        };
        Ok(SessionJoin {
            snapshot: codec::encode(&self.grid),
            step: self.step,
            simulation_enabled: self.simulation_enabled,
            log_cursor: log.record_count()?,
        })
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick: drain the inbox, reconcile observed interactions, then
    /// advance the automaton as the role dictates.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::RollbackImpossible`] when an interaction
    /// belongs to a step older than the retained checkpoint window (or to
    /// any past step, for a client); the replica's prior state is left
    /// untouched in that case. Other variants surface grid, log, or step
    /// counter failures.
    pub fn tick(&mut self) -> Result<TickReport, ReplicaError> {
        let mut records = std::mem::take(&mut self.backlog);
        if let Some(inbox) = self.inbox.as_mut() {
            while let Ok(record) = inbox.try_recv() {
                records.push(record);
            }
        }

        let mut fresh: Vec<Interaction> = Vec::new();
        let mut announced_step: Option<u64> = None;
        for record in records {
            match record {
                LogRecord::Interaction(interaction) => {
                    // Idempotent ingestion: duplicates are silently
                    // skipped, including duplicates within one batch.
                    if self.handled.contains(&interaction.id())
                        || fresh.iter().any(|seen| seen.id() == interaction.id())
                    {
                        continue;
                    }
                    fresh.push(interaction);
                }
                LogRecord::StepAdvance { step } => {
                    announced_step = Some(announced_step.map_or(step, |seen| seen.max(step)));
                }
                LogRecord::SimulationEnabled { enabled } => {
                    if matches!(self.role, RoleState::Connected { .. }) {
                        self.simulation_enabled = enabled;
                    }
                }
            }
        }

        let mut report = TickReport {
            step: self.step,
            alive_cells: 0,
            interactions_applied: 0,
            rolled_back_to: None,
            steps_advanced: 0,
        };

        if !fresh.is_empty() {
            self.reconcile(fresh, &mut report)?;
        }

        self.advance(announced_step, &mut report)?;

        report.step = self.step;
        report.alive_cells = self.grid.alive_count();
        Ok(report)
    }

    /// Fold newly observed, non-duplicate interactions into the replica.
    fn reconcile(
        &mut self,
        fresh: Vec<Interaction>,
        report: &mut TickReport,
    ) -> Result<(), ReplicaError> {
        let oldest = fresh.iter().map(Interaction::step).min().unwrap_or(self.step);
        if oldest >= self.step {
            self.apply_current_and_future(fresh, report)
        } else {
            self.rollback_and_replay(oldest, fresh, report)
        }
    }

    /// Common case: every fresh interaction belongs to the current step or a
    /// later one. Clients queue future-step interactions for catch-up;
    /// authoritative roles apply everything directly.
    fn apply_current_and_future(
        &mut self,
        fresh: Vec<Interaction>,
        report: &mut TickReport,
    ) -> Result<(), ReplicaError> {
        let is_client = matches!(self.role, RoleState::Connected { .. });
        for interaction in fresh {
            if is_client && interaction.step() > self.step {
                debug!(
                    id = %interaction.id(),
                    step = interaction.step(),
                    "queued future interaction"
                );
                self.mark_handled(interaction.clone());
                if let RoleState::Connected { pending } = &mut self.role {
                    pending.push(interaction);
                }
                continue;
            }
            Self::apply_interaction(&mut self.grid, &interaction)?;
            self.mark_handled(interaction);
            report.interactions_applied = report.interactions_applied.saturating_add(1);
        }
        Ok(())
    }

    /// Rollback path: restore the most recent checkpoint at or before the
    /// oldest fresh step, then replay merged interactions and automaton
    /// steps forward to the current step.
    ///
    /// The whole operation is staged on a scratch grid; the replica is only
    /// mutated once replay has fully succeeded.
    fn rollback_and_replay(
        &mut self,
        needed_step: u64,
        fresh: Vec<Interaction>,
        report: &mut TickReport,
    ) -> Result<(), ReplicaError> {
        let RoleState::Hosting { checkpoints } = &self.role else {
            // Clients hold no checkpoints and cannot recover locally.
            return Err(ReplicaError::RollbackImpossible {
                needed_step,
                oldest_retained: None,
            });
        };
        let checkpoint =
            checkpoints
                .restore_point(needed_step)
                .ok_or(ReplicaError::RollbackImpossible {
                    needed_step,
                    oldest_retained: checkpoints.oldest_step(),
                })?;
        let replay_from = checkpoint.step;
        let mut grid = checkpoint.grid.clone();

        // handled ∪ fresh, ascending by step; the stable sort keeps log
        // arrival order within a step.
        let mut merged = self.history.clone();
        merged.extend(fresh.iter().cloned());
        merged.sort_by_key(Interaction::step);

        let target = self.step;
        for s in replay_from..target {
            for interaction in merged.iter().filter(|i| i.step() == s) {
                Self::apply_interaction(&mut grid, interaction)?;
            }
            grid = grid.step();
        }
        for interaction in merged.iter().filter(|i| i.step() == target) {
            Self::apply_interaction(&mut grid, interaction)?;
        }

        info!(
            from = replay_from,
            to = target,
            merged = merged.len(),
            fresh = fresh.len(),
            "rolled back and replayed"
        );

        self.grid = grid;
        for interaction in fresh {
            self.mark_handled(interaction);
            report.interactions_applied = report.interactions_applied.saturating_add(1);
        }
        report.rolled_back_to = Some(replay_from);
        Ok(())
    }

    /// Advance the automaton as the role dictates.
    fn advance(
        &mut self,
        announced_step: Option<u64>,
        report: &mut TickReport,
    ) -> Result<(), ReplicaError> {
        match &mut self.role {
            RoleState::Standalone => {
                if self.simulation_enabled {
                    self.grid = self.grid.step();
                    self.step = self.step.checked_add(1).ok_or(ReplicaError::StepOverflow)?;
                    report.steps_advanced = report.steps_advanced.saturating_add(1);
                }
                Ok(())
            }
            RoleState::Hosting { checkpoints } => {
                if self.simulation_enabled {
                    checkpoints.record(self.step, self.grid.clone());
                    self.grid = self.grid.step();
                    self.step = self.step.checked_add(1).ok_or(ReplicaError::StepOverflow)?;
                    report.steps_advanced = report.steps_advanced.saturating_add(1);
                    if let Some(log) = &self.log {
                        log.append(LogRecord::StepAdvance { step: self.step })?;
                    }
                }
                Ok(())
            }
            RoleState::Connected { .. } => self.catch_up(announced_step, report),
        }
    }

    /// Client catch-up: step forward to the host's announced step, folding
    /// queued interactions in at their designated step.
    fn catch_up(
        &mut self,
        announced_step: Option<u64>,
        report: &mut TickReport,
    ) -> Result<(), ReplicaError> {
        let Some(target) = announced_step else {
            return Ok(());
        };
        if target <= self.step {
            return Ok(());
        }

        let mut queue = if let RoleState::Connected { pending } = &mut self.role {
            std::mem::take(pending)
        } else {
            Vec::new()
        };

        while self.step < target {
            let (now, later): (Vec<_>, Vec<_>) =
                queue.into_iter().partition(|i| i.step() == self.step);
            queue = later;
            for interaction in &now {
                Self::apply_interaction(&mut self.grid, interaction)?;
                report.interactions_applied = report.interactions_applied.saturating_add(1);
            }
            self.grid = self.grid.step();
            self.step = self.step.checked_add(1).ok_or(ReplicaError::StepOverflow)?;
            report.steps_advanced = report.steps_advanced.saturating_add(1);
        }

        // Interactions designated for the step just reached.
        let (now, later): (Vec<_>, Vec<_>) = queue.into_iter().partition(|i| i.step() == self.step);
        for interaction in &now {
            Self::apply_interaction(&mut self.grid, interaction)?;
            report.interactions_applied = report.interactions_applied.saturating_add(1);
        }
        if let RoleState::Connected { pending } = &mut self.role {
            *pending = later;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Local edits
    // -----------------------------------------------------------------------

    /// Stamp a pattern at the current step and publish the interaction.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Grid`] if the stamp falls outside the grid
    /// (nothing is published in that case), or [`ReplicaError::Log`] if the
    /// append fails after local application.
    pub fn draw(
        &mut self,
        pattern: Pattern,
        anchor_col: usize,
        anchor_row: usize,
        mode: StampMode,
    ) -> Result<InteractionId, ReplicaError> {
        let interaction = Interaction::Draw {
            id: InteractionId::new(),
            step: self.step,
            anchor_col,
            anchor_row,
            pattern,
            mode,
            submitted_at: Utc::now(),
        };
        self.submit(interaction)
    }

    /// Reset every cell to empty at the current step and publish the
    /// interaction.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::Log`] if the append fails after local
    /// application.
    pub fn clear(&mut self) -> Result<InteractionId, ReplicaError> {
        let interaction = Interaction::Clear {
            id: InteractionId::new(),
            step: self.step,
            submitted_at: Utc::now(),
        };
        self.submit(interaction)
    }

    fn submit(&mut self, interaction: Interaction) -> Result<InteractionId, ReplicaError> {
        Self::apply_interaction(&mut self.grid, &interaction)?;
        if let Some(log) = &self.log {
            log.append(LogRecord::Interaction(interaction.clone()))?;
        }
        let id = interaction.id();
        debug!(%id, step = interaction.step(), kind = interaction.kind(), "submitted interaction");
        self.mark_handled(interaction);
        Ok(id)
    }

    /// Resize the grid. Only a standalone replica may resize: checkpoints
    /// and replicated interactions are defined against fixed dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::ReplicationActive`] for host and client
    /// replicas.
    pub fn request_resize(&mut self, width: usize, height: usize) -> Result<(), ReplicaError> {
        match self.role {
            RoleState::Standalone => {
                self.grid.resize(width, height);
                Ok(())
            }
            RoleState::Hosting { .. } | RoleState::Connected { .. } => {
                Err(ReplicaError::ReplicationActive)
            }
        }
    }

    /// Toggle whether the tick path advances the automaton. The host
    /// publishes the change on the log; clients may not set it locally.
    ///
    /// # Errors
    ///
    /// Returns [`ReplicaError::ReplicationActive`] for client replicas, or
    /// [`ReplicaError::Log`] if the host cannot publish the change.
    pub fn set_simulation_enabled(&mut self, enabled: bool) -> Result<(), ReplicaError> {
        match self.role {
            RoleState::Standalone => {
                self.simulation_enabled = enabled;
                Ok(())
            }
            RoleState::Hosting { .. } => {
                self.simulation_enabled = enabled;
                if let Some(log) = &self.log {
                    log.append(LogRecord::SimulationEnabled { enabled })?;
                }
                Ok(())
            }
            RoleState::Connected { .. } => Err(ReplicaError::ReplicationActive),
        }
    }

    fn mark_handled(&mut self, interaction: Interaction) {
        if self.handled.insert(interaction.id()) {
            self.history.push(interaction);
        }
    }

    fn apply_interaction(grid: &mut Grid, interaction: &Interaction) -> Result<(), ReplicaError> {
        match interaction {
            Interaction::Draw {
                anchor_col,
                anchor_row,
                pattern,
                mode,
                ..
            } => apply_stamp(grid, pattern, *anchor_col, *anchor_row, *mode)?,
            Interaction::Clear { .. } => grid.clear(),
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------------

    /// The current grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The current step counter.
    #[must_use]
    pub const fn current_step(&self) -> u64 {
        self.step
    }

    /// The replication role.
    #[must_use]
    pub const fn role(&self) -> ReplicaRole {
        match self.role {
            RoleState::Standalone => ReplicaRole::Standalone,
            RoleState::Hosting { .. } => ReplicaRole::Host,
            RoleState::Connected { .. } => ReplicaRole::Client,
        }
    }

    /// Whether the tick path currently advances the automaton.
    #[must_use]
    pub const fn simulation_enabled(&self) -> bool {
        self.simulation_enabled
    }

    /// Whether an interaction id has already been folded in.
    #[must_use]
    pub fn is_handled(&self, id: InteractionId) -> bool {
        self.handled.contains(&id)
    }

    /// Grid width, for the renderer.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.grid.width()
    }

    /// Grid height, for the renderer.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.grid.height()
    }

    /// Single-cell read, for the renderer.
    #[must_use]
    pub fn cell_state(&self, col: usize, row: usize) -> Option<CellState> {
        self.grid.cell(col, row)
    }
}
