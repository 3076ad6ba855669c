//! Session binary for the replicated automaton engine.
//!
//! Wires a hosting replica and an in-process client together over the
//! in-memory session log, seeds the grid with a glider from the built-in
//! catalog, runs a bounded session, and verifies the pair converged.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `petri.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the in-memory session log and the hosting replica
//! 4. Stamp the seed pattern
//! 5. Connect an in-process client from the host's join payload
//! 6. Run the bounded session loop
//! 7. Catch the client up and log convergence

use std::path::Path;
use std::sync::Arc;

use petri_grid::catalog;
use petri_replica::log::{MemoryLog, SessionLog};
use petri_replica::{NoOpCallback, Replica, SessionConfig, SessionControls, run_session};
use petri_types::StampMode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "petri.yaml";

/// Application entry point for the session binary.
///
/// # Errors
///
/// Returns an error if configuration loading, replica setup, or the
/// session run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (defaults apply when the file is absent).
    let config_path = Path::new(CONFIG_PATH);
    let config = if config_path.exists() {
        SessionConfig::from_file(config_path)?
    } else {
        SessionConfig::default()
    };

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        width = config.grid.width,
        height = config.grid.height,
        checkpoint_capacity = config.replication.checkpoint_capacity,
        tick_interval_ms = config.run.tick_interval_ms,
        max_ticks = config.run.max_ticks,
        "petri-session starting"
    );

    // 3. Create the session log and the hosting replica.
    let log = Arc::new(MemoryLog::new());
    let mut host = Replica::host(
        Arc::clone(&log) as Arc<dyn SessionLog>,
        config.grid.width,
        config.grid.height,
        config.replication.checkpoint_capacity,
    )?;
    host.set_simulation_enabled(config.run.simulation_enabled)?;

    // 4. Seed the grid with a glider from the built-in catalog.
    let shapes = catalog::builtin_catalog();
    if let Some(shape) = catalog::family(&shapes, "Glider").and_then(|f| f.shape("\u{2198}")) {
        let anchor_col = config.grid.width / 2;
        let anchor_row = config.grid.height / 2;
        let id = host.draw(
            shape.pattern.clone(),
            anchor_col,
            anchor_row,
            StampMode::Set(true),
        )?;
        info!(%id, anchor_col, anchor_row, "seed pattern stamped");
    } else {
        warn!("glider shape missing from catalog, starting empty");
    }

    // 5. Connect an in-process client.
    let join = host.join_payload()?;
    let mut client = Replica::connect(Arc::clone(&log) as Arc<dyn SessionLog>, &join)?;
    info!(step = join.step, "client connected");

    // 6. Run the bounded session loop.
    let controls = Arc::new(SessionControls::new(
        config.run.tick_interval_ms,
        config.run.max_ticks,
    ));
    let mut callback = NoOpCallback;
    let result = run_session(&mut host, &controls, &mut callback).await?;
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_step = result.final_report.as_ref().map(|r| r.step),
        final_alive = result.final_report.as_ref().map(|r| r.alive_cells),
        "session ended"
    );

    // 7. Catch the client up and verify convergence.
    let client_report = client.tick()?;
    if client.grid() == host.grid() && client.current_step() == host.current_step() {
        info!(
            step = client_report.step,
            alive_cells = client_report.alive_cells,
            steps_caught_up = client_report.steps_advanced,
            "host and client converged"
        );
    } else {
        warn!(
            host_step = host.current_step(),
            client_step = client.current_step(),
            "host and client diverged"
        );
    }

    Ok(())
}
