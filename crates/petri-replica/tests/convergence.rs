//! Host/client convergence over the in-memory session log.
//!
//! These tests drive full replicas end to end: a host advancing the shared
//! step counter, clients joining mid-session from the host's handshake
//! payload, and edits flowing both ways through the log.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::Arc;

use chrono::Utc;
use petri_replica::log::{LogRecord, MemoryLog, SessionLog};
use petri_replica::{Replica, ReplicaError, ReplicaRole};
use petri_types::{Interaction, InteractionId, Pattern, StampMode};

fn glider() -> Pattern {
    Pattern::from_art(&[".X.", "..X", "XXX"])
}

fn session(width: usize, height: usize) -> (Arc<MemoryLog>, Replica) {
    let log = Arc::new(MemoryLog::new());
    let host = Replica::host(Arc::clone(&log) as Arc<dyn SessionLog>, width, height, 8).unwrap();
    (log, host)
}

#[test]
fn client_joining_mid_session_converges() {
    let (log, mut host) = session(16, 16);
    host.draw(glider(), 8, 8, StampMode::Set(true)).unwrap();

    for _ in 0..3 {
        host.tick().unwrap();
    }

    let join = host.join_payload().unwrap();
    let mut client = Replica::connect(Arc::clone(&log) as Arc<dyn SessionLog>, &join).unwrap();
    assert_eq!(client.role(), ReplicaRole::Client);
    assert_eq!(client.current_step(), 3);
    assert_eq!(client.grid(), host.grid());

    // The host keeps running; the client catches up on its next tick.
    for _ in 0..2 {
        host.tick().unwrap();
    }
    client.tick().unwrap();

    assert_eq!(client.current_step(), host.current_step());
    assert_eq!(client.grid(), host.grid());
}

#[test]
fn client_edit_forces_host_rollback_then_replicas_converge() {
    let (log, mut host) = session(16, 16);
    for _ in 0..3 {
        host.tick().unwrap();
    }

    let join = host.join_payload().unwrap();
    let mut client = Replica::connect(Arc::clone(&log) as Arc<dyn SessionLog>, &join).unwrap();

    // The host advances while the client's edit is still in flight.
    for _ in 0..2 {
        host.tick().unwrap();
    }
    host.set_simulation_enabled(false).unwrap();

    // Client (still at step 3) stamps a blinker; the host sees it only
    // after having passed step 3 and must roll back.
    client
        .draw(Pattern::from_art(&["XXX"]), 8, 8, StampMode::Set(true))
        .unwrap();

    let host_report = host.tick().unwrap();
    assert_eq!(host_report.rolled_back_to, Some(3));
    assert_eq!(host.current_step(), 5);

    // Client catches up to the announced step 5 on its own.
    client.tick().unwrap();
    assert_eq!(client.current_step(), 5);
    assert_eq!(client.grid(), host.grid());
}

#[test]
fn future_step_edit_is_queued_until_the_client_reaches_it() {
    let (log, mut host) = session(12, 12);
    for _ in 0..3 {
        host.tick().unwrap();
    }
    let join = host.join_payload().unwrap();
    let mut client = Replica::connect(Arc::clone(&log) as Arc<dyn SessionLog>, &join).unwrap();

    for _ in 0..2 {
        host.tick().unwrap();
    }
    host.set_simulation_enabled(false).unwrap();

    // Host edit at step 5 reaches the client while it is still at step 3.
    host.draw(Pattern::from_art(&["X"]), 2, 2, StampMode::Toggle)
        .unwrap();

    client.tick().unwrap();
    assert_eq!(client.current_step(), 5);
    assert_eq!(client.grid(), host.grid());
    assert_eq!(client.cell_state(2, 2), host.cell_state(2, 2));
}

#[test]
fn replicas_stay_converged_across_interleaved_ticks() {
    let (log, mut host) = session(20, 20);
    host.draw(glider(), 10, 10, StampMode::Set(true)).unwrap();

    let join = host.join_payload().unwrap();
    let mut client = Replica::connect(Arc::clone(&log) as Arc<dyn SessionLog>, &join).unwrap();

    // Ticking in arbitrary interleavings never desynchronizes the pair:
    // the client only moves when the host has announced a step.
    for round in 0..10 {
        host.tick().unwrap();
        if round % 3 == 0 {
            client.tick().unwrap();
            assert_eq!(client.current_step(), host.current_step());
            assert_eq!(client.grid(), host.grid());
        }
    }
    client.tick().unwrap();
    assert_eq!(client.current_step(), host.current_step());
    assert_eq!(client.grid(), host.grid());
}

#[test]
fn stale_edit_beyond_the_window_is_fatal_for_the_host() {
    let log = Arc::new(MemoryLog::new());
    let mut host = Replica::host(Arc::clone(&log) as Arc<dyn SessionLog>, 10, 10, 4).unwrap();
    for _ in 0..8 {
        host.tick().unwrap();
    }

    // An edit tagged with step 0 arrives only now, far past the retained
    // checkpoint window.
    log.append(LogRecord::Interaction(Interaction::Draw {
        id: InteractionId::new(),
        step: 0,
        anchor_col: 5,
        anchor_row: 5,
        pattern: Pattern::from_art(&["X"]),
        mode: StampMode::Set(true),
        submitted_at: Utc::now(),
    }))
    .unwrap();

    let result = host.tick();
    assert!(matches!(
        result,
        Err(ReplicaError::RollbackImpossible {
            needed_step: 0,
            oldest_retained: Some(_),
        })
    ));
}
