//! # Controller Tests
//!
//! Clock lifecycle, subscriber management and the rules that reject commands while the
//! clock is running. Timing-dependent checks use generous timeouts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use rstest::rstest;
use tomasim_core::SimError;
use tomasim_core::core::pipeline::rat::Alias;
use tomasim_core::sim::clock::ClockState;
use tomasim_core::{Config, Controller, Snapshot};

use crate::common::builder::*;
use crate::common::harness::{init_tracing, small_config};

const WAIT: Duration = Duration::from_secs(5);

fn controller() -> Controller {
    init_tracing();
    Controller::new(&small_config(&[1.0], 1, 1, 2, 3)).unwrap()
}

fn channel_subscriber(ctl: &Controller, id: &str) -> Receiver<Snapshot> {
    let (tx, rx) = mpsc::channel();
    assert!(ctl.subscribe(id, move |s| {
        let _ = tx.send(s.clone());
    }));
    rx
}

/// Receives until `pred` holds, panicking after `WAIT`.
fn recv_until(rx: &Receiver<Snapshot>, pred: impl Fn(&Snapshot) -> bool) -> Snapshot {
    let deadline = Instant::now() + WAIT;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let s = rx.recv_timeout(left).expect("snapshot before timeout");
        if pred(&s) {
            return s;
        }
    }
}

#[test]
fn test_subscribe_rejects_duplicate_id() {
    let ctl = controller();
    assert!(ctl.subscribe("ui", |_| {}));
    assert!(!ctl.subscribe("ui", |_| {}));
    assert!(ctl.subscribe("log", |_| {}));
}

#[test]
fn test_unsubscribe_unknown_id() {
    let ctl = controller();
    assert!(!ctl.unsubscribe("nobody"));
    assert!(ctl.subscribe("ui", |_| {}));
    assert!(ctl.unsubscribe("ui"));
    assert!(!ctl.unsubscribe("ui"));
    assert!(ctl.subscribe("ui", |_| {}));
}

#[test]
fn test_load_then_stop_shows_initial_state() {
    let ctl = controller();
    ctl.load_program(vec![add(1, r(0), r(0)), mul(2, r(1), lit(2.0))])
        .unwrap();
    ctl.stop();

    let s = ctl.snapshot();
    assert_eq!(s.cycle, 0);
    assert_eq!(s.clock, ClockState::Stopped);
    assert_eq!(s.registers[0].as_number(), Some(1.0));
    assert!(s.register_alias_table.iter().all(|a| *a == Alias::Ready));
    assert!(s.reservation_stations.iter().all(|st| !st.occupied));
    assert_eq!(s.instruction_queue.len(), 2);
    assert_eq!(s.clock_rate, 1.0);
}

#[test]
fn test_step_publishes_to_subscribers() {
    let ctl = controller();
    let rx = channel_subscriber(&ctl, "ui");
    ctl.load_program(vec![add(1, r(0), r(0))]).unwrap();
    let loaded = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(loaded.cycle, 0);

    let stepped = ctl.step().unwrap();
    assert_eq!(stepped.cycle, 1);
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), stepped);
}

#[test]
fn test_panicking_subscriber_is_isolated() {
    let ctl = controller();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    assert!(ctl.subscribe("bad", move |_| {
        let _ = c.fetch_add(1, Ordering::SeqCst);
        panic!("subscriber failure");
    }));
    let rx = channel_subscriber(&ctl, "good");

    ctl.load_program(vec![add(1, r(0), r(0))]).unwrap();
    for _ in 0..3 {
        let _ = ctl.step().unwrap();
    }

    let last = recv_until(&rx, |s| s.cycle == 3);
    assert_eq!(last.registers[1].as_number(), Some(2.0));

    // The panicking subscriber keeps receiving after its first failure.
    let deadline = Instant::now() + WAIT;
    while calls.load(Ordering::SeqCst) < 4 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_unsubscribed_callback_stops_receiving() {
    let ctl = controller();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    assert!(ctl.subscribe("ui", move |snap| s.lock().unwrap().push(snap.cycle)));
    let rx = channel_subscriber(&ctl, "sync");

    ctl.load_program(vec![add(1, r(0), r(0))]).unwrap();
    let _ = rx.recv_timeout(WAIT).unwrap();
    assert!(ctl.unsubscribe("ui"));
    let _ = ctl.step().unwrap();
    let _ = recv_until(&rx, |snap| snap.cycle == 1);
    thread::sleep(Duration::from_millis(20));

    assert!(!seen.lock().unwrap().contains(&1));
}

#[rstest]
#[case(0.0)]
#[case(-1.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_set_rate_rejects_invalid(#[case] rate: f64) {
    let ctl = controller();
    let err = ctl.set_rate(rate).unwrap_err();
    assert!(matches!(err, SimError::InvalidClockRate(_)));
    assert_eq!(ctl.clock_rate(), 1.0);
    assert_eq!(ctl.clock_state(), ClockState::Stopped);
}

#[test]
fn test_set_rate_publishes_new_rate() {
    let ctl = controller();
    let rx = channel_subscriber(&ctl, "ui");
    ctl.set_rate(25.0).unwrap();
    let s = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(s.clock_rate, 25.0);
    assert_eq!(s.clock, ClockState::Stopped);
}

#[test]
fn test_commands_rejected_while_running() {
    let ctl = controller();
    ctl.load_program(vec![add(1, r(0), r(0))]).unwrap();
    ctl.start().unwrap();

    assert!(matches!(
        ctl.load_program(vec![add(2, r(0), r(0))]),
        Err(SimError::ClockRunning)
    ));
    assert!(matches!(ctl.step(), Err(SimError::ClockRunning)));

    ctl.stop();
    assert!(ctl.load_program(vec![add(2, r(0), r(0))]).is_ok());
    assert!(ctl.step().is_ok());
}

#[test]
fn test_start_twice_is_noop() {
    let ctl = controller();
    ctl.start().unwrap();
    ctl.start().unwrap();
    assert_eq!(ctl.clock_state(), ClockState::Running);
    ctl.stop();
    assert_eq!(ctl.clock_state(), ClockState::Stopped);
}

#[test]
fn test_clock_runs_program_to_completion() {
    let ctl = controller();
    let rx = channel_subscriber(&ctl, "ui");
    ctl.set_rate(500.0).unwrap();
    ctl.load_program(vec![add(1, r(0), r(0)), mul(2, r(1), lit(4.0))])
        .unwrap();
    ctl.start().unwrap();

    let done = recv_until(&rx, |s| s.clock == ClockState::Running && s.is_drained());
    ctl.stop();
    assert_eq!(done.registers[2].as_number(), Some(8.0));
    assert!(done.cycle >= 7);
}

#[test]
fn test_no_ticks_after_stop() {
    let ctl = controller();
    let rx = channel_subscriber(&ctl, "ui");
    ctl.set_rate(1000.0).unwrap();
    ctl.start().unwrap();
    let _ = recv_until(&rx, |s| s.cycle >= 3);
    ctl.stop();

    let cycle = ctl.snapshot().cycle;
    thread::sleep(Duration::from_millis(30));
    assert_eq!(ctl.snapshot().cycle, cycle);
    assert_eq!(ctl.clock_state(), ClockState::Stopped);
}

#[test]
fn test_set_rate_while_running_restarts() {
    let ctl = controller();
    let rx = channel_subscriber(&ctl, "ui");
    ctl.start().unwrap();
    ctl.set_rate(200.0).unwrap();
    assert_eq!(ctl.clock_state(), ClockState::Running);
    assert_eq!(ctl.clock_rate(), 200.0);

    let s = recv_until(&rx, |s| s.cycle >= 2);
    assert_eq!(s.clock_rate, 200.0);
    ctl.stop();
}

#[test]
fn test_drop_stops_clock() {
    let ticks = Arc::new(AtomicUsize::new(0));
    {
        let ctl = controller();
        let t = Arc::clone(&ticks);
        assert!(ctl.subscribe("count", move |_| {
            let _ = t.fetch_add(1, Ordering::SeqCst);
        }));
        ctl.set_rate(1000.0).unwrap();
        ctl.start().unwrap();
        thread::sleep(Duration::from_millis(10));
    }
    thread::sleep(Duration::from_millis(20));
    let after = ticks.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(ticks.load(Ordering::SeqCst), after);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.units.adders = 0;
    assert!(matches!(Controller::new(&config), Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_slow_subscriber_receives_latest_snapshot() {
    let ctl = controller();
    let gate = Arc::new(Mutex::new(()));
    let held = gate.lock().unwrap();
    let (tx, rx) = mpsc::channel();
    let g = Arc::clone(&gate);
    assert!(ctl.subscribe("slow", move |s| {
        let _open = g.lock().unwrap();
        let _ = tx.send(s.clone());
    }));

    ctl.load_program(vec![add(1, r(0), r(0)), mul(2, r(1), lit(3.0))])
        .unwrap();
    for _ in 0..30 {
        let _ = ctl.step().unwrap();
    }
    ctl.stop();
    drop(held);

    let last = recv_until(&rx, |s| s.cycle == 30 && s.clock == ClockState::Stopped);
    assert_eq!(last, ctl.snapshot());
    assert_eq!(last.registers[2].as_number(), Some(6.0));
}

#[test]
fn test_blocked_subscriber_does_not_stall_others() {
    let ctl = controller();
    let (release, blocked) = mpsc::channel::<()>();
    assert!(ctl.subscribe("stuck", move |_| {
        let _ = blocked.recv();
    }));
    let rx = channel_subscriber(&ctl, "live");

    ctl.load_program(vec![add(1, r(0), r(0))]).unwrap();
    let started = Instant::now();
    for _ in 0..40 {
        let _ = ctl.step().unwrap();
    }
    assert!(started.elapsed() < WAIT);
    let stepped = recv_until(&rx, |s| s.cycle == 40);
    assert_eq!(stepped.registers[1].as_number(), Some(2.0));

    ctl.set_rate(1000.0).unwrap();
    ctl.start().unwrap();
    let _ = recv_until(&rx, |s| s.clock == ClockState::Running && s.cycle >= 45);
    ctl.stop();
    assert!(ctl.snapshot().cycle >= 45);
    drop(release);
}

#[test]
fn test_start_snapshot_precedes_ticks() {
    for _ in 0..10 {
        let ctl = controller();
        let rx = channel_subscriber(&ctl, "ui");
        ctl.set_rate(1000.0).unwrap();
        ctl.start().unwrap();
        let first = recv_until(&rx, |s| s.clock == ClockState::Running);
        ctl.stop();
        assert_eq!(first.cycle, 0);
        assert_eq!(first.clock_rate, 1000.0);
    }
}
