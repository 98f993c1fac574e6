//! Real-time clock.
//!
//! A `ClockTask` is a background thread that invokes a tick callback once per period until
//! it is stopped. Ticks are scheduled against a running deadline, so a slow callback delays
//! the next tick rather than shortening the following periods. If the callback falls more
//! than one period behind, the schedule restarts from the current time instead of bursting.

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::common::SimError;

/// Whether the real-time clock is advancing the machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    /// No automatic ticks.
    #[default]
    Stopped,
    /// Ticking at the configured rate.
    Running,
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Period between ticks for `rate` ticks per second.
pub fn period_for(rate: f64) -> Duration {
    Duration::from_secs_f64(1.0 / rate)
}

/// Handle to a running clock thread.
#[derive(Debug)]
pub struct ClockTask {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ClockTask {
    /// Spawns a clock thread calling `on_tick` every `period`.
    ///
    /// `on_tick` returns `false` to end the thread on its own.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the thread cannot be spawned.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Result<Self, SimError>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("tomasim-clock".into())
            .spawn(move || {
                debug!(period_us = period.as_micros(), "clock thread started");
                let mut deadline = Instant::now() + period;
                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !on_tick() {
                                break;
                            }
                            deadline += period;
                            let now = Instant::now();
                            if deadline + period < now {
                                warn!("clock fell behind; resynchronizing");
                                deadline = now + period;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("clock thread exiting");
            })?;
        Ok(Self { stop_tx, handle })
    }

    /// Signals the thread and waits for it to exit.
    ///
    /// A tick already in progress runs to completion first.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            warn!("clock thread panicked");
        }
    }
}
