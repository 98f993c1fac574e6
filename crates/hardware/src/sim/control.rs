//! Control surface.
//!
//! `Controller` is the thread-safe front of the simulator. It owns the real-time clock and
//! the subscriber registry and serializes every mutation of machine state behind one lock,
//! so a tick and a command never interleave.
//!
//! Every state-changing operation publishes a snapshot to all subscribers: each clock tick,
//! `load_program`, `start`, `stop`, `set_rate` and `step`. Snapshots are built while the
//! lock is held and delivered after it is released.
//!
//! Stopping is synchronous: once `stop` returns, no further tick runs and no snapshot from
//! the old run is published. An epoch counter, bumped on every stop, lets a tick that raced
//! with `stop` notice it is stale and do nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::common::SimError;
use crate::config::{Config, validate_clock_rate};
use crate::isa::Instruction;
use crate::sim::clock::{ClockState, ClockTask, period_for};
use crate::sim::notify::SubscriberRegistry;
use crate::sim::simulator::Simulator;
use crate::sim::snapshot::Snapshot;
use crate::stats::SimStats;

#[derive(Debug)]
struct Shared {
    sim: Simulator,
    clock: ClockState,
    epoch: u64,
}

impl Shared {
    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::new(self.sim.snapshot(self.clock))
    }
}

/// Thread-safe simulator with a real-time clock and snapshot subscribers.
#[derive(Debug)]
pub struct Controller {
    shared: Arc<Mutex<Shared>>,
    registry: Arc<SubscriberRegistry>,
    task: Mutex<Option<ClockTask>>,
}

impl Controller {
    /// Creates a stopped controller with an empty program.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Config::validate`].
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let sim = Simulator::new(config)?;
        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                sim,
                clock: ClockState::Stopped,
                epoch: 0,
            })),
            registry: Arc::new(SubscriberRegistry::new()),
            task: Mutex::new(None),
        })
    }

    /// Registers `callback` to receive every published snapshot.
    ///
    /// Returns `false` if `id` is already registered.
    pub fn subscribe<F>(&self, id: &str, callback: F) -> bool
    where
        F: Fn(&Snapshot) + Send + 'static,
    {
        self.registry.subscribe(id, callback)
    }

    /// Stops delivery to `id`. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: &str) -> bool {
        self.registry.unsubscribe(id)
    }

    /// Current machine state.
    pub fn snapshot(&self) -> Snapshot {
        let shared = self.lock_shared();
        shared.sim.snapshot(shared.clock)
    }

    /// Starts the real-time clock. Does nothing if it is already running.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the clock thread cannot be spawned.
    pub fn start(&self) -> Result<(), SimError> {
        let mut task = self.lock_task();
        if task.is_some() {
            debug!("start ignored: clock already running");
            return Ok(());
        }

        let (rate, epoch, started) = {
            let mut shared = self.lock_shared();
            shared.clock = ClockState::Running;
            (shared.sim.clock_rate(), shared.epoch, shared.snapshot())
        };
        // Queued ahead of the first tick so subscribers see the start before any cycle.
        self.registry.publish(&started);

        let shared = Arc::clone(&self.shared);
        let registry = Arc::clone(&self.registry);
        let spawned = ClockTask::spawn(period_for(rate), move || {
            let snapshot = {
                let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if guard.epoch != epoch || guard.clock != ClockState::Running {
                    return false;
                }
                let _ = guard.sim.tick();
                guard.snapshot()
            };
            registry.publish(&snapshot);
            true
        });

        match spawned {
            Ok(t) => *task = Some(t),
            Err(e) => {
                self.lock_shared().clock = ClockState::Stopped;
                self.publish_current();
                return Err(e);
            }
        }
        info!(rate, "clock started");
        Ok(())
    }

    /// Stops the real-time clock and waits for any in-flight tick to finish.
    pub fn stop(&self) {
        let _ = self.halt_clock();
        info!("clock stopped");
        self.publish_current();
    }

    /// Changes the clock rate, restarting the clock at the new rate if it was running.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidClockRate`] unless `rate` is finite and positive; nothing
    /// changes in that case. Returns [`SimError::Io`] if a restart fails to spawn the clock.
    pub fn set_rate(&self, rate: f64) -> Result<(), SimError> {
        validate_clock_rate(rate)?;
        let was_running = self.halt_clock();
        self.lock_shared().sim.set_clock_rate(rate)?;
        info!(rate, "clock rate changed");
        if was_running {
            self.start()
        } else {
            self.publish_current();
            Ok(())
        }
    }

    /// Resets the machine and queues `program`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ClockRunning`] while the clock runs and
    /// [`SimError::RegisterOutOfRange`] for an instruction outside the register file.
    pub fn load_program(&self, program: Vec<Instruction>) -> Result<(), SimError> {
        let snapshot = {
            let mut shared = self.lock_shared();
            if shared.clock == ClockState::Running {
                return Err(SimError::ClockRunning);
            }
            shared.sim.load_program(program)?;
            shared.snapshot()
        };
        self.registry.publish(&snapshot);
        Ok(())
    }

    /// Runs exactly one cycle while the clock is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ClockRunning`] while the clock runs.
    pub fn step(&self) -> Result<Snapshot, SimError> {
        let snapshot = {
            let mut shared = self.lock_shared();
            if shared.clock == ClockState::Running {
                return Err(SimError::ClockRunning);
            }
            let _ = shared.sim.tick();
            shared.snapshot()
        };
        self.registry.publish(&snapshot);
        Ok(Snapshot::clone(&snapshot))
    }

    /// Whether the real-time clock is running.
    pub fn clock_state(&self) -> ClockState {
        self.lock_shared().clock
    }

    /// Ticks per second for the real-time clock.
    pub fn clock_rate(&self) -> f64 {
        self.lock_shared().sim.clock_rate()
    }

    /// Nothing left to issue and no station occupied.
    pub fn is_drained(&self) -> bool {
        self.lock_shared().sim.is_drained()
    }

    /// Statistics since the last load.
    pub fn stats(&self) -> SimStats {
        self.lock_shared().sim.stats().clone()
    }

    /// Stops the clock thread if any; returns whether one was running.
    fn halt_clock(&self) -> bool {
        let mut task = self.lock_task();
        {
            let mut shared = self.lock_shared();
            shared.clock = ClockState::Stopped;
            shared.epoch += 1;
        }
        task.take().is_some_and(|t| {
            t.stop();
            true
        })
    }

    fn publish_current(&self) {
        let snapshot = self.lock_shared().snapshot();
        self.registry.publish(&snapshot);
    }

    fn lock_shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<ClockTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = self.halt_clock();
    }
}
