//! Simulator: configuration plus the execution engine.
//!
//! `Simulator` is the single-threaded core of the system. It validates programs against the
//! configured register file, resets the machine when a new program is loaded, and produces
//! snapshots. The real-time clock and subscribers live in [`crate::sim::control`].

use tracing::{debug, info};

use crate::common::SimError;
use crate::config::{Config, validate_clock_rate};
use crate::core::{Engine, TickReport};
use crate::isa::Instruction;
use crate::sim::clock::ClockState;
use crate::sim::snapshot::Snapshot;
use crate::stats::SimStats;

/// Top-level simulator: configuration, machine state and clock rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulator {
    config: Config,
    engine: Engine,
    clock_rate: f64,
}

impl Simulator {
    /// Creates a simulator in the configured initial state with an empty queue.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Config::validate`].
    pub fn new(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            engine: Engine::new(config),
            clock_rate: config.general.clock_rate,
        })
    }

    /// Resets the machine and queues `program` in order.
    ///
    /// Registers return to their configured initial values, every alias becomes ready,
    /// stations and units are emptied and the cycle counter restarts at zero. The clock
    /// rate is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::RegisterOutOfRange`] if any instruction names a register outside
    /// the register file; the machine is left untouched in that case.
    pub fn load_program(&mut self, program: Vec<Instruction>) -> Result<(), SimError> {
        let count = self.config.registers.count;
        for inst in &program {
            inst.validate(count)?;
        }
        info!(instructions = program.len(), "program loaded");
        self.engine = Engine::new(&self.config);
        self.engine.load(program);
        Ok(())
    }

    /// Returns the machine to its configured initial state with an empty queue.
    pub fn reset(&mut self) {
        self.engine = Engine::new(&self.config);
    }

    /// Runs one cycle.
    pub fn tick(&mut self) -> TickReport {
        let report = self.engine.tick();
        if self.config.general.trace_ticks {
            debug!(
                cycle = report.cycle,
                issued = ?report.issued.map(|(s, _)| s),
                dispatched = report.dispatched.len(),
                broadcast = ?report.broadcast.map(|b| b.station),
                "tick"
            );
            self.engine.rat().registers().dump();
        }
        report
    }

    /// Runs cycles until the machine drains or `max_cycles` more have elapsed.
    ///
    /// Returns the number of cycles run.
    pub fn run_until_drained(&mut self, max_cycles: u64) -> u64 {
        let mut ran = 0;
        while ran < max_cycles && !self.engine.is_drained() {
            let _ = self.tick();
            ran += 1;
        }
        ran
    }

    /// Captures the current machine state.
    pub fn snapshot(&self, clock: ClockState) -> Snapshot {
        Snapshot::capture(&self.engine, self.clock_rate, clock)
    }

    /// Changes the clock rate.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidClockRate`] unless `rate` is finite and positive; the
    /// previous rate is kept.
    pub fn set_clock_rate(&mut self, rate: f64) -> Result<(), SimError> {
        validate_clock_rate(rate)?;
        self.clock_rate = rate;
        Ok(())
    }

    /// Ticks per second for the real-time clock.
    pub const fn clock_rate(&self) -> f64 {
        self.clock_rate
    }

    /// Nothing left to issue and no station occupied.
    pub fn is_drained(&self) -> bool {
        self.engine.is_drained()
    }

    /// Cycles executed since the last load or reset.
    pub const fn cycle(&self) -> u64 {
        self.engine.cycle()
    }

    /// Statistics since the last load or reset.
    pub const fn stats(&self) -> &SimStats {
        self.engine.stats()
    }

    /// The machine itself.
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The configuration this simulator was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
