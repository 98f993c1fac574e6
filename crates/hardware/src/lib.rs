//! Tomasulo scheduling simulator library.
//!
//! This crate models an out-of-order floating-point core scheduled with Tomasulo's
//! algorithm, one clock cycle at a time:
//! 1. **Core:** Register alias table, reservation stations, functional units, the common
//!    data bus and the instruction queue.
//! 2. **ISA:** Arithmetic operations, operands and the text assembly format.
//! 3. **Simulation:** Real-time clock, snapshot subscribers, program loading.
//! 4. **Support:** Configuration, errors and statistics.
//!
//! ```
//! use tomasim_core::{Config, Simulator};
//! use tomasim_core::isa::decode_program;
//!
//! let mut config = Config::default();
//! config.registers.initial = vec![1.0];
//! let mut sim = Simulator::new(&config).unwrap();
//! sim.load_program(decode_program("ADD R1, R0, R0").unwrap()).unwrap();
//! let _ = sim.run_until_drained(100);
//! assert_eq!(sim.engine().rat().registers().read(1).as_number(), Some(2.0));
//! ```

/// Common types (values, errors, register file).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// Scheduling core (alias table, stations, units, bus, queue, engine).
pub mod core;
/// Operations, instructions and their text form.
pub mod isa;
/// Simulator, clock, subscribers, snapshots and program loading.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Error type for every fallible operation.
pub use crate::common::SimError;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Thread-safe simulator with a real-time clock.
pub use crate::sim::control::Controller;
/// Single-threaded simulator.
pub use crate::sim::simulator::Simulator;
/// Immutable machine state copy.
pub use crate::sim::snapshot::Snapshot;
