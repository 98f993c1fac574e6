//! Core machine model.
//!
//! This module contains the scheduling pipeline (alias table, reservation stations,
//! instruction queue, common data bus, cycle engine) and the functional units it drives.

/// Scheduling pipeline (RAT, stations, queue, CDB, engine).
pub mod pipeline;

/// Functional units (adder and multiplier groups).
pub mod units;

pub use self::pipeline::engine::{Engine, TickReport};
