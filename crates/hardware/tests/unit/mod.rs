//! # Unit Components
//!
//! Tests grouped by the component they exercise.

/// Configuration defaults, parsing and validation.
pub mod config;

/// Thread-safe controller: clock, subscribers, rejection rules.
pub mod control;

/// Operations, instruction decoding and display.
pub mod isa;




/// Snapshot contents and wire format.
pub mod snapshot;

/// Statistics counters.
pub mod stats;
