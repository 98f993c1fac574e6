//! Execution units.
//!
//! This module contains the functional units that execute dispatched reservation stations:
//! 1. **Adder group:** `+` and `-`.
//! 2. **Multiplier group:** `*` and `/`.

/// Functional unit groups with fixed per-group latency.
pub mod functional;

pub use functional::{FunctionalUnitGroup, FunctionalUnits, UnitState};
