//! Tomasulo scheduling pipeline.
//!
//! This module contains the structures a cycle moves through, leaf-first:
//! 1. **RAT:** Register alias table over the architectural register file.
//! 2. **Stations:** Reservation station pool, split into adder and multiplier groups.
//! 3. **Queue:** Program-order backlog of instructions waiting to issue.
//! 4. **CDB:** Common data bus arbitration and broadcast.
//! 5. **Engine:** The per-cycle issue / advance / dispatch / broadcast sequence.

/// Common data bus arbitration and broadcast.
pub mod cdb;

/// Cycle engine owning all machine state.
pub mod engine;

/// Instruction queue.
pub mod queue;

/// Register alias table.
pub mod rat;

/// Reservation station pool.
pub mod stations;
