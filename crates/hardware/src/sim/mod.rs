//! Simulation driver.
//!
//! Provides:
//! 1. **Simulator:** single-threaded machine with program loading and snapshots.
//! 2. **Control:** thread-safe controller owning the real-time clock and subscribers.
//! 3. **Loader:** program text files.

/// Real-time clock thread and clock state.
pub mod clock;
/// Thread-safe control surface.
pub mod control;
/// Program file loading.
pub mod loader;
/// Snapshot subscribers.
pub mod notify;
/// Single-threaded simulator.
pub mod simulator;
/// Immutable machine state copies.
pub mod snapshot;
