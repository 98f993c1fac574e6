//! Common types shared across the simulator.
//!
//! This module provides the building blocks every other component uses:
//! 1. **Values:** Numeric register/operand values and the arithmetic fault marker.
//! 2. **Error Handling:** The boundary error type returned by configuration and control calls.
//! 3. **Register Storage:** The architectural register file.

/// Register and operand value type.
pub mod data;

/// Error types and arithmetic fault definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use data::Value;
pub use error::{ArithmeticFault, SimError};
pub use reg::RegisterFile;
