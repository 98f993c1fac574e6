//! Architectural Register File.
//!
//! This module provides the `RegisterFile` struct, the authoritative storage for register
//! values. It provides:
//! 1. **Storage:** A fixed-size array of `Value`s indexed `R0..RN-1`.
//! 2. **Initialization:** Construction from a configured list of initial values.
//! 3. **Observability:** A debug dump of the current contents.
//!
//! The register file is written only by a common-data-bus broadcast; issue never writes it.

use super::data::Value;

/// Fixed-size array of register values.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisterFile {
    values: Vec<Value>,
}

impl RegisterFile {
    /// Creates a register file of `count` registers, all zero.
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![Value::default(); count],
        }
    }

    /// Creates a register file of `count` registers seeded from `initial`.
    ///
    /// Registers beyond the end of `initial` start at zero; extra initial values are ignored
    /// (configuration validation rejects them earlier).
    pub fn with_values(count: usize, initial: &[f64]) -> Self {
        let mut regs = Self::new(count);
        for (slot, &v) in regs.values.iter_mut().zip(initial) {
            *slot = Value::Number(v);
        }
        regs
    }

    /// Reads register `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range. Register indices are validated when a program is loaded.
    #[inline]
    pub fn read(&self, idx: usize) -> Value {
        self.values[idx]
    }

    /// Writes `val` to register `idx`.
    #[inline]
    pub fn write(&mut self, idx: usize, val: Value) {
        self.values[idx] = val;
    }

    /// Number of registers.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the register file has no registers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All register values ordered by index.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Logs the contents of every register at debug level.
    pub fn dump(&self) {
        for (i, v) in self.values.iter().enumerate() {
            tracing::debug!(register = i, value = %v, "R{i}");
        }
    }
}
