//! Register Alias Table.
//!
//! Maps each architectural register to the reservation station of its latest in-flight
//! producer, or to nothing if the register file value is authoritative. The table owns the
//! register file so that a read resolves to either a value or a station tag in one lookup.

use serde::{Deserialize, Serialize};

use crate::common::{RegisterFile, Value};
use crate::core::pipeline::stations::StationId;

/// Result of reading a register through the alias table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RegisterRead {
    /// The register file holds the current value.
    Ready(Value),
    /// The value will be produced by this station.
    Pending(StationId),
}

/// Alias table entry as exposed in snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "station", rename_all = "snake_case")]
pub enum Alias {
    /// No in-flight producer.
    Ready,
    /// Awaiting the result of this station.
    Pending(StationId),
}

/// Register file plus the per-register producer tags.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisterAliasTable {
    regs: RegisterFile,
    producers: Vec<Option<StationId>>,
}

impl RegisterAliasTable {
    /// Creates a table over `regs` with every register `Ready`.
    pub fn new(regs: RegisterFile) -> Self {
        let producers = vec![None; regs.len()];
        Self { regs, producers }
    }

    /// Reads register `reg`: its value if ready, otherwise the producing station.
    pub fn read(&self, reg: usize) -> RegisterRead {
        match self.producers[reg] {
            Some(station) => RegisterRead::Pending(station),
            None => RegisterRead::Ready(self.regs.read(reg)),
        }
    }

    /// Marks `reg` as produced by `station`, overwriting any older alias.
    ///
    /// Later readers of `reg` wait on the newest writer (write-after-write renaming).
    pub fn mark_pending(&mut self, reg: usize, station: StationId) {
        self.producers[reg] = Some(station);
    }

    /// Applies a broadcast of `value` from `station` to destination register `reg`.
    ///
    /// Only takes effect if `station` is still the register's producer: the value is written
    /// and the alias cleared. A stale broadcast (the register was renamed to a newer station
    /// after `station` issued) leaves both the value and the newer alias untouched, so an
    /// older result can never overwrite a younger one. Returns whether the write happened.
    pub fn resolve(&mut self, reg: usize, value: Value, station: StationId) -> bool {
        if self.producers[reg] != Some(station) {
            return false;
        }
        self.regs.write(reg, value);
        self.producers[reg] = None;
        true
    }

    /// Alias entry for `reg`.
    pub fn alias(&self, reg: usize) -> Alias {
        match self.producers[reg] {
            Some(station) => Alias::Pending(station),
            None => Alias::Ready,
        }
    }

    /// Alias entries ordered by register index.
    pub fn aliases(&self) -> Vec<Alias> {
        (0..self.producers.len()).map(|r| self.alias(r)).collect()
    }

    /// The underlying register file.
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// Returns `true` if there are no registers.
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }
}
