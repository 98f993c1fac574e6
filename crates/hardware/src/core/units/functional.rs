//! Functional units.
//!
//! Each group (adder, multiplier) owns a fixed set of execution units sharing one latency.
//! A unit moves through three states:
//!
//! ```text
//! Idle --dispatch--> Busy{remaining = latency} --advance x latency--> Complete --release--> Idle
//! ```
//!
//! The result is computed at dispatch (operands are final by then) and held until the common
//! data bus consumes it. A `Complete` unit that loses bus arbitration keeps its result and
//! stays unavailable for dispatch.

use serde::Serialize;

use crate::common::Value;
use crate::config::UnitConfig;
use crate::core::pipeline::stations::StationId;
use crate::isa::{Op, UnitGroup};

/// State of one functional unit.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitState {
    /// Free for dispatch.
    #[default]
    Idle,
    /// Computing for `station`; completes after `remaining` more advances.
    Busy {
        /// Station the result belongs to.
        station: StationId,
        /// Cycles left before completion.
        remaining: u32,
        /// Result that will be published.
        result: Value,
    },
    /// Finished; waiting for the common data bus.
    Complete {
        /// Station the result belongs to.
        station: StationId,
        /// Result to broadcast.
        result: Value,
    },
}

impl UnitState {
    /// Station this unit is working for, if any.
    pub const fn station(&self) -> Option<StationId> {
        match *self {
            Self::Idle => None,
            Self::Busy { station, .. } | Self::Complete { station, .. } => Some(station),
        }
    }
}

/// A group of identical units with a shared latency.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionalUnitGroup {
    group: UnitGroup,
    latency: u32,
    units: Vec<UnitState>,
}

impl FunctionalUnitGroup {
    /// Creates `count` idle units of `group` with the given latency.
    pub fn new(group: UnitGroup, count: usize, latency: u32) -> Self {
        Self {
            group,
            latency,
            units: vec![UnitState::Idle; count],
        }
    }

    /// Which group this is.
    pub const fn group(&self) -> UnitGroup {
        self.group
    }

    /// Cycles from dispatch to completion.
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Unit states by index.
    pub fn units(&self) -> &[UnitState] {
        &self.units
    }

    /// Lowest-index idle unit.
    pub fn find_free(&self) -> Option<usize> {
        self.units.iter().position(|u| *u == UnitState::Idle)
    }

    /// Starts computing `op(a, b)` for `station` on the lowest free unit.
    ///
    /// Returns the unit index, or `None` (and changes nothing) if every unit is occupied.
    pub fn dispatch(&mut self, station: StationId, op: Op, a: Value, b: Value) -> Option<usize> {
        debug_assert_eq!(op.group(), self.group);
        let idx = self.find_free()?;
        self.units[idx] = UnitState::Busy {
            station,
            remaining: self.latency,
            result: op.apply(a, b),
        };
        Some(idx)
    }

    /// Advances every busy unit by one cycle.
    pub fn advance(&mut self) {
        for unit in &mut self.units {
            if let UnitState::Busy {
                station,
                remaining,
                result,
            } = *unit
            {
                *unit = if remaining <= 1 {
                    UnitState::Complete { station, result }
                } else {
                    UnitState::Busy {
                        station,
                        remaining: remaining - 1,
                        result,
                    }
                };
            }
        }
    }

    /// Completed units as `(unit index, station, result)`, lowest index first.
    pub fn completed(&self) -> impl Iterator<Item = (usize, StationId, Value)> + '_ {
        self.units.iter().enumerate().filter_map(|(i, u)| match *u {
            UnitState::Complete { station, result } => Some((i, station, result)),
            _ => None,
        })
    }

    /// Returns unit `idx` to idle after its result was broadcast.
    pub fn release(&mut self, idx: usize) {
        self.units[idx] = UnitState::Idle;
    }
}

/// Both functional unit groups.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionalUnits {
    adders: FunctionalUnitGroup,
    multipliers: FunctionalUnitGroup,
}

impl FunctionalUnits {
    /// Builds both groups from configuration.
    pub fn new(config: &UnitConfig) -> Self {
        let make = |g| FunctionalUnitGroup::new(g, config.count(g), config.latency(g));
        Self {
            adders: make(UnitGroup::Adder),
            multipliers: make(UnitGroup::Multiplier),
        }
    }

    /// The group executing `group` operations.
    pub const fn group(&self, group: UnitGroup) -> &FunctionalUnitGroup {
        match group {
            UnitGroup::Adder => &self.adders,
            UnitGroup::Multiplier => &self.multipliers,
        }
    }

    /// Mutable access to a group.
    pub fn group_mut(&mut self, group: UnitGroup) -> &mut FunctionalUnitGroup {
        match group {
            UnitGroup::Adder => &mut self.adders,
            UnitGroup::Multiplier => &mut self.multipliers,
        }
    }

    /// Groups in bus-priority order.
    pub fn groups(&self) -> [&FunctionalUnitGroup; 2] {
        [&self.adders, &self.multipliers]
    }

    /// Advances every unit in both groups.
    pub fn advance(&mut self) {
        self.adders.advance();
        self.multipliers.advance();
    }

    /// Number of units holding a completed result.
    pub fn completed_count(&self) -> usize {
        self.groups().iter().map(|g| g.completed().count()).sum()
    }
}
