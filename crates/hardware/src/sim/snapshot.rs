//! Machine state snapshots.
//!
//! A `Snapshot` is a fully populated, immutable copy of everything an observer may display:
//! registers, alias table, reservation stations, functional units, the last bus broadcast,
//! the remaining instruction queue, and the clock settings. It serializes to the JSON shape
//! consumed by front ends:
//!
//! ```json
//! {
//!   "cycle": 1,
//!   "registers": [1.0, 0.0, 0.0, 0.0],
//!   "register_alias_table": [{"state": "ready"}, {"state": "pending", "station": 0}],
//!   "reservation_stations": [
//!     {"id": 0, "group": "adder", "occupied": true, "operation": "+", "destination": 1,
//!      "operands": [{"literal": 1.0}, {"awaiting_station": 3}], "executing": false}
//!   ],
//!   "clock_rate": 1.0,
//!   "clock": "stopped"
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::common::Value;
use crate::core::Engine;
use crate::core::pipeline::cdb::Broadcast;
use crate::core::pipeline::rat::Alias;
use crate::core::pipeline::stations::{Operand, StationId};
use crate::core::units::UnitState;
use crate::isa::{Op, UnitGroup};
use crate::sim::clock::ClockState;

/// One reservation station as seen by observers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationSnapshot {
    /// Global station number.
    pub id: StationId,
    /// Group the station belongs to.
    pub group: UnitGroup,
    /// Whether the station holds an instruction.
    pub occupied: bool,
    /// Operation, or `None` when empty.
    pub operation: Option<Op>,
    /// Destination register, or `None` when empty.
    pub destination: Option<usize>,
    /// Operands, both `None` when empty.
    pub operands: [Option<Operand>; 2],
    /// Handed to a functional unit.
    pub executing: bool,
}

/// One functional unit as seen by observers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitSnapshot {
    /// Group the unit belongs to.
    pub group: UnitGroup,
    /// Index within the group.
    pub index: usize,
    /// Current state.
    #[serde(flatten)]
    pub state: UnitState,
}

/// Immutable point-in-time copy of the machine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Cycles executed so far.
    pub cycle: u64,
    /// Register values ordered by index.
    pub registers: Vec<Value>,
    /// Alias entries ordered by register index.
    pub register_alias_table: Vec<Alias>,
    /// Stations, adder group first, then multiplier group, by slot.
    pub reservation_stations: Vec<StationSnapshot>,
    /// Number of adder-group stations.
    pub adder_station_count: usize,
    /// Number of multiplier-group stations.
    pub multiplier_station_count: usize,
    /// Functional units, adder group first.
    pub functional_units: Vec<UnitSnapshot>,
    /// Result published in the most recent cycle.
    pub last_broadcast: Option<Broadcast>,
    /// Instructions waiting to issue, in program order.
    pub instruction_queue: Vec<String>,
    /// Clock rate in ticks per second.
    pub clock_rate: f64,
    /// Whether the real-time clock is running.
    pub clock: ClockState,
}

impl Snapshot {
    /// Captures `engine` together with the current clock settings.
    pub fn capture(engine: &Engine, clock_rate: f64, clock: ClockState) -> Self {
        let stations = engine.stations();
        let reservation_stations = stations
            .iter()
            .map(|(id, entry)| StationSnapshot {
                id,
                group: stations.group_of(id),
                occupied: entry.is_some(),
                operation: entry.map(|e| e.op),
                destination: entry.map(|e| e.dest),
                operands: [entry.map(|e| e.operands[0]), entry.map(|e| e.operands[1])],
                executing: entry.is_some_and(|e| e.dispatched),
            })
            .collect();

        let functional_units = engine
            .units()
            .groups()
            .into_iter()
            .flat_map(|g| {
                g.units().iter().enumerate().map(move |(index, &state)| UnitSnapshot {
                    group: g.group(),
                    index,
                    state,
                })
            })
            .collect();

        Self {
            cycle: engine.cycle(),
            registers: engine.rat().registers().values().to_vec(),
            register_alias_table: engine.rat().aliases(),
            reservation_stations,
            adder_station_count: stations.count(UnitGroup::Adder),
            multiplier_station_count: stations.count(UnitGroup::Multiplier),
            functional_units,
            last_broadcast: engine.last_broadcast(),
            instruction_queue: engine.queue().iter().map(ToString::to_string).collect(),
            clock_rate,
            clock,
        }
    }

    /// Station `id`, if it exists.
    pub fn station(&self, id: StationId) -> Option<&StationSnapshot> {
        self.reservation_stations.get(id.0)
    }

    /// Returns `true` once nothing is queued and every station is empty.
    pub fn is_drained(&self) -> bool {
        self.instruction_queue.is_empty() && self.reservation_stations.iter().all(|s| !s.occupied)
    }
}

impl fmt::Display for Snapshot {
    /// Renders a plain-text table of the machine state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycle {} ({}, {} ticks/s)", self.cycle, self.clock, self.clock_rate)?;

        write!(f, "  regs ")?;
        for (i, (v, alias)) in self
            .registers
            .iter()
            .zip(&self.register_alias_table)
            .enumerate()
        {
            match alias {
                Alias::Ready => write!(f, " R{i}={v}")?,
                Alias::Pending(s) => write!(f, " R{i}={v}<{s}>")?,
            }
        }
        writeln!(f)?;

        for s in &self.reservation_stations {
            match (s.operation, s.destination, s.operands) {
                (Some(op), Some(dest), [Some(a), Some(b)]) => writeln!(
                    f,
                    "  {:<5} {:<10} R{dest} = {a} {op} {b}{}",
                    s.id.to_string(),
                    s.group.to_string(),
                    if s.executing { "  [exec]" } else { "" }
                )?,
                _ => writeln!(f, "  {:<5} {:<10} -", s.id.to_string(), s.group.to_string())?,
            }
        }

        for u in &self.functional_units {
            match u.state {
                UnitState::Idle => {}
                UnitState::Busy {
                    station, remaining, ..
                } => writeln!(f, "  fu.{}{} {station} remaining={remaining}", u.group, u.index)?,
                UnitState::Complete { station, result } => {
                    writeln!(f, "  fu.{}{} {station} done={result}", u.group, u.index)?;
                }
            }
        }

        if let Some(b) = &self.last_broadcast {
            writeln!(f, "  cdb   {} -> {}", b.station, b.value)?;
        }
        if !self.instruction_queue.is_empty() {
            writeln!(f, "  queue {}", self.instruction_queue.join(" | "))?;
        }
        Ok(())
    }
}
