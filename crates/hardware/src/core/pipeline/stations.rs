//! Reservation Station Pool.
//!
//! A fixed set of station slots, adder group first and multiplier group after it. Stations are
//! numbered globally (`RS0..RSn-1`) in that order; the number is the tag consumers wait on and
//! the tag the register alias table stores.
//!
//! A slot is either empty or holds a `StationEntry`, so an occupied station always has an
//! operation and a destination. Each operand is a tagged `Operand`, never both a value and a
//! tag at once.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::common::Value;
use crate::core::pipeline::rat::{RegisterAliasTable, RegisterRead};
use crate::isa::{Instruction, Op, Source, UnitGroup};

/// Global reservation station number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub usize);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RS{}", self.0)
    }
}

/// A station operand: a captured value or the station that will produce it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Value is available.
    Literal(Value),
    /// Waiting for this station's broadcast.
    AwaitingStation(StationId),
}

impl Operand {
    /// The value, if available.
    pub const fn value(self) -> Option<Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::AwaitingStation(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::AwaitingStation(s) => write!(f, "<{s}>"),
        }
    }
}

/// Contents of an occupied station.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StationEntry {
    /// Operation to perform.
    pub op: Op,
    /// Destination register.
    pub dest: usize,
    /// Source operands.
    pub operands: [Operand; 2],
    /// Cycle the entry was issued; dispatch is oldest-first.
    pub issued_at: u64,
    /// Handed to a functional unit and waiting for its result.
    pub dispatched: bool,
}

impl StationEntry {
    /// Both operands are available.
    pub fn is_ready(&self) -> bool {
        self.operands.iter().all(|o| matches!(o, Operand::Literal(_)))
    }

    /// Operand values, if both are available.
    pub const fn values(&self) -> Option<(Value, Value)> {
        match self.operands {
            [Operand::Literal(a), Operand::Literal(b)] => Some((a, b)),
            _ => None,
        }
    }
}

/// The reservation station pool.
#[derive(Clone, Debug, PartialEq)]
pub struct ReservationStations {
    slots: Vec<Option<StationEntry>>,
    adders: usize,
}

impl ReservationStations {
    /// Creates `adders` adder stations followed by `multipliers` multiplier stations.
    pub fn new(adders: usize, multipliers: usize) -> Self {
        Self {
            slots: vec![None; adders + multipliers],
            adders,
        }
    }

    /// Total number of stations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the pool has no stations.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Global station numbers belonging to `group`.
    pub fn range(&self, group: UnitGroup) -> Range<usize> {
        match group {
            UnitGroup::Adder => 0..self.adders,
            UnitGroup::Multiplier => self.adders..self.slots.len(),
        }
    }

    /// Number of stations in `group`.
    pub fn count(&self, group: UnitGroup) -> usize {
        self.range(group).len()
    }

    /// Group that station `id` belongs to.
    pub const fn group_of(&self, id: StationId) -> UnitGroup {
        if id.0 < self.adders {
            UnitGroup::Adder
        } else {
            UnitGroup::Multiplier
        }
    }

    /// Lowest-numbered free station in `group`, or `None` if the group is full.
    pub fn find_free_slot(&self, group: UnitGroup) -> Option<StationId> {
        self.range(group)
            .find(|&i| self.slots[i].is_none())
            .map(StationId)
    }

    /// Places `inst` in free station `id`, renaming its destination.
    ///
    /// Sources are read through `rat` before the destination alias is updated, so an
    /// instruction that reads its own destination waits on the previous producer.
    pub fn allocate(
        &mut self,
        id: StationId,
        inst: &Instruction,
        rat: &mut RegisterAliasTable,
        cycle: u64,
    ) {
        debug_assert!(self.slots[id.0].is_none(), "allocating occupied {id}");
        let operands = inst.sources().map(|src| match src {
            Source::Literal(v) => Operand::Literal(Value::Number(v)),
            Source::Register(r) => match rat.read(r) {
                RegisterRead::Ready(v) => Operand::Literal(v),
                RegisterRead::Pending(s) => Operand::AwaitingStation(s),
            },
        });
        rat.mark_pending(inst.dest, id);
        self.slots[id.0] = Some(StationEntry {
            op: inst.op,
            dest: inst.dest,
            operands,
            issued_at: cycle,
            dispatched: false,
        });
    }

    /// Entry held by station `id`, if occupied.
    pub fn get(&self, id: StationId) -> Option<&StationEntry> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Whether station `id` is occupied.
    pub fn is_occupied(&self, id: StationId) -> bool {
        self.get(id).is_some()
    }

    /// Whether station `id` is occupied with both operands available.
    pub fn is_ready(&self, id: StationId) -> bool {
        self.get(id).is_some_and(StationEntry::is_ready)
    }

    /// Delivers a broadcast: every operand waiting on `source` captures `value`.
    ///
    /// Returns the number of operands woken.
    pub fn on_broadcast(&mut self, source: StationId, value: Value) -> usize {
        let mut woken = 0;
        for entry in self.slots.iter_mut().flatten() {
            for operand in &mut entry.operands {
                if *operand == Operand::AwaitingStation(source) {
                    *operand = Operand::Literal(value);
                    woken += 1;
                }
            }
        }
        woken
    }

    /// Ready, not yet dispatched stations of `group`, oldest issue first.
    pub fn dispatch_candidates(&self, group: UnitGroup) -> Vec<StationId> {
        let mut ready: Vec<(u64, StationId)> = self
            .range(group)
            .filter_map(|i| {
                self.slots[i]
                    .filter(|e| !e.dispatched && e.is_ready())
                    .map(|e| (e.issued_at, StationId(i)))
            })
            .collect();
        ready.sort_unstable();
        ready.into_iter().map(|(_, id)| id).collect()
    }

    /// Marks station `id` as handed to a functional unit.
    pub fn mark_dispatched(&mut self, id: StationId) {
        if let Some(entry) = self.slots[id.0].as_mut() {
            entry.dispatched = true;
        }
    }

    /// Frees station `id`, returning what it held.
    pub fn free(&mut self, id: StationId) -> Option<StationEntry> {
        self.slots[id.0].take()
    }

    /// Number of occupied stations.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// All slots in global order.
    pub fn iter(&self) -> impl Iterator<Item = (StationId, Option<&StationEntry>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (StationId(i), s.as_ref()))
    }
}
