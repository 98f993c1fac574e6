//! Common Data Bus.
//!
//! One result per cycle crosses the bus. When several units complete in the same cycle the
//! adder group wins over the multiplier group and, within a group, the lowest unit index
//! wins. Losers keep their result and contend again next cycle.
//!
//! A broadcast, applied within the cycle it wins:
//! 1. writes the destination register and clears its alias, unless a newer writer has since
//!    renamed it;
//! 2. wakes every station operand waiting on the producing station;
//! 3. frees the producing station and functional unit.

use serde::Serialize;

use crate::common::Value;
use crate::core::pipeline::rat::RegisterAliasTable;
use crate::core::pipeline::stations::{ReservationStations, StationId};
use crate::core::units::FunctionalUnits;
use crate::isa::UnitGroup;

/// A result selected to cross the bus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Broadcast {
    /// Unit group the result came from.
    pub group: UnitGroup,
    /// Unit index within the group.
    pub unit: usize,
    /// Producing station (the tag consumers wait on).
    pub station: StationId,
    /// The value.
    pub value: Value,
}

/// Outcome of applying a broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BroadcastEffect {
    /// Destination register of the producing station.
    pub dest: usize,
    /// Whether the register file was written (false for a stale producer).
    pub register_written: bool,
    /// Number of station operands that captured the value.
    pub operands_woken: usize,
}

/// Picks the single completed unit that may broadcast this cycle.
pub fn select_broadcaster(units: &FunctionalUnits) -> Option<Broadcast> {
    units.groups().into_iter().find_map(|g| {
        g.completed()
            .next()
            .map(|(unit, station, value)| Broadcast {
                group: g.group(),
                unit,
                station,
                value,
            })
    })
}

/// Applies `b` to the register alias table, the station pool, and the functional units.
///
/// Returns `None` if the producing station is not occupied, which would mean the unit and
/// station pool disagree; the unit is released either way.
pub fn broadcast(
    b: &Broadcast,
    rat: &mut RegisterAliasTable,
    stations: &mut ReservationStations,
    units: &mut FunctionalUnits,
) -> Option<BroadcastEffect> {
    units.group_mut(b.group).release(b.unit);
    let entry = stations.free(b.station)?;
    let register_written = rat.resolve(entry.dest, b.value, b.station);
    let operands_woken = stations.on_broadcast(b.station, b.value);
    Some(BroadcastEffect {
        dest: entry.dest,
        register_written,
        operands_woken,
    })
}
