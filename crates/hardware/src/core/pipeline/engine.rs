//! Tomasulo execution engine.
//!
//! Owns all mutable machine state and advances it one cycle per `tick`, in fixed order:
//! 1. **Issue:** the queue head enters the lowest free station of its group, if any.
//! 2. **Advance:** every busy functional unit counts down; units reaching zero complete.
//! 3. **Dispatch:** ready stations (oldest first) start on free units of their group.
//! 4. **Broadcast:** at most one completed result crosses the common data bus.
//!
//! Issue runs first, so it only sees stations that were free before the cycle began: a
//! station freed by this cycle's broadcast is reused no earlier than the next cycle.

use tracing::{debug, warn};

use crate::common::RegisterFile;
use crate::config::Config;
use crate::core::pipeline::cdb::{self, Broadcast};
use crate::core::pipeline::queue::InstructionQueue;
use crate::core::pipeline::rat::RegisterAliasTable;
use crate::core::pipeline::stations::{ReservationStations, StationId};
use crate::core::units::FunctionalUnits;
use crate::isa::{Instruction, UnitGroup};
use crate::stats::SimStats;

/// What happened during one cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Cycle number just executed (first cycle is 1).
    pub cycle: u64,
    /// Instruction issued this cycle and the station it went to.
    pub issued: Option<(StationId, Instruction)>,
    /// Stations that started executing this cycle.
    pub dispatched: Vec<StationId>,
    /// Result published this cycle.
    pub broadcast: Option<Broadcast>,
}

/// Machine state plus the per-cycle scheduling logic.
#[derive(Clone, Debug, PartialEq)]
pub struct Engine {
    rat: RegisterAliasTable,
    stations: ReservationStations,
    units: FunctionalUnits,
    queue: InstructionQueue,
    cycle: u64,
    last_broadcast: Option<Broadcast>,
    stats: SimStats,
}

impl Engine {
    /// Builds an idle machine in its configured initial state.
    pub fn new(config: &Config) -> Self {
        let regs = RegisterFile::with_values(config.registers.count, &config.registers.initial);
        Self {
            rat: RegisterAliasTable::new(regs),
            stations: ReservationStations::new(config.stations.adders, config.stations.multipliers),
            units: FunctionalUnits::new(&config.units),
            queue: InstructionQueue::new(),
            cycle: 0,
            last_broadcast: None,
            stats: SimStats::default(),
        }
    }

    /// Runs one cycle.
    pub fn tick(&mut self) -> TickReport {
        self.cycle += 1;
        self.stats.cycles += 1;

        let issued = self.issue();
        self.units.advance();
        let dispatched = self.dispatch();
        let broadcast = self.broadcast();
        self.last_broadcast = broadcast;

        TickReport {
            cycle: self.cycle,
            issued,
            dispatched,
            broadcast,
        }
    }

    fn issue(&mut self) -> Option<(StationId, Instruction)> {
        let inst = *self.queue.head()?;
        let group = inst.op.group();
        let Some(slot) = self.stations.find_free_slot(group) else {
            self.stats.issue_stalls += 1;
            debug!(cycle = self.cycle, %inst, %group, "issue stalled: no free station");
            return None;
        };
        self.stations.allocate(slot, &inst, &mut self.rat, self.cycle);
        let _ = self.queue.pop_head();
        self.stats.instructions_issued += 1;
        debug!(cycle = self.cycle, %inst, station = %slot, "issue");
        Some((slot, inst))
    }

    fn dispatch(&mut self) -> Vec<StationId> {
        let mut started = Vec::new();
        for group in [UnitGroup::Adder, UnitGroup::Multiplier] {
            for id in self.stations.dispatch_candidates(group) {
                let Some((op, (a, b))) = self
                    .stations
                    .get(id)
                    .and_then(|e| e.values().map(|v| (e.op, v)))
                else {
                    continue;
                };
                match self.units.group_mut(group).dispatch(id, op, a, b) {
                    Some(unit) => {
                        self.stations.mark_dispatched(id);
                        debug!(cycle = self.cycle, station = %id, %group, unit, "dispatch");
                        started.push(id);
                    }
                    None => self.stats.dispatch_stalls += 1,
                }
            }
        }
        started
    }

    fn broadcast(&mut self) -> Option<Broadcast> {
        let winner = cdb::select_broadcaster(&self.units)?;
        self.stats.cdb_conflicts += (self.units.completed_count() - 1) as u64;

        let effect = cdb::broadcast(&winner, &mut self.rat, &mut self.stations, &mut self.units);
        let Some(effect) = effect else {
            warn!(
                cycle = self.cycle,
                station = %winner.station,
                "broadcast from an empty station dropped"
            );
            return None;
        };
        self.stats.broadcasts += 1;
        if winner.value.is_fault() {
            self.stats.arithmetic_faults += 1;
            warn!(
                cycle = self.cycle,
                station = %winner.station,
                register = effect.dest,
                value = %winner.value,
                "arithmetic fault broadcast"
            );
        }
        debug!(
            cycle = self.cycle,
            station = %winner.station,
            value = %winner.value,
            register = effect.dest,
            written = effect.register_written,
            woken = effect.operands_woken,
            "broadcast"
        );
        Some(winner)
    }

    /// Replaces the instruction queue. Machine state is left as is.
    pub fn load(&mut self, program: impl IntoIterator<Item = Instruction>) {
        self.queue.load(program);
    }

    /// Nothing left to issue and no station occupied.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.stations.occupied() == 0
    }

    /// Cycles executed so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Register file and aliases.
    pub const fn rat(&self) -> &RegisterAliasTable {
        &self.rat
    }

    /// Reservation station pool.
    pub const fn stations(&self) -> &ReservationStations {
        &self.stations
    }

    /// Functional units.
    pub const fn units(&self) -> &FunctionalUnits {
        &self.units
    }

    /// Instructions not yet issued.
    pub const fn queue(&self) -> &InstructionQueue {
        &self.queue
    }

    /// Result published by the most recent cycle, if any.
    pub const fn last_broadcast(&self) -> Option<Broadcast> {
        self.last_broadcast
    }

    /// Accumulated statistics.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }
}
