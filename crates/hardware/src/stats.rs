//! Simulation statistics collection and reporting.
//!
//! This module tracks scheduling metrics for the simulator. It provides:
//! 1. **Throughput:** Cycles, issued instructions, and completed broadcasts (with IPC).
//! 2. **Backpressure:** Issue stalls (no free station) and dispatch stalls (no free unit).
//! 3. **Bus contention:** Completed results that lost common-data-bus arbitration.
//! 4. **Faults:** Arithmetic faults broadcast.

use serde::Serialize;

/// Simulation statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Total cycles simulated.
    pub cycles: u64,
    /// Instructions moved from the queue into a reservation station.
    pub instructions_issued: u64,
    /// Results published on the common data bus.
    pub broadcasts: u64,
    /// Cycles the queue head waited for a free station.
    pub issue_stalls: u64,
    /// Ready stations that could not get a functional unit (counted per station per cycle).
    pub dispatch_stalls: u64,
    /// Completed results held back by bus arbitration (counted per unit per cycle).
    pub cdb_conflicts: u64,
    /// Broadcasts that carried an arithmetic fault.
    pub arithmetic_faults: u64,
}

/// Section names for selective stats output.
pub const STATS_SECTIONS: &[&str] = &["summary", "stalls"];

impl SimStats {
    /// Completed instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.broadcasts as f64 / self.cycles as f64
        }
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }

    /// Prints only the requested sections; an empty slice prints everything.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`].
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;

        if want("summary") {
            println!("\n==========================================================");
            println!("TOMASULO SIMULATION STATISTICS");
            println!("==========================================================");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_issued               {}", self.instructions_issued);
            println!("sim_completed            {}", self.broadcasts);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("arith_faults             {}", self.arithmetic_faults);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            println!("BACKPRESSURE");
            println!(
                "  stalls.issue           {} ({:.2}%)",
                self.issue_stalls,
                self.issue_stalls as f64 / cyc * 100.0
            );
            println!("  stalls.dispatch        {}", self.dispatch_stalls);
            println!("  cdb.conflicts          {}", self.cdb_conflicts);
            println!("----------------------------------------------------------");
        }
    }
}
