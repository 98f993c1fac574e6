//! # Statistics Tests

use pretty_assertions::assert_eq;
use tomasim_core::stats::{STATS_SECTIONS, SimStats};

use crate::common::TestContext;

#[test]
fn test_single_instruction_counts() {
    let mut ctx = TestContext::new().load_text("ADD R1, R0, R0");
    let _ = ctx.drain(10);
    let stats = ctx.sim.stats();
    assert_eq!(
        *stats,
        SimStats {
            cycles: 3,
            instructions_issued: 1,
            broadcasts: 1,
            ..SimStats::default()
        }
    );
    assert!((stats.ipc() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_ipc_of_idle_machine() {
    assert_eq!(SimStats::default().ipc(), 0.0);
}

#[test]
fn test_sections_print_without_panicking() {
    let mut ctx = TestContext::new().load_text("MUL R1, R0, 2\nMUL R2, R0, 3\nMUL R3, R0, 4");
    let _ = ctx.drain(100);
    assert!(ctx.sim.stats().issue_stalls > 0);
    ctx.sim.stats().print();
    ctx.sim.stats().print_sections(&[STATS_SECTIONS[1].to_string()]);
}
