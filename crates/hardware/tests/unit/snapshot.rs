//! # Snapshot Tests
//!
//! Snapshot contents and JSON wire format.

use pretty_assertions::assert_eq;
use serde_json::json;
use tomasim_core::core::pipeline::stations::StationId;
use tomasim_core::isa::{Op, UnitGroup};

use crate::common::TestContext;
use crate::common::harness::small_config;

#[test]
fn test_stations_numbered_adders_first() {
    let ctx = TestContext::with_config(&small_config(&[], 2, 3, 2, 10));
    let s = ctx.snapshot();
    assert_eq!(s.adder_station_count, 2);
    assert_eq!(s.multiplier_station_count, 3);
    let groups: Vec<UnitGroup> = s.reservation_stations.iter().map(|st| st.group).collect();
    assert_eq!(
        groups,
        vec![
            UnitGroup::Adder,
            UnitGroup::Adder,
            UnitGroup::Multiplier,
            UnitGroup::Multiplier,
            UnitGroup::Multiplier
        ]
    );
    assert_eq!(s.station(StationId(2)).unwrap().id, StationId(2));
    assert_eq!(s.functional_units.len(), 2);
}

#[test]
fn test_snapshot_json_shape() {
    let mut ctx = TestContext::with_config(&small_config(&[1.0], 1, 1, 2, 10))
        .load_text("ADD R1, R0, R0\nMUL R2, R1, 3");
    let _ = ctx.tick();
    let _ = ctx.tick();

    let s = ctx.snapshot();
    let mul = s.station(StationId(1)).unwrap();
    assert_eq!(mul.operation, Some(Op::Mul));
    assert_eq!(mul.destination, Some(2));
    assert!(!mul.executing);

    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["cycle"], json!(2));
    assert_eq!(v["registers"], json!([1.0, 0.0, 0.0, 0.0]));
    assert_eq!(v["register_alias_table"][0], json!({"state": "ready"}));
    assert_eq!(
        v["register_alias_table"][1],
        json!({"state": "pending", "station": 0})
    );
    assert_eq!(v["reservation_stations"][0]["operation"], json!("+"));
    assert_eq!(
        v["reservation_stations"][0]["operands"],
        json!([{"literal": 1.0}, {"literal": 1.0}])
    );
    assert_eq!(
        v["reservation_stations"][1]["operands"],
        json!([{"awaiting_station": 0}, {"literal": 3.0}])
    );
    assert_eq!(v["adder_station_count"], json!(1));
    assert_eq!(v["clock"], json!("stopped"));
    assert_eq!(v["clock_rate"], json!(1.0));
    assert_eq!(v["instruction_queue"], json!([]));
}

#[test]
fn test_empty_station_serializes_nulls() {
    let ctx = TestContext::new();
    let v = serde_json::to_value(ctx.snapshot()).unwrap();
    let st = &v["reservation_stations"][0];
    assert_eq!(st["occupied"], json!(false));
    assert_eq!(st["operation"], json!(null));
    assert_eq!(st["operands"], json!([null, null]));
}

#[test]
fn test_queue_lists_pending_instructions() {
    let ctx = TestContext::new().load_text("ADD R1, R0, R0\nR2 = R1 / 4");
    let s = ctx.snapshot();
    assert_eq!(s.instruction_queue, vec!["ADD R1, R0, R0", "DIV R2, R1, 4"]);
    assert!(!s.is_drained());
    let text = s.to_string();
    assert!(text.starts_with("cycle 0 (stopped, 1 ticks/s)"));
    assert!(text.contains("queue ADD R1, R0, R0 | DIV R2, R1, 4"));
}
