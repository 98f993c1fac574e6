//! # Configuration Tests
//!
//! Defaults, JSON deserialization and validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;
use tomasim_core::SimError;
use tomasim_core::config::*;
use tomasim_core::isa::UnitGroup;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.general.clock_rate, 1.0);
    assert!(!config.general.trace_ticks);
    assert_eq!(config.registers.count, 4);
    assert!(config.registers.initial.is_empty());
    assert_eq!(config.stations.adders, 3);
    assert_eq!(config.stations.multipliers, 2);
    assert_eq!(config.units.adders, 1);
    assert_eq!(config.units.multipliers, 1);
    assert_eq!(config.units.add_latency, 2);
    assert_eq!(config.units.mul_latency, 10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_group_accessors() {
    let config = Config::default();
    assert_eq!(config.stations.count(UnitGroup::Multiplier), 2);
    assert_eq!(config.units.latency(UnitGroup::Adder), 2);
    assert_eq!(config.units.latency(UnitGroup::Multiplier), 10);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = Config::from_json(r#"{"units": {"mul_latency": 4}}"#).unwrap();
    assert_eq!(config.units.mul_latency, 4);
    assert_eq!(config.units.add_latency, 2);
    assert_eq!(config.stations, StationConfig::default());
}

#[test]
fn test_empty_json_is_default() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = Config::from_json("{ not json").unwrap_err();
    assert!(matches!(err, SimError::Parse(_)));
    assert!(!err.is_configuration_error());
}

#[rstest]
#[case::no_adder_stations(r#"{"stations": {"adders": 0}}"#)]
#[case::no_multiplier_units(r#"{"units": {"multipliers": 0}}"#)]
#[case::zero_latency(r#"{"units": {"add_latency": 0}}"#)]
#[case::no_registers(r#"{"registers": {"count": 0}}"#)]
#[case::too_many_initial(r#"{"registers": {"count": 2, "initial": [1, 2, 3]}}"#)]
fn test_invalid_shape_rejected(#[case] json: &str) {
    let err = Config::from_json(json).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)), "{err}");
    assert!(err.is_configuration_error());
}

#[rstest]
#[case(0.0)]
#[case(-2.5)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_invalid_clock_rate(#[case] rate: f64) {
    assert!(matches!(validate_clock_rate(rate), Err(SimError::InvalidClockRate(_))));
    let mut config = Config::default();
    config.general.clock_rate = rate;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"general": {{"clock_rate": 50.0}}, "registers": {{"count": 8, "initial": [1.5]}}}}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.general.clock_rate, 50.0);
    assert_eq!(config.registers.count, 8);
    assert_eq!(config.registers.initial, vec![1.5]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}
