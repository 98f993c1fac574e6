//! Configuration system for the Tomasulo simulator.
//!
//! This module defines all configuration structures used to parameterize the machine.
//! It provides:
//! 1. **Defaults:** Baseline machine shape (register count, station counts, unit counts,
//!    latencies, clock rate).
//! 2. **Structures:** Hierarchical config for general, register, station and unit settings.
//! 3. **Validation:** Rejection of inconsistent configurations before a simulator is built.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or use
//! `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::SimError;
use crate::isa::UnitGroup;

/// Default configuration constants for the simulator.
mod defaults {
    /// Clock rate in ticks per second.
    pub const CLOCK_RATE: f64 = 1.0;

    /// Number of architectural registers.
    pub const REGISTER_COUNT: usize = 4;

    /// Adder-group reservation stations.
    pub const ADDER_STATIONS: usize = 3;

    /// Multiplier-group reservation stations.
    pub const MULTIPLIER_STATIONS: usize = 2;

    /// Adder functional units.
    pub const ADDER_UNITS: usize = 1;

    /// Multiplier functional units.
    pub const MULTIPLIER_UNITS: usize = 1;

    /// Cycles for `+` and `-`.
    pub const ADD_LATENCY: u32 = 2;

    /// Cycles for `*` and `/`.
    pub const MUL_LATENCY: u32 = 10;
}

/// Root configuration.
///
/// # Example
///
/// ```
/// use tomasim_core::config::Config;
///
/// let json = r#"{
///     "registers": { "count": 4, "initial": [1.0, 0.0, 0.0, 0.0] },
///     "units": { "add_latency": 2 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.registers.initial[0], 1.0);
/// assert_eq!(config.stations.adders, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Register file shape and initial contents
    #[serde(default)]
    pub registers: RegisterConfig,
    /// Reservation station counts per group
    #[serde(default)]
    pub stations: StationConfig,
    /// Functional unit counts and latencies per group
    #[serde(default)]
    pub units: UnitConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] for malformed JSON and any error from [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidClockRate`] for a non-positive or non-finite rate and
    /// [`SimError::InvalidConfig`] for empty groups, zero latencies, an empty register file,
    /// or more initial values than registers.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_clock_rate(self.general.clock_rate)?;
        if self.registers.count == 0 {
            return Err(SimError::InvalidConfig("register file must not be empty".into()));
        }
        if self.registers.initial.len() > self.registers.count {
            return Err(SimError::InvalidConfig(format!(
                "{} initial values for {} registers",
                self.registers.initial.len(),
                self.registers.count
            )));
        }
        if let Some(v) = self.registers.initial.iter().find(|v| !v.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "initial register value {v} is not finite"
            )));
        }
        for group in [UnitGroup::Adder, UnitGroup::Multiplier] {
            if self.stations.count(group) == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{group} group needs at least one reservation station"
                )));
            }
            if self.units.count(group) == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{group} group needs at least one functional unit"
                )));
            }
            if self.units.latency(group) == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{group} latency must be at least one cycle"
                )));
            }
        }
        Ok(())
    }
}

/// Checks that `rate` is a usable ticks-per-second value.
///
/// # Errors
///
/// Returns [`SimError::InvalidClockRate`] unless `rate` is finite and strictly positive.
pub fn validate_clock_rate(rate: f64) -> Result<(), SimError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidClockRate(rate))
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Real-time clock rate in ticks per second
    #[serde(default = "GeneralConfig::default_clock_rate")]
    pub clock_rate: f64,

    /// Emit a debug-level summary event after every tick
    #[serde(default)]
    pub trace_ticks: bool,
}

impl GeneralConfig {
    fn default_clock_rate() -> f64 {
        defaults::CLOCK_RATE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            clock_rate: defaults::CLOCK_RATE,
            trace_ticks: false,
        }
    }
}

/// Register file configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Number of registers (`R0..Rcount-1`)
    #[serde(default = "RegisterConfig::default_count")]
    pub count: usize,

    /// Initial register values; missing trailing entries start at zero
    #[serde(default)]
    pub initial: Vec<f64>,
}

impl RegisterConfig {
    fn default_count() -> usize {
        defaults::REGISTER_COUNT
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            count: defaults::REGISTER_COUNT,
            initial: Vec::new(),
        }
    }
}

/// Reservation station counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    /// Adder-group stations
    #[serde(default = "StationConfig::default_adders")]
    pub adders: usize,

    /// Multiplier-group stations
    #[serde(default = "StationConfig::default_multipliers")]
    pub multipliers: usize,
}

impl StationConfig {
    fn default_adders() -> usize {
        defaults::ADDER_STATIONS
    }

    fn default_multipliers() -> usize {
        defaults::MULTIPLIER_STATIONS
    }

    /// Station count for `group`.
    pub const fn count(&self, group: UnitGroup) -> usize {
        match group {
            UnitGroup::Adder => self.adders,
            UnitGroup::Multiplier => self.multipliers,
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            adders: defaults::ADDER_STATIONS,
            multipliers: defaults::MULTIPLIER_STATIONS,
        }
    }
}

/// Functional unit counts and latencies.
///
/// Latency is fixed per group: every operation of a group takes the same number of cycles
/// from dispatch to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Adder units
    #[serde(default = "UnitConfig::default_adders")]
    pub adders: usize,

    /// Multiplier units
    #[serde(default = "UnitConfig::default_multipliers")]
    pub multipliers: usize,

    /// Cycles for `+` and `-`
    #[serde(default = "UnitConfig::default_add_latency")]
    pub add_latency: u32,

    /// Cycles for `*` and `/`
    #[serde(default = "UnitConfig::default_mul_latency")]
    pub mul_latency: u32,
}

impl UnitConfig {
    fn default_adders() -> usize {
        defaults::ADDER_UNITS
    }

    fn default_multipliers() -> usize {
        defaults::MULTIPLIER_UNITS
    }

    fn default_add_latency() -> u32 {
        defaults::ADD_LATENCY
    }

    fn default_mul_latency() -> u32 {
        defaults::MUL_LATENCY
    }

    /// Unit count for `group`.
    pub const fn count(&self, group: UnitGroup) -> usize {
        match group {
            UnitGroup::Adder => self.adders,
            UnitGroup::Multiplier => self.multipliers,
        }
    }

    /// Latency for `group`.
    pub const fn latency(&self, group: UnitGroup) -> u32 {
        match group {
            UnitGroup::Adder => self.add_latency,
            UnitGroup::Multiplier => self.mul_latency,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            adders: defaults::ADDER_UNITS,
            multipliers: defaults::MULTIPLIER_UNITS,
            add_latency: defaults::ADD_LATENCY,
            mul_latency: defaults::MUL_LATENCY,
        }
    }
}
