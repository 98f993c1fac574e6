//! Error and fault definitions.
//!
//! This module defines the two kinds of failure the simulator distinguishes:
//! 1. **Boundary errors:** `SimError`, returned by configuration, program loading and clock
//!    control when a request is rejected. Simulation state is left unchanged.
//! 2. **Arithmetic faults:** `ArithmeticFault`, a value-level sentinel produced by a functional
//!    unit. Faults travel over the common data bus like any other result and never abort a tick.
//!
//! Resource exhaustion (no free station or unit) is not represented here: it is ordinary
//! backpressure and is only visible in the statistics.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned at the simulator's control boundary.
///
/// Every variant except `Io` and `Parse` is a configuration error in the sense that the
/// caller asked for something the machine cannot accept; see
/// [`SimError::is_configuration_error`].
#[derive(Debug, Error)]
pub enum SimError {
    /// The requested clock rate is zero, negative, or not finite.
    #[error("invalid clock rate {0}: ticks per second must be a positive, finite number")]
    InvalidClockRate(f64),

    /// An instruction names a register outside the register file.
    #[error("register R{register} is out of range (register file has {count} registers)")]
    RegisterOutOfRange {
        /// Offending register index.
        register: usize,
        /// Size of the register file.
        count: usize,
    },

    /// A program line uses a mnemonic outside the supported operation set.
    #[error("line {line}: unknown operation `{mnemonic}`")]
    UnknownOperation {
        /// 1-based source line.
        line: usize,
        /// The mnemonic as written.
        mnemonic: String,
    },

    /// A program line could not be parsed.
    #[error("line {line}: malformed instruction: {reason}")]
    MalformedInstruction {
        /// 1-based source line.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The operation is only defined while the clock is stopped.
    #[error("operation rejected: the clock is running")]
    ClockRunning,

    /// The machine configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON configuration could not be deserialized.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading a file or spawning the clock thread failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SimError {
    /// Returns `true` for rejected requests, as opposed to I/O or JSON syntax failures.
    pub const fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Parse(_))
    }
}

/// Fault sentinel produced by a functional unit instead of a numeric result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticFault {
    /// Division whose divisor was exactly zero.
    DivisionByZero,
}

impl fmt::Display for ArithmeticFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
        }
    }
}
