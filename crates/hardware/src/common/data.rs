//! Register and operand values.
//!
//! A `Value` is what travels through the machine: it is stored in registers, captured by
//! reservation-station operands, and broadcast on the common data bus. It is either a number
//! or an arithmetic fault marker; a fault consumed as an operand poisons the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ArithmeticFault;

/// A numeric value or a propagated arithmetic fault.
///
/// Serialized untagged: numbers appear as plain JSON numbers and faults as their
/// snake-case name (e.g. `"division_by_zero"`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An ordinary numeric result.
    Number(f64),
    /// The error marker left by a faulting operation.
    Fault(ArithmeticFault),
}

impl Value {
    /// Returns the number, or `None` for a fault.
    pub const fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Fault(_) => None,
        }
    }

    /// Returns `true` if this value is a fault marker.
    pub const fn is_fault(self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<ArithmeticFault> for Value {
    fn from(fault: ArithmeticFault) -> Self {
        Self::Fault(fault)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Fault(fault) => write!(f, "ERR({fault})"),
        }
    }
}
