//! Instruction model.
//!
//! Defines the small arithmetic instruction set the machine executes:
//! 1. **Operations:** `+`, `-`, `*`, `/` and the functional-unit group each one needs.
//! 2. **Sources:** A source operand is a register index or an immediate literal.
//! 3. **Instructions:** Immutable `op rd, src1, src2` records in program order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{ArithmeticFault, SimError, Value};

/// Functional-unit group an operation executes on.
///
/// Ordering is significant: `Adder < Multiplier` is the common-data-bus priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitGroup {
    /// Adder group: `+` and `-`.
    Adder,
    /// Multiplier group: `*` and `/`.
    Multiplier,
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adder => write!(f, "adder"),
            Self::Multiplier => write!(f, "multiplier"),
        }
    }
}

/// Arithmetic operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// Addition.
    #[serde(rename = "+")]
    Add,
    /// Subtraction.
    #[serde(rename = "-")]
    Sub,
    /// Multiplication.
    #[serde(rename = "*")]
    Mul,
    /// Division.
    #[serde(rename = "/")]
    Div,
}

impl Op {
    /// Functional-unit group that executes this operation.
    pub const fn group(self) -> UnitGroup {
        match self {
            Self::Add | Self::Sub => UnitGroup::Adder,
            Self::Mul | Self::Div => UnitGroup::Multiplier,
        }
    }

    /// Assembly mnemonic (`ADD`, `SUB`, `MUL`, `DIV`).
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
        }
    }

    /// Infix operator symbol.
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Looks up an operation by mnemonic, case-insensitively.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADD" => Some(Self::Add),
            "SUB" => Some(Self::Sub),
            "MUL" => Some(Self::Mul),
            "DIV" => Some(Self::Div),
            _ => None,
        }
    }

    /// Looks up an operation by its infix symbol.
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    /// Computes `a op b`.
    ///
    /// A fault in either operand propagates (left operand first). Division by exactly zero
    /// yields [`ArithmeticFault::DivisionByZero`] instead of an infinity.
    pub fn apply(self, a: Value, b: Value) -> Value {
        let (x, y) = match (a, b) {
            (Value::Fault(f), _) | (_, Value::Fault(f)) => return Value::Fault(f),
            (Value::Number(x), Value::Number(y)) => (x, y),
        };
        match self {
            Self::Add => Value::Number(x + y),
            Self::Sub => Value::Number(x - y),
            Self::Mul => Value::Number(x * y),
            Self::Div if y == 0.0 => Value::Fault(ArithmeticFault::DivisionByZero),
            Self::Div => Value::Number(x / y),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Source operand of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Read register `Rn` at issue time (through the alias table).
    Register(usize),
    /// Immediate value.
    Literal(f64),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(r) => write!(f, "R{r}"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

/// A single arithmetic instruction: `dest = src1 op src2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation to perform.
    pub op: Op,
    /// Destination register index.
    pub dest: usize,
    /// First source operand.
    pub src1: Source,
    /// Second source operand.
    pub src2: Source,
}

impl Instruction {
    /// Creates a new instruction.
    pub const fn new(op: Op, dest: usize, src1: Source, src2: Source) -> Self {
        Self {
            op,
            dest,
            src1,
            src2,
        }
    }

    /// Source operands in order.
    pub const fn sources(&self) -> [Source; 2] {
        [self.src1, self.src2]
    }

    /// Checks every register reference against a register file of `count` registers.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::RegisterOutOfRange`] for the first register index `>= count`.
    pub fn validate(&self, count: usize) -> Result<(), SimError> {
        let check = |register: usize| {
            if register < count {
                Ok(())
            } else {
                Err(SimError::RegisterOutOfRange { register, count })
            }
        };
        check(self.dest)?;
        for src in self.sources() {
            if let Source::Register(r) = src {
                check(r)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    /// Formats in assembly syntax, e.g. `ADD R1, R0, 2.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} R{}, {}, {}",
            self.op.mnemonic(),
            self.dest,
            self.src1,
            self.src2
        )
    }
}
