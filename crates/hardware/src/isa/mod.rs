//! Instruction Set Definitions.
//!
//! The machine executes a four-operation arithmetic ISA:
//!
//! * `ADD` / `SUB` on the adder group.
//! * `MUL` / `DIV` on the multiplier group.
//!
//! Instructions are built directly or decoded from program text.

/// Program text decoder (mnemonic and infix forms).
pub mod decode;

/// Operations, source operands and instruction records.
pub mod instruction;

pub use decode::decode_program;
pub use instruction::{Instruction, Op, Source, UnitGroup};
