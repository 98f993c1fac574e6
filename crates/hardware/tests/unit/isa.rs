//! # ISA Tests
//!
//! Operation semantics, program text decoding and display.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tomasim_core::SimError;
use tomasim_core::common::{ArithmeticFault, Value};
use tomasim_core::isa::decode::decode_line;
use tomasim_core::isa::{Instruction, Op, Source, UnitGroup, decode_program};

use crate::common::builder::*;

#[rstest]
#[case("ADD R1, R0, R0", add(1, r(0), r(0)))]
#[case("sub r2, R1, 3", sub(2, r(1), lit(3.0)))]
#[case("MUL R3, -1.5, R2", mul(3, lit(-1.5), r(2)))]
#[case("Div R0, R0, 2e1", div(0, r(0), lit(20.0)))]
#[case("R1 = R0 + R0", add(1, r(0), r(0)))]
#[case("R3 = -1 * R2", mul(3, lit(-1.0), r(2)))]
#[case("R2 = R1 - -4", sub(2, r(1), lit(-4.0)))]
#[case("R1 = 1e-3 + R0", add(1, lit(0.001), r(0)))]
#[case("R2 = R0 - 2.5E+2", sub(2, r(0), lit(250.0)))]
#[case("  ADD R1, R0, 1   ; trailing comment", add(1, r(0), lit(1.0)))]
#[case("R1 = R0 / R2 // other comment", div(1, r(0), r(2)))]
fn test_decode_line(#[case] text: &str, #[case] expected: Instruction) {
    assert_eq!(decode_line(text, 1).unwrap(), Some(expected));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("; only a comment")]
#[case("// only a comment")]
fn test_blank_lines_skipped(#[case] text: &str) {
    assert_eq!(decode_line(text, 1).unwrap(), None);
}

#[test]
fn test_unknown_operation_reports_line() {
    let err = decode_program("ADD R1, R0, R0\n\nMOD R1, R0, R0\n").unwrap_err();
    match err {
        SimError::UnknownOperation { line, mnemonic } => {
            assert_eq!(line, 3);
            assert_eq!(mnemonic, "MOD");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[rstest]
#[case("ADD R1, R0")]
#[case("ADD X1, R0, R0")]
#[case("ADD R1, R0, abc")]
#[case("R1 = R0")]
#[case("ADD")]
fn test_malformed_rejected(#[case] text: &str) {
    let err = decode_line(text, 7).unwrap_err();
    assert!(
        matches!(err, SimError::MalformedInstruction { line: 7, .. }),
        "{text}: {err}"
    );
}

#[test]
fn test_display_round_trips_through_decoder() {
    let program = vec![
        add(1, r(0), lit(2.5)),
        sub(2, r(1), r(0)),
        mul(3, lit(-1.0), r(2)),
        div(0, r(3), lit(4.0)),
    ];
    let text: Vec<String> = program.iter().map(ToString::to_string).collect();
    assert_eq!(text[0], "ADD R1, R0, 2.5");
    assert_eq!(decode_program(&text.join("\n")).unwrap(), program);
}

#[test]
fn test_op_groups() {
    assert_eq!(Op::Add.group(), UnitGroup::Adder);
    assert_eq!(Op::Sub.group(), UnitGroup::Adder);
    assert_eq!(Op::Mul.group(), UnitGroup::Multiplier);
    assert_eq!(Op::Div.group(), UnitGroup::Multiplier);
}

#[test]
fn test_division_by_zero_faults() {
    let v = Op::Div.apply(Value::Number(1.0), Value::Number(0.0));
    assert_eq!(v, Value::Fault(ArithmeticFault::DivisionByZero));
    assert!(v.is_fault());
    assert_eq!(v.to_string(), "ERR(division by zero)");
}

#[test]
fn test_fault_propagates_through_operations() {
    let fault = Value::Fault(ArithmeticFault::DivisionByZero);
    assert_eq!(Op::Add.apply(fault, Value::Number(1.0)), fault);
    assert_eq!(Op::Mul.apply(Value::Number(2.0), fault), fault);
}

#[test]
fn test_register_range_checked_on_validate() {
    let inst = add(4, r(0), r(0));
    assert!(matches!(
        inst.validate(4),
        Err(SimError::RegisterOutOfRange { register: 4, count: 4 })
    ));
    assert!(Instruction::new(Op::Add, 3, Source::Register(3), lit(0.0)).validate(4).is_ok());
}
