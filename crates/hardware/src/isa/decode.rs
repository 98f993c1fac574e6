//! Program text decoder.
//!
//! Turns program text into `Instruction`s. One instruction per line, in either form:
//!
//! ```text
//! ADD R1, R0, R0      ; mnemonic form
//! R2 = R1 * 2.5       // infix form
//! ```
//!
//! Mnemonics (`ADD`, `SUB`, `MUL`, `DIV`) and register prefixes are case-insensitive.
//! Sources are registers (`Rn`) or numeric literals. `;` and `//` start a comment; blank
//! lines are skipped. Register ranges are not checked here: the register file size is only
//! known to the simulator, which validates on load.

use crate::common::SimError;
use crate::isa::instruction::{Instruction, Op, Source};

/// Decodes a whole program. Line numbers in errors are 1-based.
///
/// # Errors
///
/// Returns the first [`SimError::UnknownOperation`] or [`SimError::MalformedInstruction`].
pub fn decode_program(text: &str) -> Result<Vec<Instruction>, SimError> {
    let mut program = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        if let Some(inst) = decode_line(raw, i + 1)? {
            program.push(inst);
        }
    }
    Ok(program)
}

/// Decodes a single line. Returns `Ok(None)` for blank and comment-only lines.
///
/// # Errors
///
/// Returns [`SimError::UnknownOperation`] or [`SimError::MalformedInstruction`].
pub fn decode_line(raw: &str, line: usize) -> Result<Option<Instruction>, SimError> {
    let text = strip_comment(raw).trim();
    if text.is_empty() {
        return Ok(None);
    }
    let inst = if text.contains('=') {
        decode_infix(text, line)?
    } else {
        decode_mnemonic(text, line)?
    };
    Ok(Some(inst))
}

fn strip_comment(raw: &str) -> &str {
    let cut = [raw.find(';'), raw.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(raw.len());
    &raw[..cut]
}

fn malformed(line: usize, reason: impl Into<String>) -> SimError {
    SimError::MalformedInstruction {
        line,
        reason: reason.into(),
    }
}

/// `ADD R1, R0, 2`
fn decode_mnemonic(text: &str, line: usize) -> Result<Instruction, SimError> {
    let (mnemonic, rest) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| malformed(line, "expected `OP Rd, src1, src2`"))?;
    let op = Op::from_mnemonic(mnemonic).ok_or_else(|| SimError::UnknownOperation {
        line,
        mnemonic: mnemonic.to_string(),
    })?;

    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
    let [dest, src1, src2] = fields.as_slice() else {
        return Err(malformed(
            line,
            format!("expected 3 operands, found {}", fields.len()),
        ));
    };
    Ok(Instruction::new(
        op,
        parse_register(dest, line)?,
        parse_source(src1, line)?,
        parse_source(src2, line)?,
    ))
}

/// `R1 = R0 + 2`
fn decode_infix(text: &str, line: usize) -> Result<Instruction, SimError> {
    let (lhs, rhs) = text
        .split_once('=')
        .ok_or_else(|| malformed(line, "expected `Rd = src1 op src2`"))?;
    let dest = parse_register(lhs.trim(), line)?;
    let rhs = rhs.trim();

    // Skip the first character so a leading sign belongs to the first operand.
    let (pos, symbol) = rhs
        .char_indices()
        .skip(1)
        .find(|&(i, c)| Op::from_symbol(c).is_some() && !is_exponent_sign(&rhs[..i], c))
        .ok_or_else(|| malformed(line, "missing operator (+, -, *, /)"))?;
    let op = Op::from_symbol(symbol).ok_or_else(|| malformed(line, "missing operator"))?;
    let src1 = parse_source(rhs[..pos].trim(), line)?;
    let src2 = parse_source(rhs[pos + symbol.len_utf8()..].trim(), line)?;
    Ok(Instruction::new(op, dest, src1, src2))
}

/// A `+`/`-` directly after the `e` of a numeric literal such as `1e-3`.
fn is_exponent_sign(before: &str, c: char) -> bool {
    if c != '+' && c != '-' {
        return false;
    }
    let mut rev = before.chars().rev();
    matches!(rev.next(), Some('e' | 'E'))
        && rev.next().is_some_and(|d| d.is_ascii_digit() || d == '.')
}

fn parse_register(token: &str, line: usize) -> Result<usize, SimError> {
    token
        .strip_prefix(['R', 'r'])
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| malformed(line, format!("expected a register, found `{token}`")))
}

fn parse_source(token: &str, line: usize) -> Result<Source, SimError> {
    if token.starts_with(['R', 'r']) {
        return parse_register(token, line).map(Source::Register);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Source::Literal)
        .ok_or_else(|| {
            malformed(
                line,
                format!("expected a register or number, found `{token}`"),
            )
        })
}
