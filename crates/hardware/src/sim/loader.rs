//! Program Loader.
//!
//! Reads assembly text from disk and decodes it into an instruction list. Register bounds
//! are checked later, against the register file the program is loaded into.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::common::SimError;
use crate::isa::{Instruction, decode_program};

/// Reads and decodes the program at `path`.
///
/// # Errors
///
/// Returns [`SimError::Io`] if the file cannot be read, otherwise any decode error with its
/// 1-based line number.
pub fn load_program_file(path: impl AsRef<Path>) -> Result<Vec<Instruction>, SimError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let program = decode_program(&text)?;
    debug!(path = %path.display(), instructions = program.len(), "program decoded");
    Ok(program)
}
