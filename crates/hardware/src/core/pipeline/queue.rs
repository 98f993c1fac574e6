//! Instruction Queue.
//!
//! Program-order backlog of instructions that have not issued yet. Only the head may issue;
//! if its group has no free station it stays at the head and everything behind it waits.

use std::collections::VecDeque;

use crate::isa::Instruction;

/// FIFO of not-yet-issued instructions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionQueue {
    queue: VecDeque<Instruction>,
}

impl InstructionQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole backlog with `program`.
    pub fn load(&mut self, program: impl IntoIterator<Item = Instruction>) {
        self.queue = program.into_iter().collect();
    }

    /// The next instruction to issue.
    pub fn head(&self) -> Option<&Instruction> {
        self.queue.front()
    }

    /// Removes and returns the head after it issued.
    pub fn pop_head(&mut self) -> Option<Instruction> {
        self.queue.pop_front()
    }

    /// Number of queued instructions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is left to issue.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued instructions in program order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.queue.iter()
    }
}
