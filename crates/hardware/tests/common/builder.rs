use tomasim_core::isa::{Instruction, Op, Source};

/// `Rn` source.
pub const fn r(n: usize) -> Source {
    Source::Register(n)
}

/// Literal source.
pub const fn lit(v: f64) -> Source {
    Source::Literal(v)
}

pub const fn add(dest: usize, a: Source, b: Source) -> Instruction {
    Instruction::new(Op::Add, dest, a, b)
}

pub const fn sub(dest: usize, a: Source, b: Source) -> Instruction {
    Instruction::new(Op::Sub, dest, a, b)
}

pub const fn mul(dest: usize, a: Source, b: Source) -> Instruction {
    Instruction::new(Op::Mul, dest, a, b)
}

pub const fn div(dest: usize, a: Source, b: Source) -> Instruction {
    Instruction::new(Op::Div, dest, a, b)
}
