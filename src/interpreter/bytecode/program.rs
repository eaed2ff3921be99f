use std::fmt;

use crate::interpreter::bytecode::{Instruction, Op};

/// A compiled expression.
///
/// Programs are immutable once built and hold only shared, thread-safe host
/// handles, so one program can be run from several threads at once, each
/// with its own [`Context`](crate::interpreter::vm::Context).
///
/// The `Display` implementation produces a listing with one instruction per
/// line: index, source offset and operation.
///
/// # Example
/// ```
/// use rulexpr::interpreter::{Compiler, binding::TableHost};
///
/// let host = TableHost::new();
/// let program = Compiler::new(&host).compile("1 + 2").unwrap();
/// assert_eq!(program.to_string(),
///            "0000 @0    PUSH_CONST 1\n0001 @4    PUSH_CONST 2\n0002 @2    ADD\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns its index.
    pub fn push(&mut self, op: Op, offset: usize) -> usize {
        self.instructions.push(Instruction { op, offset });
        self.instructions.len() - 1
    }

    /// Removes all instructions.
    pub fn clear(&mut self) {
        self.instructions.clear();
    }

    /// The instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the instruction at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` for a program without instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index:04} @{:<4} {}", instruction.offset, instruction.op)?;
        }
        Ok(())
    }
}
