/// Operator opcodes.
pub mod opcode;
/// Instructions and the handles they carry.
pub mod instruction;
/// Compiled programs and their listing.
pub mod program;

pub use instruction::{Binding, Instruction, Op};
pub use opcode::Opcode;
pub use program::Program;
