/// Parsing errors.
///
/// Defines all error types that can occur while lexing and parsing an
/// expression: unexpected tokens or characters, unterminated strings,
/// unbalanced parentheses and trailing input.
pub mod parse_error;
/// Code generation errors.
///
/// Raised while lowering the syntax tree into bytecode, when the host cannot
/// resolve a variable, field, function or unit suffix.
pub mod codegen_error;
/// Runtime errors and virtual machine faults.
///
/// Runtime errors are user-facing (type mismatches, division by zero, string
/// ordering). Faults signal a broken stack discipline or exhausted capacity
/// and are never caused by well-formed programs.
pub mod runtime_error;
/// The error status record handed to hosts.
pub mod status;

pub use codegen_error::CodegenError;
pub use parse_error::ParseError;
pub use runtime_error::{RuntimeError, VmFault};
pub use status::{ErrorStatus, Stage};

/// Any failure produced while compiling or running an expression.
///
/// Each pipeline stage stops at its first error, so an `EvalError` always
/// describes the first problem found in the pass that produced it.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    /// The source text is not a well-formed expression.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The expression parsed but refers to something the host cannot bind.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    /// Execution failed on the values it was given.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// The virtual machine broke its own invariants.
    #[error("Fatal error at offset {offset}: {fault}")]
    Fault {
        /// What went wrong inside the machine.
        #[source]
        fault:  VmFault,
        /// Source offset of the instruction being executed.
        offset: usize,
    },
}

impl EvalError {
    /// Returns the pipeline stage the error originates from.
    ///
    /// Faults are reported as [`Stage::Runtime`]; use [`EvalError::is_fatal`]
    /// to tell them apart from ordinary runtime errors.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Parse(_) => Stage::Parse,
            Self::Codegen(_) => Stage::Codegen,
            Self::Runtime(_) | Self::Fault { .. } => Stage::Runtime,
        }
    }

    /// Returns the byte offset into the source text the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Parse(e) => e.offset(),
            Self::Codegen(e) => e.offset(),
            Self::Runtime(e) => e.offset(),
            Self::Fault { offset, .. } => *offset,
        }
    }

    /// Returns `true` for virtual machine faults.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }

    /// Builds the status record a host uses to present the error.
    #[must_use]
    pub fn status(&self) -> ErrorStatus {
        ErrorStatus { stage:   self.stage(),
                      message: self.to_string(),
                      offset:  self.offset(), }
    }
}
