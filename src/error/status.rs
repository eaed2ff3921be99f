use std::fmt;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Lexing or parsing.
    Parse,
    /// Lowering the syntax tree to bytecode.
    Codegen,
    /// Executing a program.
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Codegen => write!(f, "codegen"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Everything a host needs to show an error to the user.
///
/// `offset` is a byte offset into the expression text, enough for an
/// editor to place a marker under the offending span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStatus {
    /// Stage the error was raised in.
    pub stage:   Stage,
    /// Human readable description.
    pub message: String,
    /// Byte offset into the source text.
    pub offset:  usize,
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}
