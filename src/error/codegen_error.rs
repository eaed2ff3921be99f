/// Represents all errors raised while lowering a syntax tree to bytecode.
///
/// These are resolution failures: the expression is grammatically fine but
/// names something the host does not provide.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// The host has no variable with this name.
    #[error("Error at offset {offset}: Unknown variable '{name}'.")]
    UnknownVariable {
        /// The name of the variable.
        name:   String,
        /// Byte offset of the reference.
        offset: usize,
    },
    /// The host has no such field on the named object.
    #[error("Error at offset {offset}: Unknown field '{field}' on '{object}'.")]
    UnknownField {
        /// The object part of `object.field`.
        object: String,
        /// The field part of `object.field`.
        field:  String,
        /// Byte offset of the reference.
        offset: usize,
    },
    /// The host has no function with this name.
    #[error("Error at offset {offset}: Unknown function '{name}'.")]
    UnknownFunction {
        /// The name of the function.
        name:   String,
        /// Byte offset of the call.
        offset: usize,
    },
    /// A unit suffix was recognised but the host could not convert it.
    #[error("Error at offset {offset}: Cannot convert '{literal}' from unit '{unit}'.")]
    UnknownUnit {
        /// The numeric text.
        literal: String,
        /// The unit suffix as written.
        unit:    String,
        /// Byte offset of the literal.
        offset:  usize,
    },
    /// A method was called on something that is not a variable or field.
    #[error("Error at offset {offset}: Method '{name}' needs a variable or field as its receiver.")]
    InvalidMethodReceiver {
        /// The name of the method.
        name:   String,
        /// Byte offset of the call.
        offset: usize,
    },
    /// Something other than a variable or field appears left of `=`.
    #[error("Error at offset {offset}: Only variables and fields can be assigned to.")]
    InvalidAssignmentTarget {
        /// Byte offset of the target.
        offset: usize,
    },
}

impl CodegenError {
    /// Byte offset the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnknownVariable { offset, .. }
            | Self::UnknownField { offset, .. }
            | Self::UnknownFunction { offset, .. }
            | Self::UnknownUnit { offset, .. }
            | Self::InvalidMethodReceiver { offset, .. }
            | Self::InvalidAssignmentTarget { offset } => *offset,
        }
    }
}
