use crate::interpreter::value::ValueType;

/// Represents all errors that can occur while running a program.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// An operator was applied to operands of the wrong type.
    #[error("Error at offset {offset}: Type error: cannot apply '{op}' to {left} and {right}.")]
    TypeMismatch {
        /// The operator symbol.
        op:     &'static str,
        /// Type of the left operand.
        left:   ValueType,
        /// Type of the right operand.
        right:  ValueType,
        /// Byte offset of the operator.
        offset: usize,
    },
    /// A prefix operator was applied to an operand of the wrong type.
    #[error("Error at offset {offset}: Type error: cannot apply '{op}' to {operand}.")]
    UnaryTypeMismatch {
        /// The operator symbol.
        op:      &'static str,
        /// Type of the operand.
        operand: ValueType,
        /// Byte offset of the operator.
        offset:  usize,
    },
    /// Attempted division by zero.
    #[error("Error at offset {offset}: Division by zero.")]
    DivisionByZero {
        /// Byte offset of the operator.
        offset: usize,
    },
    /// Strings only support `==` and `!=`.
    #[error("Error at offset {offset}: Strings cannot be ordered with '{op}'.")]
    StringOrdering {
        /// The comparison operator.
        op:     &'static str,
        /// Byte offset of the operator.
        offset: usize,
    },
    /// The host refused to store a value into a variable.
    #[error("Error at offset {offset}: Cannot assign to '{name}': {reason}.")]
    ReadOnlyVariable {
        /// The assignment target as written.
        name:   String,
        /// Why the host refused.
        reason: String,
        /// Byte offset of the target.
        offset: usize,
    },
    /// A host function reported a failure.
    #[error("Error at offset {offset}: Function '{name}' failed: {message}.")]
    HostFunction {
        /// The function name.
        name:    String,
        /// The message supplied by the host.
        message: String,
        /// Byte offset of the call.
        offset:  usize,
    },
}

impl RuntimeError {
    /// Byte offset the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::TypeMismatch { offset, .. }
            | Self::UnaryTypeMismatch { offset, .. }
            | Self::DivisionByZero { offset }
            | Self::StringOrdering { offset, .. }
            | Self::ReadOnlyVariable { offset, .. }
            | Self::HostFunction { offset, .. } => *offset,
        }
    }
}

/// Broken invariants inside the virtual machine.
///
/// A program produced by the code generator never triggers these on a context
/// with default capacities. They are reported instead of corrupting state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VmFault {
    /// More values were pushed than the stack can hold.
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow {
        /// Configured stack capacity.
        capacity: usize,
    },
    /// A value was popped from an empty stack.
    #[error("stack underflow")]
    StackUnderflow,
    /// Scratch heap exhausted.
    #[error("scratch heap exhausted (capacity {capacity})")]
    HeapExhausted {
        /// Configured heap capacity.
        capacity: usize,
    },
    /// A stack slot refers to neither a constant nor an allocated cell.
    #[error("stack slot refers to nothing")]
    DanglingSlot,
    /// A program must leave exactly one value behind.
    #[error("program left {depth} values on the stack, expected 1")]
    UnbalancedStack {
        /// Stack depth after the last instruction.
        depth: usize,
    },
}
