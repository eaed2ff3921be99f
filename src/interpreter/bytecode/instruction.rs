//! Instruction definitions.

use std::{fmt, sync::Arc};

use crate::interpreter::{
    binding::{HostFunction, VarRef},
    bytecode::Opcode,
    value::Value,
};

/// A host variable resolved at compile time, with the name it was written as.
#[derive(Clone)]
pub struct Binding {
    /// `name` or `object.field`.
    pub name: String,
    /// The handle returned by the host.
    pub var:  Arc<dyn VarRef>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One machine operation.
#[derive(Clone)]
pub enum Op {
    /// Pushes a constant stored in the instruction itself.
    PushConst(Value),
    /// Reads a host variable and pushes its value.
    PushVar(Binding),
    /// Pops a value, writes it to a host variable and pushes it back.
    Store(Binding),
    /// Pops two operands, left below right, and pushes the result.
    Binary(Opcode),
    /// Pops one operand and pushes the result.
    Unary(Opcode),
    /// Pops `argc` arguments and pushes the function's result.
    Call {
        /// Function name as written.
        name:     String,
        /// The resolved function.
        function: Arc<dyn HostFunction>,
        /// Number of arguments.
        argc:     usize,
        /// Receiver of a method call.
        target:   Option<Binding>,
    },
}

impl fmt::Debug for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushConst(value) => f.debug_tuple("PushConst").field(value).finish(),
            Self::PushVar(binding) => f.debug_tuple("PushVar").field(binding).finish(),
            Self::Store(binding) => f.debug_tuple("Store").field(binding).finish(),
            Self::Binary(op) => f.debug_tuple("Binary").field(op).finish(),
            Self::Unary(op) => f.debug_tuple("Unary").field(op).finish(),
            Self::Call { name, argc, target, .. } => f.debug_struct("Call")
                                                      .field("name", name)
                                                      .field("argc", argc)
                                                      .field("target", target)
                                                      .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushConst(Value::String(s)) => write!(f, "PUSH_CONST '{s}'"),
            Self::PushConst(value) => write!(f, "PUSH_CONST {value}"),
            Self::PushVar(binding) => {
                write!(f, "PUSH_VAR {} ({})", binding.name, binding.var.var_type())
            },
            Self::Store(binding) => write!(f, "STORE {}", binding.name),
            Self::Binary(op) | Self::Unary(op) => write!(f, "{op}"),
            Self::Call { name, argc, target, .. } => {
                write!(f, "CALL {name}/{argc}")?;
                if let Some(target) = target {
                    write!(f, " ON {}", target.name)?;
                }
                Ok(())
            },
        }
    }
}

/// An operation tagged with the source offset it was generated from.
#[derive(Debug, Clone)]
pub struct Instruction {
    /// What to do.
    pub op:     Op,
    /// Byte offset of the expression that produced it.
    pub offset: usize,
}
