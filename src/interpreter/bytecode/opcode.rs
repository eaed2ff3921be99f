//! Operator opcodes.
//!
//! Only the operators live here. Pushing, storing and calling carry operands
//! and are variants of [`Op`](super::Op) instead.

use std::fmt;

use crate::ast::{BinaryOperator, UnaryOperator};

/// An operator applied to values on top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Negate,

    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logic
    And,
    Or,
    Not,
}

impl Opcode {
    /// Upper-case name used in program listings.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Negate => "NEG",
            Self::Equal => "EQ",
            Self::NotEqual => "NE",
            Self::Less => "LT",
            Self::LessEqual => "LE",
            Self::Greater => "GT",
            Self::GreaterEqual => "GE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }

    /// The operator as written in expressions.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub | Self::Negate => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
        }
    }
}

impl From<BinaryOperator> for Opcode {
    fn from(op: BinaryOperator) -> Self {
        match op {
            BinaryOperator::Mul => Self::Mul,
            BinaryOperator::Div => Self::Div,
            BinaryOperator::Add => Self::Add,
            BinaryOperator::Sub => Self::Sub,
            BinaryOperator::Less => Self::Less,
            BinaryOperator::Greater => Self::Greater,
            BinaryOperator::LessEqual => Self::LessEqual,
            BinaryOperator::GreaterEqual => Self::GreaterEqual,
            BinaryOperator::Equal => Self::Equal,
            BinaryOperator::NotEqual => Self::NotEqual,
            BinaryOperator::And => Self::And,
            BinaryOperator::Or => Self::Or,
        }
    }
}

impl From<UnaryOperator> for Opcode {
    fn from(op: UnaryOperator) -> Self {
        match op {
            UnaryOperator::Not => Self::Not,
            UnaryOperator::Negate => Self::Negate,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
