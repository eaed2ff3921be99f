//! # rulexpr
//!
//! rulexpr is a small expression language compiler and virtual machine for
//! embedding in host applications. Expressions such as
//! `A.Clearance > 0.2mm && A.NetClass == 'Power'` are compiled once into
//! bytecode and run as often as needed against host-provided variables,
//! fields, functions and unit suffixes.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    error::EvalError,
    interpreter::{Compiler, binding::HostBinding, value::Value},
};

/// Defines the structure of parsed expressions.
///
/// This module declares the arena-backed syntax tree built by the parser and
/// consumed by the code generator. Nodes refer to their children by index and
/// carry the byte offset they were parsed from.
pub mod ast;
/// Compiler and virtual machine settings.
pub mod config;
/// Provides unified error types for every stage of the pipeline.
///
/// This module defines the errors raised while parsing, generating code and
/// running programs, and the [`error::ErrorStatus`] record hosts use to show
/// them. Every error carries the byte offset it refers to.
///
/// # Responsibilities
/// - Defines one error enum per stage plus the machine faults.
/// - Folds them into [`error::EvalError`] for callers that do not care which
///   stage failed.
pub mod error;
/// Orchestrates compilation and execution.
///
/// This module ties together the tokenizer, lexer, parser, code generator,
/// virtual machine and host binding interface, and exposes the
/// [`interpreter::Compiler`].
///
/// # Responsibilities
/// - Coordinates all pipeline stages.
/// - Provides entry points for compiling and running expressions.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;

/// Compiles and runs an expression in one go.
///
/// Uses the default compiler configuration and a fresh context with default
/// capacities. Hosts that evaluate the same expression repeatedly should keep
/// the compiled [`interpreter::bytecode::Program`] instead.
///
/// # Errors
/// The first error of whichever stage failed.
///
/// # Examples
/// ```
/// use rulexpr::{
///     error::Stage,
///     evaluate,
///     interpreter::{binding::TableHost, value::Value},
/// };
///
/// let host = TableHost::new().with_variable("width", 3.0);
/// assert_eq!(evaluate("(width + 1) * 2", &host).unwrap(), Value::Numeric(8.0));
///
/// // 'height' is not known to the host.
/// let err = evaluate("width * height", &host).unwrap_err();
/// assert_eq!(err.stage(), Stage::Codegen);
/// assert_eq!(err.offset(), 8);
/// ```
pub fn evaluate(source: &str, host: &dyn HostBinding) -> Result<Value, EvalError> {
    Compiler::new(host).compile(source)?.run()
}
