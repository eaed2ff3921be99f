/// Parser state and statement-level entry points.
///
/// Holds the token cursor and the node arena, and parses the optional
/// top-level assignment before handing over to the expression grammar.
pub mod core;

/// Binary operator parsing.
///
/// One function per precedence level, from logical OR down to
/// multiplication. All levels are left-associative.
pub mod binary;

/// Unary, postfix and primary expressions.
///
/// Handles `!` and unary `-`, method calls through `.`, literals,
/// references, function calls and parenthesised sub-expressions.
pub mod unary;

/// Helpers shared by the parsing functions.
pub mod utils;

pub use self::core::{ParseResult, Parser, parse};
