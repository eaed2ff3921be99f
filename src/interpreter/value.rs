/// Runtime value representation.
///
/// Declares [`Value`], the tagged union shared by literals, operands on the
/// virtual machine stack and results handed back to the host, together with
/// [`ValueType`], its type tag.
pub mod core;

pub use self::core::{Value, ValueType};
