/// Execution context: operand stack, scratch heap and host data.
pub mod context;
/// The instruction loop.
pub mod machine;

pub use context::{Context, Slot};
