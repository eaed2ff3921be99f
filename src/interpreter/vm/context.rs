use std::any::Any;

use crate::{
    config::VmConfig,
    error::VmFault,
    interpreter::{
        bytecode::{Op, Program},
        value::Value,
    },
};

/// A stack entry.
///
/// Constants are not copied onto the stack; their slot points back into the
/// program. Everything computed during the run lives in the scratch heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Index of a `PushConst` instruction.
    Const(usize),
    /// Index of a scratch heap cell.
    Scratch(usize),
}

/// Per-evaluation machine state.
///
/// A context is reset at the start of every run, so it can be reused for
/// any number of runs of any number of programs. It is never shared between
/// threads; give each thread its own.
///
/// # Example
/// ```
/// use rulexpr::{
///     config::VmConfig,
///     interpreter::{Compiler, binding::TableHost, value::Value, vm::Context},
/// };
///
/// let host = TableHost::new();
/// let program = Compiler::new(&host).compile("2 * 21").unwrap();
///
/// let mut ctx = Context::with_config(VmConfig::new());
/// assert_eq!(program.run_in(&mut ctx).unwrap(), Value::Numeric(42.0));
/// assert_eq!(program.run_in(&mut ctx).unwrap(), Value::Numeric(42.0));
/// ```
#[derive(Debug, Default)]
pub struct Context<'h> {
    stack:  Vec<Slot>,
    heap:   Vec<Value>,
    config: VmConfig,
    data:   Option<&'h dyn Any>,
}

impl<'h> Context<'h> {
    /// Creates a context with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with the given capacities.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self { stack: Vec::with_capacity(config.stack_size),
               heap: Vec::with_capacity(config.heap_size),
               config,
               data: None }
    }

    /// Attaches host data that variables and functions can read back with
    /// [`Context::data`].
    #[must_use]
    pub fn with_data(mut self, data: &'h dyn Any) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the attached host data if it has type `T`.
    #[must_use]
    pub fn data<T: Any>(&self) -> Option<&'h T> {
        self.data?.downcast_ref()
    }

    /// The capacity limits of this context.
    #[must_use]
    pub const fn config(&self) -> VmConfig {
        self.config
    }

    /// Empties the stack and the heap.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.heap.clear();
    }

    /// Current stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pushes a slot.
    ///
    /// # Errors
    /// [`VmFault::StackOverflow`] when the stack is full.
    pub fn push(&mut self, slot: Slot) -> Result<(), VmFault> {
        if self.stack.len() >= self.config.stack_size {
            return Err(VmFault::StackOverflow { capacity: self.config.stack_size });
        }
        self.stack.push(slot);
        Ok(())
    }

    /// Pops the top slot.
    ///
    /// # Errors
    /// [`VmFault::StackUnderflow`] when the stack is empty.
    pub fn pop(&mut self) -> Result<Slot, VmFault> {
        self.stack.pop().ok_or(VmFault::StackUnderflow)
    }

    /// Stores a value in a fresh heap cell and returns its slot.
    ///
    /// # Errors
    /// [`VmFault::HeapExhausted`] when every cell is taken.
    pub fn alloc(&mut self, value: Value) -> Result<Slot, VmFault> {
        if self.heap.len() >= self.config.heap_size {
            return Err(VmFault::HeapExhausted { capacity: self.config.heap_size });
        }
        self.heap.push(value);
        Ok(Slot::Scratch(self.heap.len() - 1))
    }

    /// Allocates `value` and pushes its slot.
    ///
    /// # Errors
    /// Heap exhaustion or stack overflow.
    pub fn push_value(&mut self, value: Value) -> Result<(), VmFault> {
        let slot = self.alloc(value)?;
        self.push(slot)
    }

    /// Looks up the value a slot refers to.
    ///
    /// # Errors
    /// [`VmFault::DanglingSlot`] when the slot points at something that is
    /// not a constant or an allocated cell.
    pub fn value<'a>(&'a self, program: &'a Program, slot: Slot) -> Result<&'a Value, VmFault> {
        match slot {
            Slot::Const(index) => match program.get(index).map(|i| &i.op) {
                Some(Op::PushConst(value)) => Ok(value),
                _ => Err(VmFault::DanglingSlot),
            },
            Slot::Scratch(index) => self.heap.get(index).ok_or(VmFault::DanglingSlot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Context<'static> {
        Context::with_config(VmConfig { stack_size: 2,
                                        heap_size:  1, })
    }

    #[test]
    fn stack_is_bounded() {
        let mut ctx = small();
        ctx.push(Slot::Const(0)).unwrap();
        ctx.push(Slot::Const(1)).unwrap();
        assert_eq!(ctx.push(Slot::Const(2)), Err(VmFault::StackOverflow { capacity: 2 }));
        assert_eq!(ctx.pop(), Ok(Slot::Const(1)));
        assert_eq!(ctx.pop(), Ok(Slot::Const(0)));
        assert_eq!(ctx.pop(), Err(VmFault::StackUnderflow));
    }

    #[test]
    fn heap_is_bounded_and_reset() {
        let mut ctx = small();
        assert_eq!(ctx.alloc(Value::from(1.0)), Ok(Slot::Scratch(0)));
        assert_eq!(ctx.alloc(Value::from(2.0)), Err(VmFault::HeapExhausted { capacity: 1 }));
        ctx.reset();
        assert_eq!(ctx.alloc(Value::from(3.0)), Ok(Slot::Scratch(0)));
    }

    #[test]
    fn slots_resolve_against_program_and_heap() {
        let mut program = Program::new();
        program.push(Op::PushConst(Value::from("pad")), 0);
        let mut ctx = Context::new();
        let scratch = ctx.alloc(Value::from(7.0)).unwrap();

        assert_eq!(ctx.value(&program, Slot::Const(0)), Ok(&Value::from("pad")));
        assert_eq!(ctx.value(&program, scratch), Ok(&Value::Numeric(7.0)));
        assert_eq!(ctx.value(&program, Slot::Scratch(3)), Err(VmFault::DanglingSlot));
    }

    #[test]
    fn host_data_downcasts() {
        let board = String::from("board");
        let ctx = Context::new().with_data(&board);
        assert_eq!(ctx.data::<String>().map(String::as_str), Some("board"));
        assert!(ctx.data::<u32>().is_none());
    }
}
