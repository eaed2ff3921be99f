//! The instruction loop.
//!
//! Programs run strictly in order: there are no jumps, so both operands of
//! `&&` and `||` are always evaluated before the operator.

use tracing::{debug, trace};

use crate::{
    error::{EvalError, RuntimeError, VmFault},
    interpreter::{
        bytecode::{Instruction, Op, Opcode, Program},
        value::Value,
        vm::{Context, Slot},
    },
};

impl Program {
    /// Runs the program in a fresh context with default capacities.
    ///
    /// # Errors
    /// See [`Program::run_in`].
    pub fn run(&self) -> Result<Value, EvalError> {
        self.run_in(&mut Context::new())
    }

    /// Runs the program in `ctx`, which is reset first.
    ///
    /// # Returns
    /// The single value left on the stack.
    ///
    /// # Errors
    /// - [`EvalError::Runtime`] when an operation rejects its operands or a
    ///   host call fails.
    /// - [`EvalError::Fault`] when the context's capacity is exceeded or the
    ///   program leaves anything but one value behind.
    pub fn run_in(&self, ctx: &mut Context<'_>) -> Result<Value, EvalError> {
        ctx.reset();
        let result = self.execute(ctx);
        if let Err(err) = &result {
            debug!(stage = %err.stage(), offset = err.offset(), "run failed: {err}");
        }
        result
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<Value, EvalError> {
        for (pc, instruction) in self.instructions().iter().enumerate() {
            trace!(pc, offset = instruction.offset, op = %instruction.op, "execute");
            self.step(ctx, pc, instruction)?;
        }

        let offset = self.instructions().last().map_or(0, |i| i.offset);
        let depth = ctx.depth();
        if depth != 1 {
            return Err(fault_at(offset)(VmFault::UnbalancedStack { depth }));
        }
        let slot = ctx.pop().map_err(fault_at(offset))?;
        Ok(ctx.value(self, slot).map_err(fault_at(offset))?.clone())
    }

    fn step(&self,
            ctx: &mut Context<'_>,
            pc: usize,
            instruction: &Instruction)
            -> Result<(), EvalError> {
        let offset = instruction.offset;
        let fault = fault_at(offset);

        match &instruction.op {
            Op::PushConst(_) => ctx.push(Slot::Const(pc)).map_err(fault)?,
            Op::PushVar(binding) => {
                let value = binding.var.get(ctx);
                ctx.push_value(value).map_err(fault)?;
            },
            Op::Store(binding) => {
                let slot = ctx.pop().map_err(&fault)?;
                let value = ctx.value(self, slot).map_err(&fault)?.clone();
                binding.var
                       .set(ctx, value)
                       .map_err(|reason| RuntimeError::ReadOnlyVariable { name: binding.name
                                                                               .clone(),
                                                                          reason,
                                                                          offset })?;
                ctx.push(slot).map_err(fault)?;
            },
            Op::Binary(op) => {
                let right = ctx.pop().map_err(&fault)?;
                let left = ctx.pop().map_err(&fault)?;
                let result = binary(*op,
                                    ctx.value(self, left).map_err(&fault)?,
                                    ctx.value(self, right).map_err(&fault)?,
                                    offset)?;
                ctx.push_value(result).map_err(fault)?;
            },
            Op::Unary(op) => {
                let operand = ctx.pop().map_err(&fault)?;
                let result = unary(*op, ctx.value(self, operand).map_err(&fault)?, offset)?;
                ctx.push_value(result).map_err(fault)?;
            },
            Op::Call { name,
                       function,
                       argc,
                       target, } => {
                let mut slots = Vec::with_capacity(*argc);
                for _ in 0..*argc {
                    slots.push(ctx.pop().map_err(&fault)?);
                }
                let args = slots.iter()
                                .rev()
                                .map(|slot| ctx.value(self, *slot).cloned())
                                .collect::<Result<Vec<_>, _>>()
                                .map_err(&fault)?;
                let target = target.as_ref().map(|b| b.var.as_ref());
                let result = function.call(ctx, &args, target).map_err(|message| {
                                                                   RuntimeError::HostFunction {
                                                                       name: name.clone(),
                                                                       message,
                                                                       offset,
                                                                   }
                                                               })?;
                ctx.push_value(result).map_err(fault)?;
            },
        }
        Ok(())
    }
}

fn fault_at(offset: usize) -> impl Fn(VmFault) -> EvalError {
    move |fault| EvalError::Fault { fault, offset }
}

/// Applies a binary operator.
///
/// Arithmetic and ordering need two numbers. Equality compares any two values
/// without failing, and the logical operators coerce through truthiness.
fn binary(op: Opcode, left: &Value, right: &Value, offset: usize) -> Result<Value, RuntimeError> {
    let mismatch = || RuntimeError::TypeMismatch { op: op.symbol(),
                                                   left: left.value_type(),
                                                   right: right.value_type(),
                                                   offset };

    let result = match op {
        Opcode::Equal => Value::from(left == right),
        Opcode::NotEqual => Value::from(left != right),
        Opcode::And => Value::from(left.is_truthy() && right.is_truthy()),
        Opcode::Or => Value::from(left.is_truthy() || right.is_truthy()),
        Opcode::Less | Opcode::LessEqual | Opcode::Greater | Opcode::GreaterEqual => {
            match (left, right) {
                (Value::Numeric(a), Value::Numeric(b)) => Value::from(match op {
                                                                          Opcode::Less => a < b,
                                                                          Opcode::LessEqual => a <= b,
                                                                          Opcode::Greater => a > b,
                                                                          _ => a >= b,
                                                                      }),
                (Value::String(_), Value::String(_)) => {
                    return Err(RuntimeError::StringOrdering { op: op.symbol(),
                                                              offset });
                },
                _ => return Err(mismatch()),
            }
        },
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
            let (Value::Numeric(a), Value::Numeric(b)) = (left, right) else {
                return Err(mismatch());
            };
            match op {
                Opcode::Add => Value::Numeric(a + b),
                Opcode::Sub => Value::Numeric(a - b),
                Opcode::Mul => Value::Numeric(a * b),
                _ if *b == 0.0 => return Err(RuntimeError::DivisionByZero { offset }),
                _ => Value::Numeric(a / b),
            }
        },
        Opcode::Not | Opcode::Negate => return unary(op, right, offset),
    };
    Ok(result)
}

/// Applies a unary operator.
fn unary(op: Opcode, operand: &Value, offset: usize) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (Opcode::Not, value) => Ok(Value::from(!value.is_truthy())),
        (Opcode::Negate, Value::Numeric(n)) => Ok(Value::Numeric(-n)),
        (_, value) => Err(RuntimeError::UnaryTypeMismatch { op: op.symbol(),
                                                            operand: value.value_type(),
                                                            offset }),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::VmConfig;

    fn program(ops: Vec<Op>) -> Program {
        let mut program = Program::new();
        for (offset, op) in ops.into_iter().enumerate() {
            program.push(op, offset);
        }
        program
    }

    #[test]
    fn operator_needs_two_operands() {
        let program = program(vec![Op::PushConst(Value::from(1.0)), Op::Binary(Opcode::Add)]);
        let err = program.run().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.offset(), 1);
        assert!(matches!(err, EvalError::Fault { fault: VmFault::StackUnderflow, .. }));
    }

    #[test]
    fn leftover_values_are_a_fault() {
        let program = program(vec![Op::PushConst(Value::from(1.0)),
                                   Op::PushConst(Value::from(2.0))]);
        assert!(matches!(program.run(),
                         Err(EvalError::Fault { fault: VmFault::UnbalancedStack { depth: 2 },
                                                .. })));
        assert!(matches!(Program::new().run(),
                         Err(EvalError::Fault { fault: VmFault::UnbalancedStack { depth: 0 },
                                                .. })));
    }

    #[test]
    fn heap_capacity_is_enforced() {
        let program = program(vec![Op::PushConst(Value::from(1.0)),
                                   Op::Unary(Opcode::Negate),
                                   Op::Unary(Opcode::Negate)]);
        let mut ctx = Context::with_config(VmConfig { stack_size: 4,
                                                      heap_size:  1, });
        assert!(matches!(program.run_in(&mut ctx),
                         Err(EvalError::Fault { fault: VmFault::HeapExhausted { capacity: 1 },
                                                offset: 2, })));
    }

    #[test]
    fn arithmetic_rejects_non_numbers() {
        assert_eq!(binary(Opcode::Add, &Value::from("a"), &Value::from(1.0), 3),
                   Err(RuntimeError::TypeMismatch { op:     "+",
                                                    left:   crate::interpreter::value::ValueType::String,
                                                    right:  crate::interpreter::value::ValueType::Numeric,
                                                    offset: 3, }));
        let err = unary(Opcode::Negate, &Value::from("a"), 5).unwrap_err();
        assert_eq!(err,
                   RuntimeError::UnaryTypeMismatch { op:      "-",
                                                     operand: crate::interpreter::value::ValueType::String,
                                                     offset:  5, });
        assert_eq!(err.to_string(), "Error at offset 5: Type error: cannot apply '-' to string.");
    }

    #[test]
    fn comparisons_produce_zero_or_one() {
        let one = Value::from(1.0);
        let two = Value::from(2.0);
        assert_eq!(binary(Opcode::Less, &one, &two, 0), Ok(Value::Numeric(1.0)));
        assert_eq!(binary(Opcode::GreaterEqual, &one, &two, 0), Ok(Value::Numeric(0.0)));
        assert_eq!(binary(Opcode::NotEqual, &one, &Value::from("1"), 0), Ok(Value::Numeric(1.0)));
        assert_eq!(binary(Opcode::Or, &Value::Undefined, &Value::from("x"), 0),
                   Ok(Value::Numeric(1.0)));
    }
}
