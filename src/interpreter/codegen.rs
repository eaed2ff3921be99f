//! Lowering of syntax trees to bytecode.
//!
//! The generator walks the tree children first, so every operand is on the
//! stack before the instruction that consumes it. Host names are resolved
//! here, once, and the resulting handles are stored in the program.
//!
//! The walk keeps its own work list instead of recursing. Operator chains
//! such as `1 + 1 + ... + 1` fold to the left without any nesting limit, so
//! tree depth is bounded only by the input length.

use crate::{
    ast::{Ast, NodeId, NodeKind},
    error::CodegenError,
    interpreter::{
        binding::HostBinding,
        bytecode::{Binding, Op, Program},
        value::Value,
    },
};

pub type CodegenResult<T> = Result<T, CodegenError>;

/// A pending piece of the post-order walk.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Emit the node's children, or the node itself if it is a leaf.
    Enter(NodeId),
    /// Children are done; emit the node's own instruction.
    Exit(NodeId),
}

/// Emits the bytecode for one syntax tree.
pub struct CodeGenerator<'a> {
    host:    &'a dyn HostBinding,
    ast:     &'a Ast,
    program: &'a mut Program,
    steps:   Vec<Step>,
    targets: Vec<Binding>,
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator that appends to `program`.
    pub fn new(host: &'a dyn HostBinding, ast: &'a Ast, program: &'a mut Program) -> Self {
        Self { host,
               ast,
               program,
               steps: Vec::new(),
               targets: Vec::new() }
    }

    /// Clears the program and emits the whole tree into it.
    ///
    /// An empty tree produces an empty program. On failure the program is
    /// left cleared.
    ///
    /// # Errors
    /// The first [`CodegenError`] met in evaluation order.
    pub fn generate(mut self) -> CodegenResult<()> {
        self.program.clear();
        let Some(root) = self.ast.root() else {
            return Ok(());
        };
        let result = self.emit(root);
        if result.is_err() {
            self.program.clear();
        }
        result
    }

    fn emit(&mut self, root: NodeId) -> CodegenResult<()> {
        self.steps.push(Step::Enter(root));
        while let Some(step) = self.steps.pop() {
            match step {
                Step::Enter(id) => self.enter(id)?,
                Step::Exit(id) => self.exit(id)?,
            }
        }
        Ok(())
    }

    /// Emits a leaf, or schedules a node's children ahead of its exit.
    ///
    /// Children are pushed in reverse so that they come off the work list in
    /// source order.
    fn enter(&mut self, id: NodeId) -> CodegenResult<()> {
        let ast = self.ast;
        let node = ast.node(id);
        let offset = node.offset;

        match &node.kind {
            NodeKind::Number { value, text, unit } => {
                let value = match unit {
                    None => *value,
                    Some((index, name)) => {
                        self.host
                            .units()
                            .convert(text, *index)
                            .ok_or_else(|| CodegenError::UnknownUnit { literal: text.clone(),
                                                                       unit: name.clone(),
                                                                       offset })?
                    },
                };
                self.program.push(Op::PushConst(Value::Numeric(value)), offset);
            },
            NodeKind::String(text) => {
                self.program.push(Op::PushConst(Value::String(text.clone())), offset);
            },
            NodeKind::Identifier(_) | NodeKind::FieldRef { .. } => {
                let binding = self.resolve_reference(id)?;
                self.program.push(Op::PushVar(binding), offset);
            },
            NodeKind::Unary { operand, .. } => {
                self.steps.extend([Step::Exit(id), Step::Enter(*operand)]);
            },
            NodeKind::Binary { left, right, .. } => {
                self.steps.extend([Step::Exit(id), Step::Enter(*right), Step::Enter(*left)]);
            },
            NodeKind::Call { args, .. } => {
                self.steps.push(Step::Exit(id));
                self.steps.extend(args.iter().rev().map(|arg| Step::Enter(*arg)));
            },
            NodeKind::MethodCall { receiver, name, args } => {
                let target = match ast.node(*receiver).kind {
                    NodeKind::Identifier(_) | NodeKind::FieldRef { .. } => {
                        self.resolve_reference(*receiver)?
                    },
                    _ => {
                        return Err(CodegenError::InvalidMethodReceiver { name: name.clone(),
                                                                         offset });
                    },
                };
                self.targets.push(target);
                self.steps.push(Step::Exit(id));
                self.steps.extend(args.iter().rev().map(|arg| Step::Enter(*arg)));
            },
            NodeKind::Assign { value, .. } => {
                self.steps.extend([Step::Exit(id), Step::Enter(*value)]);
            },
        }
        Ok(())
    }

    /// Emits the instruction of a node whose children are already emitted.
    fn exit(&mut self, id: NodeId) -> CodegenResult<()> {
        let ast = self.ast;
        let node = ast.node(id);
        let offset = node.offset;

        match &node.kind {
            NodeKind::Unary { op, .. } => {
                self.program.push(Op::Unary((*op).into()), offset);
            },
            NodeKind::Binary { op, .. } => {
                self.program.push(Op::Binary((*op).into()), offset);
            },
            NodeKind::Call { name, args } => self.emit_call(name, args.len(), None, offset)?,
            NodeKind::MethodCall { name, args, .. } => {
                // Nested method calls finish before their parent, so the
                // innermost pending receiver is this call's.
                let target = self.targets.pop();
                self.emit_call(name, args.len(), target, offset)?;
            },
            NodeKind::Assign { target, .. } => {
                let target_node = ast.node(*target);
                let binding = match target_node.kind {
                    NodeKind::Identifier(_) | NodeKind::FieldRef { .. } => {
                        self.resolve_reference(*target)?
                    },
                    _ => {
                        return Err(CodegenError::InvalidAssignmentTarget { offset:
                                                                               target_node.offset });
                    },
                };
                self.program.push(Op::Store(binding), target_node.offset);
            },
            NodeKind::Number { .. }
            | NodeKind::String(_)
            | NodeKind::Identifier(_)
            | NodeKind::FieldRef { .. } => {},
        }
        Ok(())
    }

    fn emit_call(&mut self,
                 name: &str,
                 argc: usize,
                 target: Option<Binding>,
                 offset: usize)
                 -> CodegenResult<()> {
        let function = self.host
                           .resolve_function(name)
                           .ok_or_else(|| CodegenError::UnknownFunction { name: name.to_string(),
                                                                          offset })?;
        self.program.push(Op::Call { name: name.to_string(),
                                     function,
                                     argc,
                                     target },
                          offset);
        Ok(())
    }

    /// Resolves an identifier or field reference node through the host.
    fn resolve_reference(&self, id: NodeId) -> CodegenResult<Binding> {
        let node = self.ast.node(id);
        let offset = node.offset;

        match &node.kind {
            NodeKind::Identifier(name) => {
                let var = self.host
                              .resolve_variable(name, None)
                              .ok_or_else(|| CodegenError::UnknownVariable { name: name.clone(),
                                                                             offset })?;
                Ok(Binding { name: name.clone(),
                             var })
            },
            NodeKind::FieldRef { object, field } => {
                let var = self.host.resolve_variable(object, Some(field)).ok_or_else(|| {
                              CodegenError::UnknownField { object: object.clone(),
                                                           field: field.clone(),
                                                           offset }
                          })?;
                Ok(Binding { name: format!("{object}.{field}"),
                             var })
            },
            _ => Err(CodegenError::InvalidAssignmentTarget { offset }),
        }
    }
}
