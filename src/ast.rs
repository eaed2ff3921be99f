use std::fmt;

/// Index of a node inside an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical negation (`!`).
    Not,
    /// Numeric negation (`-`).
    Negate,
}

impl UnaryOperator {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
        }
    }
}

/// A binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOperator {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The payload of an AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A numeric literal, possibly carrying a unit suffix.
    Number {
        /// Value as written, before unit conversion.
        value: f64,
        /// Normalised literal text handed to the unit resolver.
        text:  String,
        /// Index and spelling of the unit suffix.
        unit:  Option<(usize, String)>,
    },
    /// A string literal.
    String(String),
    /// A bare identifier.
    Identifier(String),
    /// An `object.field` reference.
    FieldRef {
        /// Object name.
        object: String,
        /// Field name.
        field:  String,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op:      UnaryOperator,
        /// The operand.
        operand: NodeId,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  NodeId,
        /// Right operand.
        right: NodeId,
    },
    /// A call of a host function, `name(args...)`.
    Call {
        /// Function name.
        name: String,
        /// Arguments in source order.
        args: Vec<NodeId>,
    },
    /// A method call on a reference, `receiver.name(args...)`.
    MethodCall {
        /// The object the method is called on.
        receiver: NodeId,
        /// Method name.
        name:     String,
        /// Arguments in source order.
        args:     Vec<NodeId>,
    },
    /// Top-level `reference = expression`.
    Assign {
        /// The identifier or field reference being assigned.
        target: NodeId,
        /// The assigned expression.
        value:  NodeId,
    },
}

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node is.
    pub kind:   NodeKind,
    /// Byte offset of the token the node was built from.
    pub offset: usize,
}

/// An arena-backed syntax tree.
///
/// Nodes are only ever appended, and a node's children are always pushed
/// before the node itself, so every child index is smaller than its
/// parent's and the tree cannot contain cycles. The root is the last node
/// added by the parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root:  Option<NodeId>,
}

impl Ast {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, kind: NodeKind, offset: usize) -> NodeId {
        self.nodes.push(Node { kind, offset });
        NodeId(self.nodes.len() - 1)
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Marks the root of the tree.
    pub const fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The root, once parsing has finished.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
