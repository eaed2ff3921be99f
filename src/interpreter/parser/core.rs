use std::{iter::Peekable, slice};

use crate::{
    ast::{Ast, NodeId, NodeKind},
    config::DEFAULT_MAX_DEPTH,
    error::ParseError,
    interpreter::lexer::Token,
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a token stream into a syntax tree.
///
/// `source_len` is the length of the source text; it is the offset reported
/// when the input ends too early. Nesting is limited to
/// [`DEFAULT_MAX_DEPTH`]; use [`Parser::with_max_depth`] for another limit.
///
/// # Errors
/// Returns the first [`ParseError`] met. No partial tree is returned.
///
/// # Example
/// ```
/// use rulexpr::{
///     ast::{BinaryOperator, NodeKind},
///     interpreter::{
///         lexer::{LexerExtras, tokenize},
///         parser::parse,
///     },
/// };
///
/// let source = "1 + 2 * 3";
/// let tokens = tokenize(source, LexerExtras::default()).unwrap();
/// let ast = parse(&tokens, source.len()).unwrap();
///
/// let root = ast.node(ast.root().unwrap());
/// assert!(matches!(root.kind, NodeKind::Binary { op: BinaryOperator::Add, .. }));
/// ```
pub fn parse(tokens: &[(Token, usize)], source_len: usize) -> ParseResult<Ast> {
    Parser::new(tokens, source_len).parse_statement()
}

/// Recursive descent parser over a lexed expression.
///
/// The `impl` is split by precedence level across the sibling modules.
pub struct Parser<'t> {
    pub(super) tokens: Peekable<slice::Iter<'t, (Token, usize)>>,
    pub(super) ast:    Ast,
    pub(super) end:    usize,
    pub(super) depth:  usize,
    max_depth:         usize,
}

impl<'t> Parser<'t> {
    /// Creates a parser over `tokens`, which came from a source text of
    /// `source_len` bytes.
    #[must_use]
    pub fn new(tokens: &'t [(Token, usize)], source_len: usize) -> Self {
        Self { tokens:    tokens.iter().peekable(),
               ast:       Ast::new(),
               end:       source_len,
               depth:     0,
               max_depth: DEFAULT_MAX_DEPTH, }
    }

    /// Sets how deeply parentheses and prefix operators may nest.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enters one nesting level.
    ///
    /// # Errors
    /// `NestingTooDeep` at the next token once the limit is reached.
    pub(super) fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            let offset = self.tokens.peek().map_or(self.end, |(_, offset)| *offset);
            return Err(ParseError::NestingTooDeep { offset });
        }
        self.depth += 1;
        Ok(())
    }

    /// Parses a complete statement and returns the finished tree.
    ///
    /// Grammar:
    /// ```text
    ///     statement := reference "=" expression
    ///                | expression
    ///     reference := IDENTIFIER | STRUCT_REF
    /// ```
    /// The whole input must be consumed.
    ///
    /// # Errors
    /// - `UnexpectedEndOfInput` on empty input.
    /// - `UnexpectedTrailingTokens` when tokens remain after the statement.
    /// - Propagates any error from expression parsing.
    pub fn parse_statement(mut self) -> ParseResult<Ast> {
        let root = if self.at_assignment() {
            self.parse_assignment()?
        } else {
            self.parse_expression()?
        };

        if let Some((token, offset)) = self.tokens.next() {
            return Err(ParseError::UnexpectedTrailingTokens { token:  token.to_string(),
                                                              offset: *offset, });
        }

        self.ast.set_root(root);
        Ok(self.ast)
    }

    /// Parses a full expression.
    ///
    /// Starts at the lowest-precedence level, logical OR, and recursively
    /// descends through the precedence hierarchy.
    ///
    /// Grammar: `expression := logical_or`
    pub(crate) fn parse_expression(&mut self) -> ParseResult<NodeId> {
        self.parse_logical_or()
    }

    fn at_assignment(&self) -> bool {
        let mut ahead = self.tokens.clone();
        matches!(ahead.next(), Some((Token::Identifier(_) | Token::StructRef(_), _)))
        && matches!(ahead.next(), Some((Token::Assign, _)))
    }

    fn parse_assignment(&mut self) -> ParseResult<NodeId> {
        let target = match self.tokens.next() {
            Some((Token::Identifier(name), offset)) => {
                self.ast.push(NodeKind::Identifier(name.clone()), *offset)
            },
            Some((Token::StructRef(r), offset)) => {
                self.ast.push(NodeKind::FieldRef { object: r.object.clone(),
                                                   field:  r.field.clone(), },
                              *offset)
            },
            Some((token, offset)) => {
                return Err(ParseError::UnexpectedToken { token:  token.to_string(),
                                                         offset: *offset, });
            },
            None => return Err(self.end_of_input()),
        };

        let (_, assign_offset) = self.expect(&Token::Assign)?;
        let value = self.parse_expression()?;

        Ok(self.ast.push(NodeKind::Assign { target, value }, assign_offset))
    }

    /// The error for running out of tokens.
    pub(super) const fn end_of_input(&self) -> ParseError {
        ParseError::UnexpectedEndOfInput { offset: self.end }
    }
}
