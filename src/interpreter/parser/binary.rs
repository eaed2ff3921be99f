use crate::{
    ast::{BinaryOperator, NodeId, NodeKind},
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses logical OR expressions.
    ///
    /// Grammar: `logical_or := logical_and ("||" logical_and)*`
    ///
    /// Both operands are always compiled; evaluation does not short-circuit.
    pub(in crate::interpreter::parser) fn parse_logical_or(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_logical_and, &[BinaryOperator::Or])
    }

    /// Parses logical AND expressions.
    ///
    /// Grammar: `logical_and := equality ("&&" equality)*`
    fn parse_logical_and(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_equality, &[BinaryOperator::And])
    }

    /// Parses equality comparisons.
    ///
    /// Grammar: `equality := relational (("==" | "!=") relational)*`
    fn parse_equality(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_relational,
                                    &[BinaryOperator::Equal, BinaryOperator::NotEqual])
    }

    /// Parses ordering comparisons.
    ///
    /// Grammar: `relational := additive (("<" | ">" | "<=" | ">=") additive)*`
    fn parse_relational(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_additive,
                                    &[BinaryOperator::Less,
                                      BinaryOperator::Greater,
                                      BinaryOperator::LessEqual,
                                      BinaryOperator::GreaterEqual])
    }

    /// Parses addition and subtraction expressions.
    ///
    /// Grammar: `additive := multiplicative (("+" | "-") multiplicative)*`
    fn parse_additive(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_multiplicative,
                                    &[BinaryOperator::Add, BinaryOperator::Sub])
    }

    /// Parses multiplication and division expressions.
    ///
    /// Grammar: `multiplicative := unary (("*" | "/") unary)*`
    fn parse_multiplicative(&mut self) -> ParseResult<NodeId> {
        self.parse_left_associative(Self::parse_unary,
                                    &[BinaryOperator::Mul, BinaryOperator::Div])
    }

    /// Parses one left-associative precedence level.
    ///
    /// # Parameters
    /// - `operand`: Parser for the next-higher precedence level.
    /// - `ops`: Operators belonging to this level.
    ///
    /// # Returns
    /// A chain of binary nodes folded to the left, so `8 - 2 - 1` becomes
    /// `(8 - 2) - 1`. Each binary node carries its operator's offset.
    fn parse_left_associative(&mut self,
                              operand: fn(&mut Self) -> ParseResult<NodeId>,
                              ops: &[BinaryOperator])
                              -> ParseResult<NodeId> {
        let mut left = operand(self)?;
        while let Some((token, offset)) = self.tokens.peek()
              && let Some(op) = token_to_binary_operator(token)
              && ops.contains(&op)
        {
            let offset = *offset;
            self.tokens.next();
            let right = operand(self)?;
            left = self.ast.push(NodeKind::Binary { op, left, right }, offset);
        }
        Ok(left)
    }
}

/// Maps a token to the binary operator it spells, if any.
///
/// # Example
/// ```
/// use rulexpr::{
///     ast::BinaryOperator,
///     interpreter::{lexer::Token, parser::binary::token_to_binary_operator},
/// };
///
/// assert_eq!(token_to_binary_operator(&Token::AndAnd), Some(BinaryOperator::And));
/// assert_eq!(token_to_binary_operator(&Token::Bang), None);
/// ```
#[must_use]
pub const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Less => Some(BinaryOperator::Less),
        Token::Greater => Some(BinaryOperator::Greater),
        Token::LessEqual => Some(BinaryOperator::LessEqual),
        Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::BangEqual => Some(BinaryOperator::NotEqual),
        Token::AndAnd => Some(BinaryOperator::And),
        Token::OrOr => Some(BinaryOperator::Or),
        _ => None,
    }
}
