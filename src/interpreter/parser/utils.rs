use crate::{
    ast::NodeId,
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Consumes the next token if it equals `expected`.
    ///
    /// # Returns
    /// The consumed token and its offset.
    ///
    /// # Errors
    /// `UnexpectedToken` if a different token follows, or
    /// `UnexpectedEndOfInput` if none does.
    pub(in crate::interpreter::parser) fn expect(&mut self,
                                                 expected: &Token)
                                                 -> ParseResult<(Token, usize)> {
        match self.tokens.next() {
            Some((token, offset)) if token == expected => Ok((token.clone(), *offset)),
            Some((token, offset)) => {
                Err(ParseError::UnexpectedToken { token:  format!("expected {expected}, found {token}"),
                                                  offset: *offset, })
            },
            None => Err(self.end_of_input()),
        }
    }

    /// Parses a call argument list after its opening parenthesis.
    ///
    /// An immediately encountered `)` produces an empty list.
    ///
    /// Grammar: `args := (expression ("," expression)*)? ")"`
    ///
    /// # Errors
    /// - `ExpectedClosingParen` if the input ends before `)`.
    /// - `UnexpectedToken` if something other than `,` or `)` follows an
    ///   argument.
    pub(in crate::interpreter::parser) fn parse_arguments(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut args = Vec::new();
        if let Some((Token::RParen, _)) = self.tokens.peek() {
            self.tokens.next();
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            match self.tokens.next() {
                Some((Token::Comma, _)) => {},
                Some((Token::RParen, _)) => break,
                Some((token, offset)) => {
                    return Err(ParseError::UnexpectedToken { token:  format!("expected ',' or ')', found {token}"),
                                                             offset: *offset, });
                },
                None => return Err(ParseError::ExpectedClosingParen { offset: self.end }),
            }
        }

        Ok(args)
    }
}
