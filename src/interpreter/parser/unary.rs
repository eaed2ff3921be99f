use crate::{
    ast::{NodeId, NodeKind, UnaryOperator},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a unary expression.
    ///
    /// Supports prefix operators:
    /// - `-`  (numeric negation)
    /// - `!`  (logical not)
    ///
    /// Unary operators are right-associative, so an input like `!-x` is parsed
    /// as `!( -x )`.
    ///
    /// Grammar:
    /// ```text
    ///     unary := ("-" | "!") unary
    ///            | postfix
    /// ```
    ///
    /// Every call enters one nesting level, so deeply nested parentheses or
    /// long runs of prefix operators fail with `NestingTooDeep` instead of
    /// exhausting the stack.
    pub(in crate::interpreter::parser) fn parse_unary(&mut self) -> ParseResult<NodeId> {
        self.descend()?;
        let result = self.parse_prefixed();
        self.depth -= 1;
        result
    }

    fn parse_prefixed(&mut self) -> ParseResult<NodeId> {
        let op = match self.tokens.peek() {
            Some((Token::Minus, offset)) => Some((UnaryOperator::Negate, *offset)),
            Some((Token::Bang, offset)) => Some((UnaryOperator::Not, *offset)),
            _ => None,
        };

        if let Some((op, offset)) = op {
            self.tokens.next();
            let operand = self.parse_unary()?;
            Ok(self.ast.push(NodeKind::Unary { op, operand }, offset))
        } else {
            let primary = self.parse_primary()?;
            self.parse_postfix(primary)
        }
    }

    /// Applies method calls to an already parsed primary.
    ///
    /// Grammar: `postfix := primary ("." IDENT "(" args ")")*`
    ///
    /// Each method call node is placed at the offset of its name.
    ///
    /// # Errors
    /// `UnexpectedToken` when `.` is not followed by a name and an argument
    /// list.
    fn parse_postfix(&mut self, mut receiver: NodeId) -> ParseResult<NodeId> {
        while let Some((Token::Dot, _)) = self.tokens.peek() {
            self.tokens.next();
            let (name, offset) = match self.tokens.next() {
                Some((Token::Identifier(name), offset)) => (name.clone(), *offset),
                Some((token, offset)) => {
                    return Err(ParseError::UnexpectedToken { token:  format!("expected method name, found {token}"),
                                                             offset: *offset, });
                },
                None => return Err(self.end_of_input()),
            };
            self.expect(&Token::LParen)?;
            let args = self.parse_arguments()?;
            receiver = self.ast.push(NodeKind::MethodCall { receiver, name, args }, offset);
        }
        Ok(receiver)
    }

    /// Parses a primary expression.
    ///
    /// Grammar:
    /// ```text
    ///     primary := NUMBER
    ///              | STRING
    ///              | IDENT
    ///              | IDENT "(" args ")"
    ///              | STRUCT_REF
    ///              | STRUCT_REF "(" args ")"
    ///              | "(" expression ")"
    /// ```
    ///
    /// `object.method(args)` lexes as a struct reference followed by `(`, so it
    /// becomes a method call on the identifier `object`.
    ///
    /// # Errors
    /// - `UnexpectedEndOfInput` when no token is left.
    /// - `ExpectedClosingParen` for an unclosed group.
    /// - `UnexpectedToken` for anything that cannot start an expression.
    fn parse_primary(&mut self) -> ParseResult<NodeId> {
        let Some((token, offset)) = self.tokens.next() else {
            return Err(self.end_of_input());
        };
        let offset = *offset;

        match token {
            Token::Number(literal) => {
                let unit = literal.unit.as_ref().map(|u| (u.index, u.name.clone()));
                Ok(self.ast.push(NodeKind::Number { value: literal.value,
                                                    text: literal.text.clone(),
                                                    unit },
                                 offset))
            },
            Token::String(text) => Ok(self.ast.push(NodeKind::String(text.clone()), offset)),
            Token::Identifier(name) => {
                if self.eat_open_paren() {
                    let args = self.parse_arguments()?;
                    Ok(self.ast.push(NodeKind::Call { name: name.clone(),
                                                      args },
                                     offset))
                } else {
                    Ok(self.ast.push(NodeKind::Identifier(name.clone()), offset))
                }
            },
            Token::StructRef(r) => {
                if self.eat_open_paren() {
                    let receiver = self.ast.push(NodeKind::Identifier(r.object.clone()), offset);
                    let args = self.parse_arguments()?;
                    let name_offset = offset + r.object.len() + 1;
                    Ok(self.ast.push(NodeKind::MethodCall { receiver,
                                                            name: r.field.clone(),
                                                            args },
                                     name_offset))
                } else {
                    Ok(self.ast.push(NodeKind::FieldRef { object: r.object.clone(),
                                                          field:  r.field.clone(), },
                                     offset))
                }
            },
            Token::LParen => {
                let inner = self.parse_expression()?;
                match self.tokens.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((token, offset)) => {
                        Err(ParseError::UnexpectedToken { token:  format!("expected ')', found {token}"),
                                                          offset: *offset, })
                    },
                    None => Err(ParseError::ExpectedClosingParen { offset: self.end }),
                }
            },
            other => Err(ParseError::UnexpectedToken { token: other.to_string(),
                                                       offset }),
        }
    }

    fn eat_open_paren(&mut self) -> bool {
        self.tokens.next_if(|(token, _)| *token == Token::LParen).is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        ast::{Ast, BinaryOperator, NodeKind, UnaryOperator},
        error::ParseError,
        interpreter::{
            lexer::{LexerExtras, tokenize},
            parser::{Parser, parse},
        },
    };

    fn parse_str(source: &str) -> Result<Ast, ParseError> {
        let tokens = tokenize(source, LexerExtras::default())?;
        parse(&tokens, source.len())
    }

    fn root_kind(ast: &Ast) -> &NodeKind {
        &ast.node(ast.root().unwrap()).kind
    }

    #[test]
    fn unary_binds_tighter_than_multiplication() {
        let ast = parse_str("-a * b").unwrap();
        let NodeKind::Binary { op: BinaryOperator::Mul, left, .. } = root_kind(&ast) else {
            panic!("expected multiplication at the root");
        };
        assert!(matches!(ast.node(*left).kind,
                         NodeKind::Unary { op: UnaryOperator::Negate, .. }));
    }

    #[test]
    fn subtraction_folds_left() {
        let ast = parse_str("8 - 2 - 1").unwrap();
        let NodeKind::Binary { left, right, .. } = root_kind(&ast) else {
            panic!("expected a binary root");
        };
        assert!(matches!(ast.node(*left).kind, NodeKind::Binary { .. }));
        assert!(matches!(ast.node(*right).kind, NodeKind::Number { .. }));
        assert_eq!(ast.node(ast.root().unwrap()).offset, 6);
    }

    #[test]
    fn struct_ref_call_is_a_method_call() {
        let ast = parse_str("A.isPlated()").unwrap();
        let NodeKind::MethodCall { receiver, name, args } = root_kind(&ast) else {
            panic!("expected a method call");
        };
        assert_eq!(name, "isPlated");
        assert!(args.is_empty());
        assert_eq!(ast.node(*receiver).kind, NodeKind::Identifier("A".into()));
    }

    #[test]
    fn chained_method_call_on_field() {
        let ast = parse_str("A.Parent.isPlated(1, 'x')").unwrap();
        let NodeKind::MethodCall { receiver, args, .. } = root_kind(&ast) else {
            panic!("expected a method call");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(ast.node(*receiver).kind,
                   NodeKind::FieldRef { object: "A".into(),
                                        field:  "Parent".into(), });
    }

    #[test]
    fn assignment_is_only_recognised_at_the_top() {
        let ast = parse_str("A.Width = 2 + 3").unwrap();
        assert!(matches!(root_kind(&ast), NodeKind::Assign { .. }));
        assert!(matches!(parse_str("1 + a = 2"),
                         Err(ParseError::UnexpectedTrailingTokens { offset: 6, .. })));
    }

    #[test]
    fn malformed_input_reports_offsets() {
        assert_eq!(parse_str(""), Err(ParseError::UnexpectedEndOfInput { offset: 0 }));
        assert_eq!(parse_str("1 +"), Err(ParseError::UnexpectedEndOfInput { offset: 3 }));
        assert_eq!(parse_str("(1 + 2"), Err(ParseError::ExpectedClosingParen { offset: 6 }));
        assert_eq!(parse_str("f(1, 2"), Err(ParseError::ExpectedClosingParen { offset: 6 }));
        assert!(matches!(parse_str("1 2"),
                         Err(ParseError::UnexpectedTrailingTokens { offset: 2, .. })));
        assert!(matches!(parse_str("* 2"), Err(ParseError::UnexpectedToken { offset: 0, .. })));
    }

    #[test]
    fn nesting_is_limited() {
        let source = "((1))";
        let tokens = tokenize(source, LexerExtras::default()).unwrap();
        assert!(Parser::new(&tokens, source.len()).with_max_depth(3).parse_statement().is_ok());
        assert_eq!(Parser::new(&tokens, source.len()).with_max_depth(2).parse_statement(),
                   Err(ParseError::NestingTooDeep { offset: 2 }));

        let source = "1 + ---2";
        let tokens = tokenize(source, LexerExtras::default()).unwrap();
        assert_eq!(Parser::new(&tokens, source.len()).with_max_depth(3).parse_statement(),
                   Err(ParseError::NestingTooDeep { offset: 7 }));
    }
}
