/// Represents all errors that can occur during lexing or parsing.
///
/// Every variant carries the byte offset of the token or character that
/// triggered it. Running out of input reports the length of the source.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Found a token the grammar does not allow at this position.
    #[error("Error at offset {offset}: Unexpected token: {token}.")]
    UnexpectedToken {
        /// The token encountered.
        token:  String,
        /// Byte offset of the token.
        offset: usize,
    },
    /// Found a character that does not start any token.
    #[error("Error at offset {offset}: Unexpected character '{found}'.")]
    UnexpectedCharacter {
        /// The offending text.
        found:  String,
        /// Byte offset of the character.
        offset: usize,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error at offset {offset}: Unexpected end of input.")]
    UnexpectedEndOfInput {
        /// Length of the source text.
        offset: usize,
    },
    /// A string literal was not closed before the end of input.
    #[error("Error at offset {offset}: Unterminated string literal.")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },
    /// A closing parenthesis `)` was expected but not found.
    #[error("Error at offset {offset}: Expected closing parenthesis ')' but none found.")]
    ExpectedClosingParen {
        /// Byte offset of the token found instead.
        offset: usize,
    },
    /// Parentheses or prefix operators are nested deeper than the compiler
    /// allows.
    #[error("Error at offset {offset}: Expression is nested too deeply.")]
    NestingTooDeep {
        /// Byte offset of the token that went past the limit.
        offset: usize,
    },
    /// Found extra tokens after a complete expression.
    #[error("Error at offset {offset}: Extra tokens after expression: {token}.")]
    UnexpectedTrailingTokens {
        /// The first extra token.
        token:  String,
        /// Byte offset of that token.
        offset: usize,
    },
}

impl ParseError {
    /// Byte offset the error points at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnexpectedToken { offset, .. }
            | Self::UnexpectedCharacter { offset, .. }
            | Self::UnexpectedEndOfInput { offset }
            | Self::UnterminatedString { offset }
            | Self::ExpectedClosingParen { offset }
            | Self::NestingTooDeep { offset }
            | Self::UnexpectedTrailingTokens { offset, .. } => *offset,
        }
    }
}
