use std::fmt;

use logos::Logos;

use crate::{error::ParseError, interpreter::tokenizer::Tokenizer};

/// Represents a lexical token in the default lexer state.
///
/// String literals are scanned by a second state, [`StringPart`], entered
/// when the default state sees an opening quote; the finished literal comes
/// back as [`Token::String`].
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// Numeric literal with an optional unit suffix, such as `3`, `.5`,
    /// `2,54` (with a `,` locale), `1e-3` or `10 mm`.
    #[regex(r"[0-9]+", lex_number)]
    #[regex(r"\.[0-9]+", lex_number)]
    Number(NumberLiteral),
    /// Identifier tokens; variable or function names such as `width`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// Struct field reference such as `A.NetClass`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*\.[a-zA-Z_][a-zA-Z0-9_]*", lex_struct_ref)]
    StructRef(FieldRef),
    /// Quoted string literal, e.g. `'GND'`.
    #[token("'", lex_string)]
    String(String),
    /// `=`
    #[token("=")]
    Assign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `.`, used for method calls on references, e.g. `A.Parent.isPlated()`.
    #[token(".")]
    Dot,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number '{}'", n.text),
            Self::Identifier(name) => write!(f, "identifier '{name}'"),
            Self::StructRef(r) => write!(f, "reference '{}.{}'", r.object, r.field),
            Self::String(s) => write!(f, "string '{s}'"),
            Self::Assign => write!(f, "'='"),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::Star => write!(f, "'*'"),
            Self::Slash => write!(f, "'/'"),
            Self::Less => write!(f, "'<'"),
            Self::Greater => write!(f, "'>'"),
            Self::LessEqual => write!(f, "'<='"),
            Self::GreaterEqual => write!(f, "'>='"),
            Self::EqualEqual => write!(f, "'=='"),
            Self::BangEqual => write!(f, "'!='"),
            Self::AndAnd => write!(f, "'&&'"),
            Self::OrOr => write!(f, "'||'"),
            Self::Bang => write!(f, "'!'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
            Self::Dot => write!(f, "'.'"),
        }
    }
}

/// A scanned numeric literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    /// The parsed number, before any unit conversion.
    pub value: f64,
    /// The literal normalised to use `.` as decimal separator.
    pub text:  String,
    /// The unit suffix, if one of the supported units followed the number.
    pub unit:  Option<UnitSuffix>,
}

/// A unit suffix recognised after a numeric literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSuffix {
    /// Index into the host's supported unit list.
    pub index: usize,
    /// The suffix as written.
    pub name:  String,
}

/// The two halves of an `object.field` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// The object name.
    pub object: String,
    /// The field name.
    pub field:  String,
}

/// Failure kinds reported by the lexer callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LexError {
    /// No token starts with this character.
    #[default]
    UnexpectedCharacter,
    /// End of input inside a string literal.
    UnterminatedString,
}

/// State carried by the lexer while scanning one expression.
#[derive(Debug, Clone)]
pub struct LexerExtras {
    /// Unit suffixes the host understands. Indices are handed back to the host
    /// when converting.
    pub units:             Vec<String>,
    /// Locale decimal separator, accepted in addition to `.`.
    pub decimal_separator: char,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { units:             Vec::new(),
               decimal_separator: '.', }
    }
}

/// Tokens of the in-string lexer state.
///
/// Only reachable from the default state through an opening quote.
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum StringPart {
    /// A run of ordinary characters.
    #[regex(r"[^'\\]+")]
    Text,
    /// A backslash followed by the character it escapes.
    #[regex(r"\\(.|\n)")]
    Escape,
    /// The closing quote.
    #[token("'")]
    Close,
}

/// Returns `true` for characters that may continue an identifier.
const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans the rest of a numeric literal after its leading digits.
///
/// Logos matches the integer part (or a `.` followed by digits). The
/// fraction, the exponent and the unit suffix are read here with a
/// [`Tokenizer`] over the remaining input, and the lexer is bumped past
/// whatever was consumed.
///
/// The unit suffix may be separated from the number by whitespace. Among all
/// supported units matching at that point, the longest wins, and a unit only
/// matches when it is not immediately followed by another identifier
/// character. When nothing matches, the whitespace is left for the default
/// skip rule.
fn lex_number(lex: &mut logos::Lexer<Token>) -> Option<NumberLiteral> {
    let mut text = lex.slice().to_string();
    let separator = lex.extras.decimal_separator;
    let mut cursor = Tokenizer::new(lex.remainder());

    if !text.starts_with('.') {
        let c = cursor.peek_char();
        if c == '.' || c == separator {
            let mut probe = cursor.clone();
            probe.advance(1);
            if probe.peek_char().is_ascii_digit() {
                text.push('.');
                text.push_str(probe.consume_while(|c| c.is_ascii_digit()));
                cursor = probe;
            }
        }
    }

    if matches!(cursor.peek_char(), 'e' | 'E') {
        let mut probe = cursor.clone();
        probe.advance(1);
        let sign = probe.peek_char();
        if sign == '+' || sign == '-' {
            probe.advance(1);
        }
        let digits = probe.consume_while(|c| c.is_ascii_digit());
        if !digits.is_empty() {
            text.push('e');
            if sign == '-' {
                text.push('-');
            }
            text.push_str(digits);
            cursor = probe;
        }
    }

    let number_end = cursor.position();
    cursor.consume_while(char::is_whitespace);
    let unit = lex.extras
                  .units
                  .iter()
                  .enumerate()
                  .filter(|(_, unit)| {
                      !unit.is_empty() && cursor.match_ahead(unit, |c| !is_identifier_char(c))
                  })
                  .max_by_key(|(_, unit)| unit.len())
                  .map(|(index, name)| UnitSuffix { index,
                                                    name: name.clone() });
    match &unit {
        Some(suffix) => cursor.advance(suffix.name.chars().count()),
        None => cursor.seek(number_end),
    }

    let value = text.parse().ok()?;
    lex.bump(cursor.position());
    Some(NumberLiteral { value, text, unit })
}

/// Splits `object.field` into its two names.
fn lex_struct_ref(lex: &logos::Lexer<Token>) -> Option<FieldRef> {
    let (object, field) = lex.slice().split_once('.')?;
    Some(FieldRef { object: object.to_string(),
                    field:  field.to_string(), })
}

/// Runs the in-string state from just after the opening quote.
///
/// Escapes keep the escaped character, except `\n` and `\t` which become a
/// newline and a tab. Running out of input before the closing quote fails the
/// whole token, whose span starts at the opening quote.
fn lex_string(lex: &mut logos::Lexer<Token>) -> Result<String, LexError> {
    let mut inner = StringPart::lexer(lex.remainder());
    let mut text = String::new();

    while let Some(part) = inner.next() {
        match part {
            Ok(StringPart::Text) => text.push_str(inner.slice()),
            Ok(StringPart::Escape) => match inner.slice().chars().nth(1) {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(c) => text.push(c),
                None => {},
            },
            Ok(StringPart::Close) => {
                let consumed = inner.span().end;
                lex.bump(consumed);
                return Ok(text);
            },
            Err(()) => break,
        }
    }

    lex.bump(lex.remainder().len());
    Err(LexError::UnterminatedString)
}

/// Splits an expression into tokens paired with their byte offsets.
///
/// # Errors
/// - [`ParseError::UnterminatedString`] pointing at the opening quote.
/// - [`ParseError::UnexpectedCharacter`] for text no token starts with.
///
/// # Example
/// ```
/// use rulexpr::interpreter::lexer::{LexerExtras, Token, tokenize};
///
/// let tokens = tokenize("a <= 'x'", LexerExtras::default()).unwrap();
/// assert_eq!(tokens[1], (Token::LessEqual, 2));
/// assert_eq!(tokens[2], (Token::String("x".to_string()), 5));
/// ```
pub fn tokenize(source: &str, extras: LexerExtras) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut lexer = Token::lexer_with_extras(source, extras);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        let offset = lexer.span().start;
        match token {
            Ok(token) => tokens.push((token, offset)),
            Err(LexError::UnterminatedString) => {
                return Err(ParseError::UnterminatedString { offset });
            },
            Err(LexError::UnexpectedCharacter) => {
                return Err(ParseError::UnexpectedCharacter { found: lexer.slice().to_string(),
                                                             offset });
            },
        }
    }

    Ok(tokens)
}
