use tracing::debug;

use crate::{
    config::CompilerConfig,
    error::EvalError,
    interpreter::{
        binding::HostBinding,
        bytecode::Program,
        codegen::CodeGenerator,
        lexer::{LexerExtras, tokenize},
        parser::Parser,
    },
};

/// The host binding interface.
///
/// Declares the traits through which the embedding application provides
/// variables, struct fields, functions and unit conversions, and a
/// ready-made map-backed host.
pub mod binding;
/// Bytecode representation.
///
/// A program is a flat list of instructions, each tagged with the source
/// offset it came from so that runtime errors can point back into the
/// expression text.
pub mod bytecode;
/// The code generator lowers a syntax tree to bytecode.
///
/// # Responsibilities
/// - Emits instructions in post-order so operands precede their operator.
/// - Resolves identifiers, fields, functions and unit suffixes through the
///   host, reporting anything the host does not know.
pub mod codegen;
/// The lexer module tokenizes expression text.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// paired with its byte offset: numbers with optional unit suffixes, strings,
/// identifiers, field references, operators and punctuation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with source offsets.
/// - Handles locale decimal separators and host-defined unit suffixes.
/// - Reports lexical errors for invalid or unterminated input.
pub mod lexer;
/// The parser module builds the syntax tree from tokens.
///
/// # Responsibilities
/// - Converts tokens into arena-allocated AST nodes.
/// - Validates the grammar, reporting errors with byte offsets.
/// - Supports arithmetic, comparisons, logic, calls, method calls and a
///   top-level assignment.
pub mod parser;
/// A character cursor used by the lexer for the parts of a token that a
/// regular expression cannot describe.
pub mod tokenizer;
/// The value module defines the runtime data types.
pub mod value;
/// The virtual machine runs compiled programs.
///
/// # Responsibilities
/// - Executes instructions against a bounded stack and scratch heap.
/// - Calls into the host for variables and functions.
/// - Reports type errors, division by zero and host failures as runtime
///   errors, and broken capacity limits as faults.
pub mod vm;

/// Compiles expression text into [`Program`]s against one host.
///
/// The compiler keeps no state between calls; every compilation lexes,
/// parses and generates code from scratch.
///
/// # Example
/// ```
/// use rulexpr::{
///     config::CompilerConfig,
///     interpreter::{
///         Compiler,
///         binding::{TableHost, UnitTable},
///         value::Value,
///     },
/// };
///
/// let host = TableHost::new().with_units(UnitTable::lengths());
/// let compiler = Compiler::new(&host).with_config(CompilerConfig::new().with_decimal_separator(','));
///
/// let program = compiler.compile("2,5mm * 2").unwrap();
/// assert_eq!(program.run().unwrap(), Value::Numeric(5.0));
/// ```
pub struct Compiler<'h> {
    host:   &'h dyn HostBinding,
    config: CompilerConfig,
}

impl<'h> Compiler<'h> {
    /// Creates a compiler with the default configuration.
    #[must_use]
    pub fn new(host: &'h dyn HostBinding) -> Self {
        Self { host,
               config: CompilerConfig::default() }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Compiles `source` into a new program.
    ///
    /// # Errors
    /// The first parse or code generation error.
    pub fn compile(&self, source: &str) -> Result<Program, EvalError> {
        let mut program = Program::new();
        self.compile_into(source, &mut program)?;
        Ok(program)
    }

    /// Compiles `source` into `program`, replacing whatever it held.
    ///
    /// The program is left empty when compilation fails.
    ///
    /// # Errors
    /// The first parse or code generation error.
    pub fn compile_into(&self, source: &str, program: &mut Program) -> Result<(), EvalError> {
        program.clear();
        let result = self.lower(source, program);
        match &result {
            Ok(()) => debug!(instructions = program.len(), "compiled '{source}'"),
            Err(err) => {
                debug!(stage = %err.stage(), offset = err.offset(), "compile failed: {err}");
            },
        }
        result
    }

    fn lower(&self, source: &str, program: &mut Program) -> Result<(), EvalError> {
        let extras = LexerExtras { units:             self.host.units().supported_units().to_vec(),
                                   decimal_separator: self.config.decimal_separator, };
        let tokens = tokenize(source, extras)?;
        let ast = Parser::new(&tokens, source.len()).with_max_depth(self.config.max_depth)
                                                    .parse_statement()?;
        CodeGenerator::new(self.host, &ast, program).generate()?;
        Ok(())
    }
}
