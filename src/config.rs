//! Compiler and virtual machine settings.
//!
//! Configuration only describes limits and locale details; the lexer and the
//! machine enforce them.

/// Default operand stack capacity of an execution context.
pub const DEFAULT_STACK_SIZE: usize = 128;
/// Default scratch heap capacity of an execution context.
pub const DEFAULT_HEAP_SIZE: usize = 128;
/// Default limit on nested parentheses and prefix operators.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings that affect how expression text is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Decimal separator of the user's locale.
    ///
    /// `.` is always accepted inside numeric literals; when this differs from
    /// `.` it is accepted as well.
    pub decimal_separator: char,
    /// How deeply parentheses and prefix operators may nest. Deeper input
    /// is rejected with a parse error.
    pub max_depth:         usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { decimal_separator: '.',
               max_depth:         DEFAULT_MAX_DEPTH, }
    }
}

impl CompilerConfig {
    /// Creates a configuration with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the locale decimal separator.
    #[must_use]
    pub const fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    /// Sets the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Capacity limits of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum operand stack depth.
    pub stack_size: usize,
    /// Maximum number of scratch values allocated during one run.
    pub heap_size:  usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self { stack_size: DEFAULT_STACK_SIZE,
               heap_size:  DEFAULT_HEAP_SIZE, }
    }
}

impl VmConfig {
    /// Creates a configuration with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
