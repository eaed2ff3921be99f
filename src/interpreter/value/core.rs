use std::fmt;

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Text.
    String,
    /// Double precision number.
    Numeric,
    /// No value.
    Undefined,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Numeric => write!(f, "numeric"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Represents a value in the expression language.
///
/// Booleans do not have a type of their own: comparisons and logical
/// operators produce `Numeric(1.0)` or `Numeric(0.0)`.
///
/// Equality is type aware. Two values are equal only when both are numeric
/// and numerically equal, or both are strings with the same text. Every other
/// pairing, `Undefined` with itself included, is unequal.
///
/// # Example
/// ```
/// use rulexpr::interpreter::value::Value;
///
/// assert_eq!(Value::from(2.0), Value::Numeric(2.0));
/// assert_ne!(Value::from("2"), Value::Numeric(2.0));
/// assert_ne!(Value::Undefined, Value::Undefined);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value, e.g. a host variable that has nothing to report.
    #[default]
    Undefined,
    /// A numeric value.
    Numeric(f64),
    /// A string value.
    String(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Numeric(if v { 1.0 } else { 0.0 })
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl Value {
    /// Returns the type tag of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Undefined => ValueType::Undefined,
            Self::Numeric(_) => ValueType::Numeric,
            Self::String(_) => ValueType::String,
        }
    }

    /// Returns the number if the value is numeric.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a condition.
    ///
    /// Nonzero numbers and nonempty strings are true; `Undefined` is false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Numeric(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
        }
    }

    /// Replaces the value in place, type included.
    pub fn set(&mut self, value: impl Into<Self>) {
        *self = value.into();
    }
}
