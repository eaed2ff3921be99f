//! The seam between the compiler and the application embedding it.
//!
//! Expressions never see host objects directly. During code generation every
//! identifier, field reference, function name and unit suffix is resolved
//! through a [`HostBinding`]; what comes back is a shared handle that the
//! virtual machine calls into while running.

use std::sync::Arc;

use crate::interpreter::{
    value::{Value, ValueType},
    vm::Context,
};

/// A table-backed host for tools and tests.
pub mod table;

pub use table::{TableHost, UnitTable};

/// A readable, and possibly writable, host variable.
///
/// Handles are shared by every program compiled against them, so any interior
/// state must be synchronised.
pub trait VarRef: Send + Sync {
    /// The type of the value the variable currently holds.
    fn var_type(&self) -> ValueType;

    /// Reads the current value.
    fn get(&self, ctx: &Context<'_>) -> Value;

    /// Stores a new value.
    ///
    /// Variables are read-only unless the host overrides this.
    ///
    /// # Errors
    /// A short reason, shown to the user, when the store is refused.
    fn set(&self, ctx: &Context<'_>, value: Value) -> Result<(), String> {
        let _ = (ctx, value);
        Err("variable is read-only".to_string())
    }
}

/// A function the host makes callable from expressions.
///
/// Any closure with the matching signature is a `HostFunction`.
pub trait HostFunction: Send + Sync {
    /// Calls the function.
    ///
    /// # Parameters
    /// - `ctx`: The running context; see [`Context::data`].
    /// - `args`: Argument values in source order.
    /// - `target`: The receiver for method calls such as `A.isPlated()`.
    ///
    /// # Errors
    /// A message describing the failure. The machine reports it together
    /// with the function name and the call's offset.
    fn call(&self,
            ctx: &Context<'_>,
            args: &[Value],
            target: Option<&dyn VarRef>)
            -> Result<Value, String>;
}

impl<F> HostFunction for F
    where F: Fn(&Context<'_>, &[Value], Option<&dyn VarRef>) -> Result<Value, String> + Send + Sync
{
    fn call(&self,
            ctx: &Context<'_>,
            args: &[Value],
            target: Option<&dyn VarRef>)
            -> Result<Value, String> {
        self(ctx, args, target)
    }
}

/// Converts unit-suffixed literals such as `10mm` into plain numbers.
pub trait UnitResolver: Send + Sync {
    /// The suffixes the lexer should recognise. A literal's unit is reported
    /// as an index into this list.
    fn supported_units(&self) -> &[String];

    /// Converts `literal`, written in the unit at `unit`, to a number.
    ///
    /// `literal` uses `.` as decimal separator whatever the locale.
    /// Returns `None` when the conversion is not possible.
    fn convert(&self, literal: &str, unit: usize) -> Option<f64>;
}

/// A resolver that knows no units.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnits;

impl UnitResolver for NoUnits {
    fn supported_units(&self) -> &[String] {
        &[]
    }

    fn convert(&self, _literal: &str, _unit: usize) -> Option<f64> {
        None
    }
}

/// Name resolution supplied by the embedding application.
///
/// # Example
/// ```
/// use std::sync::Arc;
///
/// use rulexpr::interpreter::{
///     binding::{HostBinding, HostFunction, VarRef},
///     value::{Value, ValueType},
///     vm::Context,
/// };
///
/// struct Answer;
///
/// impl VarRef for Answer {
///     fn var_type(&self) -> ValueType {
///         ValueType::Numeric
///     }
///
///     fn get(&self, _ctx: &Context<'_>) -> Value {
///         Value::Numeric(42.0)
///     }
/// }
///
/// struct Host;
///
/// impl HostBinding for Host {
///     fn resolve_variable(&self, name: &str, field: Option<&str>) -> Option<Arc<dyn VarRef>> {
///         (name == "answer" && field.is_none()).then(|| Arc::new(Answer) as Arc<dyn VarRef>)
///     }
///
///     fn resolve_function(&self, _name: &str) -> Option<Arc<dyn HostFunction>> {
///         None
///     }
/// }
///
/// assert_eq!(rulexpr::evaluate("answer / 2", &Host).unwrap(), Value::Numeric(21.0));
/// ```
pub trait HostBinding {
    /// Resolves `name`, or `name.field` when `field` is given.
    fn resolve_variable(&self, name: &str, field: Option<&str>) -> Option<Arc<dyn VarRef>>;

    /// Resolves a function or method by name.
    fn resolve_function(&self, name: &str) -> Option<Arc<dyn HostFunction>>;

    /// The unit suffixes this host understands.
    fn units(&self) -> &dyn UnitResolver {
        &NoUnits
    }
}
