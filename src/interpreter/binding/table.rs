use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::interpreter::{
    binding::{HostBinding, HostFunction, UnitResolver, VarRef},
    value::{Value, ValueType},
    vm::Context,
};

/// A named cell held by a [`TableHost`].
#[derive(Debug)]
pub struct TableVar {
    value:    RwLock<Value>,
    writable: bool,
}

impl TableVar {
    fn new(value: Value, writable: bool) -> Self {
        Self { value: RwLock::new(value),
               writable }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, value: Value) {
        self.value.write().unwrap_or_else(PoisonError::into_inner).set(value);
    }
}

impl VarRef for TableVar {
    fn var_type(&self) -> ValueType {
        self.value.read().unwrap_or_else(PoisonError::into_inner).value_type()
    }

    fn get(&self, _ctx: &Context<'_>) -> Value {
        self.value()
    }

    fn set(&self, _ctx: &Context<'_>, value: Value) -> Result<(), String> {
        if !self.writable {
            return Err("variable is read-only".to_string());
        }
        self.replace(value);
        Ok(())
    }
}

/// Unit suffixes with a linear conversion factor each.
///
/// A literal `n` written in a unit with factor `f` evaluates to `n * f`.
///
/// # Example
/// ```
/// use rulexpr::interpreter::binding::{UnitResolver, UnitTable};
///
/// let units = UnitTable::lengths();
/// let inch = units.supported_units().iter().position(|u| u == "in").unwrap();
/// assert_eq!(units.convert("2", inch), Some(50.8));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTable {
    names:   Vec<String>,
    factors: Vec<f64>,
}

impl UnitTable {
    /// Creates a table without units.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Length units expressed in millimetres: `mm`, `mil` and `in`.
    #[must_use]
    pub fn lengths() -> Self {
        Self::new().with_unit("mm", 1.0).with_unit("mil", 0.0254).with_unit("in", 25.4)
    }

    /// Adds a unit, or changes the factor of an existing one.
    #[must_use]
    pub fn with_unit(mut self, name: impl Into<String>, factor: f64) -> Self {
        self.insert(name, factor);
        self
    }

    /// Adds a unit, or changes the factor of an existing one.
    pub fn insert(&mut self, name: impl Into<String>, factor: f64) {
        let name = name.into();
        if let Some(index) = self.names.iter().position(|n| *n == name) {
            self.factors[index] = factor;
        } else {
            self.names.push(name);
            self.factors.push(factor);
        }
    }
}

impl UnitResolver for UnitTable {
    fn supported_units(&self) -> &[String] {
        &self.names
    }

    fn convert(&self, literal: &str, unit: usize) -> Option<f64> {
        let factor = self.factors.get(unit)?;
        literal.parse::<f64>().ok().map(|n| n * factor)
    }
}

/// A host backed by in-memory maps.
///
/// Variables and fields live in shared cells, so programs compiled against
/// the table see later writes, and assignments made by programs are visible
/// through [`TableHost::value`]. Functions are plain closures.
///
/// # Example
/// ```
/// use rulexpr::interpreter::{binding::TableHost, value::Value};
///
/// let host = TableHost::new().with_variable("width", 2.0)
///                            .with_field("A", "Clearance", 0.5)
///                            .with_function("twice", |_ctx, args, _target| {
///                                Ok(Value::Numeric(args[0].as_f64().unwrap_or(0.0) * 2.0))
///                            });
///
/// let result = rulexpr::evaluate("twice(width) + A.Clearance", &host).unwrap();
/// assert_eq!(result, Value::Numeric(4.5));
/// ```
#[derive(Default)]
pub struct TableHost {
    variables: HashMap<String, Arc<TableVar>>,
    functions: HashMap<String, Arc<dyn HostFunction>>,
    units:     UnitTable,
}

impl TableHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a writable variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define(name.into(), value.into(), true);
        self
    }

    /// Adds a variable that assignments cannot change.
    #[must_use]
    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.define(name.into(), value.into(), false);
        self
    }

    /// Adds a writable `object.field` reference.
    #[must_use]
    pub fn with_field(mut self,
                      object: impl AsRef<str>,
                      field: impl AsRef<str>,
                      value: impl Into<Value>)
                      -> Self {
        let key = field_key(object.as_ref(), field.as_ref());
        self.define(key, value.into(), true);
        self
    }

    /// Adds a function callable by name, or as a method on a reference.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
        where F: Fn(&Context<'_>, &[Value], Option<&dyn VarRef>) -> Result<Value, String>
                  + Send
                  + Sync
                  + 'static
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Replaces the unit table.
    #[must_use]
    pub fn with_units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }

    /// Sets a variable, creating it as writable if needed.
    ///
    /// Existing cells are updated in place, so already compiled programs
    /// read the new value on their next run.
    pub fn set_variable(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.variables.get(name) {
            Some(var) => var.replace(value),
            None => self.define(name.to_string(), value, true),
        }
    }

    /// Current value of a variable, or of a field when `name` is `object.field`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<Value> {
        self.variables.get(name).map(|var| var.value())
    }

    /// Mutable access to the unit table.
    pub const fn units_mut(&mut self) -> &mut UnitTable {
        &mut self.units
    }

    fn define(&mut self, name: String, value: Value, writable: bool) {
        self.variables.insert(name, Arc::new(TableVar::new(value, writable)));
    }
}

impl HostBinding for TableHost {
    fn resolve_variable(&self, name: &str, field: Option<&str>) -> Option<Arc<dyn VarRef>> {
        let var = match field {
            Some(field) => self.variables.get(&field_key(name, field)),
            None => self.variables.get(name),
        }?;
        Some(Arc::clone(var) as Arc<dyn VarRef>)
    }

    fn resolve_function(&self, name: &str) -> Option<Arc<dyn HostFunction>> {
        self.functions.get(name).cloned()
    }

    fn units(&self) -> &dyn UnitResolver {
        &self.units
    }
}

fn field_key(object: &str, field: &str) -> String {
    format!("{object}.{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_refuse_stores() {
        let host = TableHost::new().with_constant("pi", 3.0).with_variable("x", 1.0);
        let ctx = Context::new();

        let pi = host.resolve_variable("pi", None).unwrap();
        assert!(pi.set(&ctx, Value::Numeric(4.0)).is_err());

        let x = host.resolve_variable("x", None).unwrap();
        x.set(&ctx, Value::from("now a string")).unwrap();
        assert_eq!(x.var_type(), ValueType::String);
        assert_eq!(host.value("x"), Some(Value::from("now a string")));
    }

    #[test]
    fn fields_resolve_separately_from_variables() {
        let host = TableHost::new().with_field("A", "Net", "GND");
        assert!(host.resolve_variable("A", Some("Net")).is_some());
        assert!(host.resolve_variable("A", None).is_none());
        assert!(host.resolve_variable("A", Some("Other")).is_none());
    }

    #[test]
    fn set_variable_updates_existing_cells() {
        let mut host = TableHost::new().with_variable("w", 1.0);
        let handle = host.resolve_variable("w", None).unwrap();
        host.set_variable("w", 5.0);
        assert_eq!(handle.get(&Context::new()), Value::Numeric(5.0));
    }

    #[test]
    fn units_can_be_added_after_construction() {
        let mut host = TableHost::new().with_units(UnitTable::lengths());
        host.units_mut().insert("cm", 10.0);
        let units = host.units();
        assert_eq!(units.supported_units().len(), 4);
        assert_eq!(units.convert("1.5", 3), Some(15.0));
    }

    #[test]
    fn unit_table_overrides_factors() {
        let mut units = UnitTable::lengths();
        units.insert("mm", 1000.0);
        assert_eq!(units.supported_units().len(), 3);
        assert_eq!(units.convert("2.5", 0), Some(2500.0));
        assert_eq!(units.convert("2.5", 7), None);
        assert_eq!(units.convert("abc", 0), None);
    }
}
