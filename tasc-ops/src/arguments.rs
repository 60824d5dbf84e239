//! Call arguments and their binding against operation metadata

use crate::OperationMeta;
use std::collections::BTreeMap;
use tasc_core::{TascError, Value};
use thiserror::Error;

/// Positional and named arguments of one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positional(positional: Vec<Value>) -> Self {
        Self { positional, named: BTreeMap::new() }
    }

    /// Builder: append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Builder: set a named argument
    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named_args(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Match arguments to parameter names.
    ///
    /// Positional arguments fill parameters in declaration order, named ones
    /// fill by name. Absent optional parameters stay unbound; operations
    /// apply their own defaults.
    pub fn bind(&self, meta: &OperationMeta) -> Result<BoundArgs, ArgError> {
        let op = meta.name;
        if self.positional.len() > meta.args.len() {
            return Err(ArgError::TooMany {
                op,
                max: meta.args.len(),
                got: self.positional.len(),
            });
        }

        let mut values = BTreeMap::new();
        for (param, value) in meta.args.iter().zip(&self.positional) {
            values.insert(param.name, value.clone());
        }
        for (name, value) in &self.named {
            let param = meta
                .args
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| ArgError::Unknown { op, name: name.clone() })?;
            if values.insert(param.name, value.clone()).is_some() {
                return Err(ArgError::Duplicate { op, name: name.clone() });
            }
        }
        if let Some(missing) = meta
            .args
            .iter()
            .find(|a| !a.optional && !values.contains_key(a.name))
        {
            return Err(ArgError::Missing { op, name: missing.name });
        }
        Ok(BoundArgs { op, values })
    }
}

/// Build [`Args`]: `args!["load", 2.0]`, `args!["load"; step = 0.5]`,
/// `args![; step = 0.5]`
#[macro_export]
macro_rules! args {
    () => { $crate::Args::new() };
    (; $($key:ident = $val:expr),+ $(,)?) => {{
        let args = $crate::Args::new();
        $(let args = args.named(stringify!($key), $val);)+
        args
    }};
    ($($pos:expr),+ $(,)? $(; $($key:ident = $val:expr),+ $(,)?)?) => {{
        let args = $crate::Args::new()$(.arg($pos))+;
        $($(let args = args.named(stringify!($key), $val);)+)?
        args
    }};
}

/// Argument binding and conversion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    #[error("{op}() takes at most {max} arguments, got {got}")]
    TooMany { op: &'static str, max: usize, got: usize },

    #[error("{op}() got an unexpected argument '{name}'")]
    Unknown { op: &'static str, name: String },

    #[error("{op}() got multiple values for argument '{name}'")]
    Duplicate { op: &'static str, name: String },

    #[error("{op}() missing required argument '{name}'")]
    Missing { op: &'static str, name: &'static str },

    #[error("{op}() argument '{name}': expected {expected}, got {got}")]
    Type { op: &'static str, name: String, expected: &'static str, got: &'static str },
}

impl From<ArgError> for TascError {
    fn from(err: ArgError) -> Self {
        let message = err.to_string();
        match err {
            ArgError::TooMany { op, max, got } => TascError::arg_count(op, max, got),
            ArgError::Unknown { op, name } => TascError::unknown_arg(op, &name),
            ArgError::Duplicate { op, .. } => {
                TascError::invalid_argument(message).in_operation(op)
            }
            ArgError::Missing { op, name } => TascError::missing_arg(op, name),
            ArgError::Type { op, name, expected, got } => {
                TascError::arg_type(op, &name, expected, got)
            }
        }
    }
}

/// Arguments matched to parameter names
#[derive(Debug, Clone)]
pub struct BoundArgs {
    op: &'static str,
    values: BTreeMap<&'static str, Value>,
}

impl BoundArgs {
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Bound, non-null value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn type_error(&self, name: &str, expected: &'static str, got: &Value) -> ArgError {
        ArgError::Type {
            op: self.op,
            name: name.to_string(),
            expected,
            got: got.type_name(),
        }
    }

    fn missing(&self, name: &str) -> ArgError {
        // Binding already rejected absent required parameters; this covers explicit nulls.
        ArgError::Type {
            op: self.op,
            name: name.to_string(),
            expected: "a value",
            got: "Null",
        }
    }

    pub fn value(&self, name: &str) -> Result<&Value, ArgError> {
        self.get(name).ok_or_else(|| self.missing(name))
    }

    pub fn opt_text(&self, name: &str) -> Result<Option<&str>, ArgError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(other) => Err(self.type_error(name, "Text", other)),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, ArgError> {
        self.opt_text(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, ArgError> {
        Ok(self.opt_text(name)?.unwrap_or(default))
    }

    pub fn opt_number(&self, name: &str) -> Result<Option<f64>, ArgError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(*n)),
            Some(other) => Err(self.type_error(name, "Number", other)),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, ArgError> {
        self.opt_number(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, ArgError> {
        Ok(self.opt_number(name)?.unwrap_or(default))
    }

    pub fn opt_integer(&self, name: &str) -> Result<Option<i64>, ArgError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_integer()
                .map(Some)
                .ok_or_else(|| self.type_error(name, "Integer", v)),
        }
    }

    /// Non-negative integer with a default
    pub fn usize_or(&self, name: &str, default: usize) -> Result<usize, ArgError> {
        match self.opt_integer(name)? {
            None => Ok(default),
            Some(n) if n >= 0 => Ok(n as usize),
            Some(_) => Err(ArgError::Type {
                op: self.op,
                name: name.to_string(),
                expected: "non-negative Integer",
                got: "negative Integer",
            }),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ArgError> {
        match self.get(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.type_error(name, "Bool", other)),
        }
    }

    /// A single name or a list of names
    pub fn opt_text_list(&self, name: &str) -> Result<Option<Vec<String>>, ArgError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::List(items)) => items
                .iter()
                .map(|v| {
                    v.as_text()
                        .map(str::to_string)
                        .ok_or_else(|| self.type_error(name, "List<Text>", v))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(self.type_error(name, "List<Text>", other)),
        }
    }

    pub fn text_list(&self, name: &str) -> Result<Vec<String>, ArgError> {
        self.opt_text_list(name)?.ok_or_else(|| self.missing(name))
    }

    /// A single integer or a list of integers
    pub fn opt_integer_list(&self, name: &str) -> Result<Option<Vec<i64>>, ArgError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::List(items)) => items
                .iter()
                .map(|v| v.as_integer().ok_or_else(|| self.type_error(name, "List<Integer>", v)))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(v) => v
                .as_integer()
                .map(|n| Some(vec![n]))
                .ok_or_else(|| self.type_error(name, "List<Integer>", v)),
        }
    }

    pub fn integer_list(&self, name: &str) -> Result<Vec<i64>, ArgError> {
        self.opt_integer_list(name)?.ok_or_else(|| self.missing(name))
    }

    /// Index labels to look up: numbers, text or timestamps, one or many
    pub fn opt_value_list(&self, name: &str) -> Option<Vec<Value>> {
        match self.get(name)? {
            Value::List(items) => Some(items.clone()),
            single => Some(vec![single.clone()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArgMeta, ReturnShape};

    static ARGS: [ArgMeta; 3] = [
        ArgMeta::required("column", "Text", "Column"),
        ArgMeta::optional("window_size", "Integer", "Window", "3"),
        ArgMeta::optional("result_column", "Text", "Output column", "None"),
    ];

    fn meta() -> OperationMeta {
        OperationMeta {
            name: "moving_average",
            description: "",
            args: &ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "test",
        }
    }

    #[test]
    fn test_positional_then_named() {
        let bound = args!["load"; result_column = "ma"].bind(&meta()).unwrap();
        assert_eq!(bound.text("column").unwrap(), "load");
        assert_eq!(bound.opt_text("result_column").unwrap(), Some("ma"));
        assert_eq!(bound.usize_or("window_size", 3).unwrap(), 3);
    }

    #[test]
    fn test_named_only_macro() {
        let bound = args![; column = "load", window_size = 5.0].bind(&meta()).unwrap();
        assert_eq!(bound.usize_or("window_size", 3).unwrap(), 5);
    }

    #[test]
    fn test_missing_required() {
        let err = Args::new().bind(&meta()).unwrap_err();
        assert_eq!(err, ArgError::Missing { op: "moving_average", name: "column" });
        let err: TascError = err.into();
        assert_eq!(err.code, tasc_core::codes::MISSING_ARG);
    }

    #[test]
    fn test_too_many_and_unknown() {
        let err = args!["a", 1.0, "b", "c"].bind(&meta()).unwrap_err();
        assert!(matches!(err, ArgError::TooMany { max: 3, got: 4, .. }));
        let err = args!["a"; windowsize = 1.0].bind(&meta()).unwrap_err();
        assert!(matches!(err, ArgError::Unknown { .. }));
    }

    #[test]
    fn test_duplicate_argument() {
        let err = args!["a"; column = "b"].bind(&meta()).unwrap_err();
        assert!(matches!(err, ArgError::Duplicate { .. }));
    }

    #[test]
    fn test_type_errors() {
        let bound = args![1.0].bind(&meta()).unwrap();
        assert!(matches!(bound.text("column"), Err(ArgError::Type { expected: "Text", .. })));
        let bound = args!["a", 2.5].bind(&meta()).unwrap();
        assert!(bound.usize_or("window_size", 3).is_err());
    }

    #[test]
    fn test_lists_accept_single_values() {
        let bound = args![Value::list(["a", "b"])].bind(&meta()).unwrap();
        assert_eq!(bound.text_list("column").unwrap(), vec!["a", "b"]);
        let bound = args!["a"].bind(&meta()).unwrap();
        assert_eq!(bound.text_list("column").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_explicit_null_is_unset() {
        let bound = args!["a", Value::Null].bind(&meta()).unwrap();
        assert!(!bound.is_set("window_size"));
    }
}
