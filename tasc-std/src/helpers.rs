//! Helper functions shared by core operations
//!
//! Common utilities for reading numeric columns and storing results.

use tasc_core::{Collection, TascError, Value};

/// Numbers of column `name`: missing entries are `None`, anything else
/// non-numeric is a type error
pub fn numeric_column(c: &Collection, name: &str, op: &str) -> Result<Vec<Option<f64>>, TascError> {
    let column = c.column(name)?;
    column
        .values
        .iter()
        .map(|v| match v {
            Value::Number(n) => Ok(Some(*n)),
            Value::Null => Ok(None),
            other => Err(TascError::type_error("Number", other.type_name())
                .in_operation(op)
                .with_note(format!("column '{}'", name))),
        })
        .collect()
}

pub fn to_values(values: impl IntoIterator<Item = Option<f64>>) -> Vec<Value> {
    values.into_iter().map(Value::from).collect()
}

/// Copy of `c` with `values` stored as column `name`, replacing any column
/// of that name. Unit and channel come from column `source`.
pub fn with_result(
    c: &Collection,
    source: &str,
    name: &str,
    values: Vec<Option<f64>>,
) -> Result<Collection, TascError> {
    let derived = c.column(source)?.derive(name, to_values(values));
    let mut out = c.clone();
    out.set_column(derived)?;
    Ok(out)
}

/// Fail with a lookup error on the first unknown column
pub fn require_columns(c: &Collection, names: &[String]) -> Result<(), TascError> {
    for name in names {
        c.column(name)?;
    }
    Ok(())
}

/// Names of every numeric column, in order
pub fn numeric_column_names(c: &Collection) -> Vec<String> {
    c.columns()
        .iter()
        .filter(|col| col.kind == tasc_core::ColumnKind::Numeric)
        .map(|col| col.name.clone())
        .collect()
}

/// Record which operation produced `out` and from which columns
pub fn record_operation(out: &mut Collection, op: &str, source_columns: Vec<String>) {
    let metadata = out.metadata_mut();
    metadata.insert("operation".to_string(), Value::from(op));
    metadata.insert("source_columns".to_string(), Value::list(source_columns));
}

/// Elementwise combination that yields `None` when any input is missing
pub fn combine_rows(columns: &[Vec<Option<f64>>], f: impl Fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    let mut buffer = Vec::with_capacity(columns.len());
    (0..rows)
        .map(|r| {
            buffer.clear();
            for column in columns {
                buffer.push(column[r]?);
            }
            Some(f(&buffer))
        })
        .collect()
}
