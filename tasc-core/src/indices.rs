//! Row index (step numbers or timestamps)

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Ordered row labels; the length defines a collection's row count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Indices {
    values: Vec<Value>,
}

impl Indices {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Step numbers `1..=len`
    pub fn sequential(len: usize) -> Self {
        Self {
            values: (1..=len).map(Value::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Row position of the first label equal to `label`.
    ///
    /// Numeric labels match by value, so step `3` finds `3.0`.
    pub fn position(&self, label: &Value) -> Option<usize> {
        self.values.iter().position(|v| v == label)
    }

    /// Index restricted to the given row positions
    pub fn take(&self, rows: &[usize]) -> Indices {
        Indices {
            values: rows
                .iter()
                .map(|&r| self.values.get(r).cloned().unwrap_or(Value::Null))
                .collect(),
        }
    }

    pub fn extend(&mut self, other: &Indices) {
        self.values.extend(other.values.iter().cloned());
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Indices {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl From<Vec<f64>> for Indices {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values.into_iter().map(Value::from).collect())
    }
}
