//! Named columns of measurement values

use crate::value::{Metadata, Value};
use serde::{Deserialize, Serialize};

/// Content classification of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Generic,
    Numeric,
    Textual,
    AllMissing,
}

impl ColumnKind {
    /// Classify values by content, ignoring missing entries.
    ///
    /// A column with at least one entry where every entry is missing is
    /// `AllMissing`. Mixed, boolean, timestamp and empty columns are
    /// `Generic`.
    pub fn detect(values: &[Value]) -> Self {
        if values.is_empty() {
            return ColumnKind::Generic;
        }
        let mut present = values.iter().filter(|v| !v.is_null()).peekable();
        if present.peek().is_none() {
            return ColumnKind::AllMissing;
        }
        let (mut numeric, mut textual) = (true, true);
        for v in present {
            numeric &= v.is_number();
            textual &= v.is_text();
        }
        if numeric {
            ColumnKind::Numeric
        } else if textual {
            ColumnKind::Textual
        } else {
            ColumnKind::Generic
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Generic => "generic",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Textual => "textual",
            ColumnKind::AllMissing => "all_missing",
        }
    }
}

/// One named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Recorder channel identifier, e.g. "CH0"
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
    pub values: Vec<Value>,
    pub kind: ColumnKind,
    #[serde(skip_serializing_if = "Metadata::is_empty", default)]
    pub metadata: Metadata,
}

impl Column {
    /// New column whose kind is detected from its values
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnKind::detect(&values);
        Self {
            name: name.into(),
            channel: None,
            unit: None,
            values,
            kind,
            metadata: Metadata::new(),
        }
    }

    /// New numeric column from optional numbers
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(name, values.into_iter().map(Value::from).collect())
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Numeric view: `None` for missing or non-numeric entries
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_number).collect()
    }

    /// Present numeric entries only
    pub fn present_numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_number).collect()
    }

    pub fn redetect_kind(&mut self) {
        self.kind = ColumnKind::detect(&self.values);
    }

    /// Column built from `values` that keeps this column's unit and channel
    pub fn derive(&self, name: impl Into<String>, values: Vec<Value>) -> Column {
        let mut column = Column::new(name, values);
        column.unit = self.unit.clone();
        column.channel = self.channel.clone();
        column
    }

    /// Copy of this column restricted to the given row positions.
    ///
    /// Callers validate positions; out-of-range rows become `Null`.
    pub fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            channel: self.channel.clone(),
            unit: self.unit.clone(),
            values: rows
                .iter()
                .map(|&r| self.values.get(r).cloned().unwrap_or(Value::Null))
                .collect(),
            kind: self.kind,
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_numeric_ignores_missing() {
        let values = vec![Value::from(1.0), Value::Null, Value::from(2.5)];
        assert_eq!(ColumnKind::detect(&values), ColumnKind::Numeric);
    }

    #[test]
    fn test_detect_textual() {
        let values = vec![Value::from("a"), Value::Null];
        assert_eq!(ColumnKind::detect(&values), ColumnKind::Textual);
    }

    #[test]
    fn test_detect_all_missing_and_empty() {
        assert_eq!(ColumnKind::detect(&[Value::Null, Value::Null]), ColumnKind::AllMissing);
        assert_eq!(ColumnKind::detect(&[]), ColumnKind::Generic);
    }

    #[test]
    fn test_detect_mixed_is_generic() {
        let values = vec![Value::from(1.0), Value::from("a")];
        assert_eq!(ColumnKind::detect(&values), ColumnKind::Generic);
        assert_eq!(ColumnKind::detect(&[Value::from(true)]), ColumnKind::Generic);
    }

    #[test]
    fn test_derive_keeps_unit() {
        let col = Column::numeric("load", [Some(1.0)]).with_unit("kN").with_channel("CH0");
        let derived = col.derive("load*2", vec![Value::from(2.0)]);
        assert_eq!(derived.unit.as_deref(), Some("kN"));
        assert_eq!(derived.channel.as_deref(), Some("CH0"));
        assert_eq!(derived.kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_take_rows() {
        let col = Column::numeric("x", [Some(1.0), Some(2.0), Some(3.0)]);
        let taken = col.take(&[2, 0]);
        assert_eq!(taken.numbers(), vec![Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_clone_is_deep() {
        let col = Column::numeric("x", [Some(1.0)]);
        let mut copy = col.clone();
        copy.values[0] = Value::from(9.0);
        assert_eq!(col.values[0], Value::from(1.0));
    }
}
