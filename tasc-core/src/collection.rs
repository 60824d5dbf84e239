//! Tabular container: row index, ordered named columns, metadata
//!
//! Every column has exactly as many values as the index has labels. The
//! constructors and mutators check this before changing anything, so a
//! failed call leaves the collection untouched. Deserialization goes
//! through the same checks.
//!
//! Lookups (`column`, `has_column`, `remove_column`, `column_metadata_mut`)
//! accept a column name or, failing that, a channel name. Inserts match
//! names only.

use crate::column::Column;
use crate::error::TascError;
use crate::indices::Indices;
use crate::value::{Metadata, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use thiserror::Error;

/// Name of the neutral domain
pub const CORE_DOMAIN: &str = "core";

/// Reserved metadata keys
pub mod keys {
    /// Domain tag of the collection (text)
    pub const DOMAIN: &str = "domain";
    /// Archive of settings from domains the collection has left
    pub const DOMAIN_METADATA: &str = "domain_metadata";
    pub const CURVES: &str = "curves";
    pub const ANALYSIS: &str = "analysis";
    pub const WARNINGS: &str = "warnings";
}

/// Metadata key holding a domain's settings, e.g. `load_displacement_domain`
pub fn domain_key(domain: &str) -> String {
    format!("{}_domain", domain)
}

/// Container shape errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollectionError {
    #[error("column '{column}' has {len} values but the index has {rows}")]
    LengthMismatch { column: String, len: usize, rows: usize },

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("row {index} out of range for {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("requested {requested} rows but only {rows} exist")]
    TooManyRows { requested: usize, rows: usize },
}

impl From<CollectionError> for TascError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::LengthMismatch { column, len, rows } => {
                TascError::length_mismatch(&format!("column '{}'", column), rows, len)
            }
            CollectionError::DuplicateColumn(name) => TascError::duplicate_column(&name),
            CollectionError::UnknownColumn(name) => TascError::unknown_column(&name),
            CollectionError::RowOutOfRange { index, rows } => {
                TascError::index_out_of_range(index, rows)
            }
            CollectionError::TooManyRows { requested, rows } => {
                TascError::index_out_of_range(requested, rows)
                    .with_note(format!("requested {} of {} rows", requested, rows))
            }
        }
    }
}

/// One row: its index label and the value of every column
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: Value,
    pub values: BTreeMap<String, Value>,
}

/// The tabular container every operation works on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCollection")]
pub struct Collection {
    index: Indices,
    columns: Vec<Column>,
    #[serde(default)]
    metadata: Metadata,
}

/// Unchecked wire form of [`Collection`]
#[derive(Deserialize)]
struct RawCollection {
    index: Indices,
    columns: Vec<Column>,
    #[serde(default)]
    metadata: Metadata,
}

impl TryFrom<RawCollection> for Collection {
    type Error = CollectionError;

    fn try_from(raw: RawCollection) -> Result<Self, Self::Error> {
        Collection::new(raw.index, raw.columns, raw.metadata)
    }
}

impl Collection {
    /// Build a collection, checking every column against the index length
    pub fn new(
        index: impl Into<Indices>,
        columns: Vec<Column>,
        metadata: Metadata,
    ) -> Result<Self, CollectionError> {
        let index = index.into();
        let rows = index.len();
        for (i, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(CollectionError::LengthMismatch {
                    column: column.name.clone(),
                    len: column.len(),
                    rows,
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(CollectionError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { index, columns, metadata })
    }

    /// Collection over step numbers `1..=n` from named value vectors
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<Value>)>,
    ) -> Result<Self, CollectionError> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect();
        let rows = columns.first().map(Column::len).unwrap_or(0);
        Self::new(Indices::sequential(rows), columns, Metadata::new())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &Indices {
        &self.index
    }

    /// Same columns over another index of the same length
    pub fn reindex(self, index: impl Into<Indices>) -> Result<Self, CollectionError> {
        Self::new(index, self.columns, self.metadata)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn name_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.name_position(name).or_else(|| {
            self.columns
                .iter()
                .position(|c| c.channel.as_deref() == Some(name))
        })
    }

    /// Column by name, falling back to a column recorded on channel `name`
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn column(&self, name: &str) -> Result<&Column, CollectionError> {
        self.get_column(name)
            .ok_or_else(|| CollectionError::UnknownColumn(name.to_string()))
    }

    /// Per-column metadata, which does not affect the shape invariant
    pub fn column_metadata_mut(&mut self, name: &str) -> Result<&mut Metadata, CollectionError> {
        match self.position(name) {
            Some(i) => Ok(&mut self.columns[i].metadata),
            None => Err(CollectionError::UnknownColumn(name.to_string())),
        }
    }

    /// Append a new column. Fails on duplicate names and wrong lengths.
    pub fn add_column(&mut self, column: Column) -> Result<&mut Self, CollectionError> {
        self.check_length(&column)?;
        if self.name_position(&column.name).is_some() {
            return Err(CollectionError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(self)
    }

    /// Insert a column, replacing one with the same name in place
    pub fn set_column(&mut self, column: Column) -> Result<&mut Self, CollectionError> {
        self.check_length(&column)?;
        match self.name_position(&column.name) {
            Some(i) => self.columns[i] = column,
            None => self.columns.push(column),
        }
        Ok(self)
    }

    pub fn remove_column(&mut self, name: &str) -> Result<Column, CollectionError> {
        match self.position(name) {
            Some(i) => Ok(self.columns.remove(i)),
            None => Err(CollectionError::UnknownColumn(name.to_string())),
        }
    }

    fn check_length(&self, column: &Column) -> Result<(), CollectionError> {
        if column.len() != self.row_count() {
            return Err(CollectionError::LengthMismatch {
                column: column.name.clone(),
                len: column.len(),
                rows: self.row_count(),
            });
        }
        Ok(())
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Builder: set one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Domain tag, `"core"` when unset
    pub fn domain(&self) -> &str {
        self.metadata
            .get(keys::DOMAIN)
            .and_then(Value::as_text)
            .unwrap_or(CORE_DOMAIN)
    }

    pub fn set_domain(&mut self, domain: &str) {
        self.metadata
            .insert(keys::DOMAIN.to_string(), Value::from(domain));
    }

    /// Settings object stored under `<domain>_domain`
    pub fn domain_settings(&self, domain: &str) -> Option<&BTreeMap<String, Value>> {
        self.metadata
            .get(&domain_key(domain))
            .and_then(Value::as_object)
    }

    // ========== Row Access ==========

    pub fn row(&self, index: usize) -> Result<Row, CollectionError> {
        let label = self.index.get(index).ok_or(CollectionError::RowOutOfRange {
            index,
            rows: self.row_count(),
        })?;
        let values = self
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.values[index].clone()))
            .collect();
        Ok(Row { index: label.clone(), values })
    }

    /// New collection over the given row positions, in the given order
    pub fn take_rows(&self, rows: &[usize]) -> Result<Collection, CollectionError> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.row_count()) {
            return Err(CollectionError::RowOutOfRange {
                index: bad,
                rows: self.row_count(),
            });
        }
        Ok(Collection {
            index: self.index.take(rows),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            metadata: self.metadata.clone(),
        })
    }

    pub fn slice(&self, range: Range<usize>) -> Result<Collection, CollectionError> {
        if range.end > self.row_count() {
            return Err(CollectionError::TooManyRows {
                requested: range.end,
                rows: self.row_count(),
            });
        }
        let rows: Vec<usize> = range.collect();
        self.take_rows(&rows)
    }

    pub fn head(&self, n: usize) -> Result<Collection, CollectionError> {
        self.slice(0..n)
    }

    pub fn tail(&self, n: usize) -> Result<Collection, CollectionError> {
        let rows = self.row_count();
        if n > rows {
            return Err(CollectionError::TooManyRows { requested: n, rows });
        }
        self.slice(rows - n..rows)
    }

    // ========== Summaries ==========

    /// count/mean/min/max of every numeric column
    pub fn describe(&self) -> Value {
        let mut summary = BTreeMap::new();
        for column in &self.columns {
            let present = column.present_numbers();
            if present.is_empty() {
                continue;
            }
            let count = present.len();
            let mean = present.iter().sum::<f64>() / count as f64;
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            summary.insert(
                column.name.clone(),
                Value::object([
                    ("count", Value::from(count)),
                    ("mean", Value::from(mean)),
                    ("min", Value::from(min)),
                    ("max", Value::from(max)),
                ]),
            );
        }
        Value::Object(summary)
    }

    pub fn auto_detect_column_kinds(&mut self) -> &mut Self {
        for column in &mut self.columns {
            column.redetect_kind();
        }
        self
    }

    pub fn into_parts(self) -> (Indices, Vec<Column>, Metadata) {
        (self.index, self.columns, self.metadata)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Collection[{}] {} rows x {} columns ({})",
            self.domain(),
            self.row_count(),
            self.columns.len(),
            self.column_names().join(", ")
        )
    }
}
