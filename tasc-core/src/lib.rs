//! tasc core - fundamental types
//!
//! This crate provides the core types used throughout tasc:
//! - `Value`: Runtime values (numbers, text, timestamps, objects, null)
//! - `Column`, `Indices`, `Collection`: the tabular container
//! - `TascError`: Structured errors with codes and suggestions

mod value;
mod error;
mod column;
mod indices;
mod collection;

pub use value::{Metadata, Value};
pub use error::{codes, ErrorCategory, ErrorContext, TascError};
pub use column::{Column, ColumnKind};
pub use indices::Indices;
pub use collection::{domain_key, keys, Collection, CollectionError, Row, CORE_DOMAIN};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Collection, Column, ColumnKind, Indices, Metadata, TascError, Value, CORE_DOMAIN,
    };
    pub use crate::error::codes;
    pub use crate::collection::{domain_key, keys};
}
