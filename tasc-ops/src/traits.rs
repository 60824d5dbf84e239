//! Operation traits

use crate::Args;
use serde::Serialize;
use tasc_core::{Collection, TascError, Value};

/// Metadata about an operation argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// What an operation hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "typ", rename_all = "snake_case")]
pub enum ReturnShape {
    /// A new collection; the chain continues on a proxy
    Collection,
    /// Several collections; the chain continues on a list proxy
    Collections,
    /// A plain value that ends the chain
    Scalar(&'static str),
}

impl ReturnShape {
    pub fn describe(&self) -> &'static str {
        match self {
            ReturnShape::Collection => "Collection",
            ReturnShape::Collections => "List<Collection>",
            ReturnShape::Scalar(typ) => typ,
        }
    }
}

/// Metadata for an operation
#[derive(Debug, Clone, Serialize)]
pub struct OperationMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgMeta],
    pub returns: ReturnShape,
    pub examples: &'static [&'static str],
    pub category: &'static str,
}

impl OperationMeta {
    /// Human-readable signature, e.g. `add(column1: Text, ...) -> Collection`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .args
            .iter()
            .map(|a| match a.default {
                Some(default) => format!("{}: {} = {}", a.name, a.typ, default),
                None => format!("{}: {}", a.name, a.typ),
            })
            .collect();
        format!("{}({}) -> {}", self.name, params.join(", "), self.returns.describe())
    }
}

/// Result of running an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Collection(Collection),
    Collections(Vec<Collection>),
    Value(Value),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Collection(_) => "Collection",
            Outcome::Collections(_) => "List<Collection>",
            Outcome::Value(v) => v.type_name(),
        }
    }

    pub fn into_collection(self) -> Result<Collection, TascError> {
        match self {
            Outcome::Collection(c) => Ok(c),
            other => Err(TascError::type_error("Collection", other.kind())),
        }
    }
}

impl From<Collection> for Outcome {
    fn from(c: Collection) -> Self {
        Outcome::Collection(c)
    }
}

impl From<Vec<Collection>> for Outcome {
    fn from(cs: Vec<Collection>) -> Self {
        Outcome::Collections(cs)
    }
}

impl From<Value> for Outcome {
    fn from(v: Value) -> Self {
        Outcome::Value(v)
    }
}

/// A named transform over a collection.
///
/// Operations never mutate their input; results are new collections.
pub trait Operation: Send + Sync {
    fn meta(&self) -> OperationMeta;
    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError>;
}

/// Operation backed by a closure
pub struct FnOperation<F> {
    meta: OperationMeta,
    f: F,
}

impl<F> FnOperation<F>
where
    F: Fn(&Collection, &Args) -> Result<Outcome, TascError> + Send + Sync,
{
    pub fn new(meta: OperationMeta, f: F) -> Self {
        Self { meta, f }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn(&Collection, &Args) -> Result<Outcome, TascError> + Send + Sync,
{
    fn meta(&self) -> OperationMeta {
        self.meta.clone()
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        (self.f)(collection, args)
    }
}
