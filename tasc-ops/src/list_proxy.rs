//! List Proxy: the same chaining surface over several collections

use crate::factory::Params;
use crate::proxy::Proxy;
use crate::toolkit::Toolkit;
use crate::{Args, Outcome};
use std::ops::Range;
use std::sync::Arc;
use tasc_core::{Collection, Column, TascError, Value};
use tracing::debug;

/// Result of mapping an operation over a list
#[derive(Debug)]
pub enum Mapped {
    /// Every element produced a collection
    List(ListProxy),
    /// At least one element produced something else
    Outcomes(Vec<Outcome>),
}

impl Mapped {
    pub fn into_list(self) -> Result<ListProxy, TascError> {
        match self {
            Mapped::List(l) => Ok(l),
            Mapped::Outcomes(_) => Err(TascError::type_error("List<Collection>", "mixed results")),
        }
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        match self {
            Mapped::List(l) => l.end_all().into_iter().map(Outcome::Collection).collect(),
            Mapped::Outcomes(o) => o,
        }
    }
}

/// Ordered collections sharing one domain
pub struct ListProxy {
    collections: Vec<Collection>,
    domain: String,
    toolkit: Arc<Toolkit>,
}

impl ListProxy {
    pub fn new(collections: Vec<Collection>, domain: impl Into<String>, toolkit: Arc<Toolkit>) -> Self {
        Self { collections, domain: domain.into(), toolkit }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn end_all(self) -> Vec<Collection> {
        self.collections
    }

    /// Element `i` as a single proxy
    pub fn get(&self, i: usize) -> Result<Proxy, TascError> {
        let collection = self
            .collections
            .get(i)
            .ok_or_else(|| TascError::index_out_of_range(i, self.collections.len()))?;
        Ok(Proxy::with_domain(collection.clone(), self.domain.clone(), self.toolkit.clone()))
    }

    /// Elements in `range`, clamped to the list length
    pub fn slice(&self, range: Range<usize>) -> ListProxy {
        let end = range.end.min(self.collections.len());
        let start = range.start.min(end);
        ListProxy::new(
            self.collections[start..end].to_vec(),
            self.domain.clone(),
            self.toolkit.clone(),
        )
    }

    /// Run `name` on every element in order.
    ///
    /// An unknown name fails before any element runs.
    pub fn map(&self, name: &str, args: Args) -> Result<Mapped, TascError> {
        let operations = crate::proxy::bind_operations(self.toolkit.registry(), &self.domain);
        if !operations.contains_key(name) {
            return Err(TascError::unknown_operation(name, &self.domain));
        }

        let mut outcomes = Vec::with_capacity(self.collections.len());
        for (i, collection) in self.collections.iter().enumerate() {
            let proxy = Proxy::with_domain(collection.clone(), self.domain.clone(), self.toolkit.clone());
            let chained = proxy
                .invoke(name, args.clone())
                .map_err(|e| e.with_note(format!("list element {}", i)))?;
            outcomes.push(chained.into_outcome());
        }

        if outcomes.iter().all(|o| matches!(o, Outcome::Collection(_))) {
            let collections = outcomes
                .into_iter()
                .filter_map(|o| match o {
                    Outcome::Collection(c) => Some(c),
                    _ => None,
                })
                .collect();
            return Ok(Mapped::List(ListProxy::new(collections, self.domain.clone(), self.toolkit.clone())));
        }
        Ok(Mapped::Outcomes(outcomes))
    }

    /// `map` for operations known to return collections
    pub fn map_list(&self, name: &str, args: Args) -> Result<ListProxy, TascError> {
        self.map(name, args)?.into_list().map_err(|e| e.in_operation(name))
    }

    /// Keep elements for which `predicate` holds, in order
    pub fn filter<F>(&self, mut predicate: F) -> ListProxy
    where
        F: FnMut(&Collection) -> bool,
    {
        let kept = self.collections.iter().filter(|c| predicate(c)).cloned().collect();
        ListProxy::new(kept, self.domain.clone(), self.toolkit.clone())
    }

    /// Concatenate every element row-wise into one proxy.
    ///
    /// Column order follows first appearance; columns missing from an
    /// element are padded with `Null` for that element's rows. Metadata is
    /// taken from the first element.
    pub fn concat(&self) -> Result<Proxy, TascError> {
        let (first, rest) = self
            .collections
            .split_first()
            .ok_or_else(|| TascError::empty_input("concat needs at least one collection"))?;

        let mut index = first.index().clone();
        let mut columns: Vec<Column> = first.columns().to_vec();
        let mut rows = first.row_count();

        for collection in rest {
            let added = collection.row_count();
            for column in collection.columns() {
                match columns.iter().position(|c| c.name == column.name) {
                    Some(i) => columns[i].values.extend(column.values.iter().cloned()),
                    None => {
                        let mut padded = column.clone();
                        padded.values = vec![Value::Null; rows];
                        padded.values.extend(column.values.iter().cloned());
                        columns.push(padded);
                    }
                }
            }
            for existing in columns.iter_mut() {
                if !collection.has_column(&existing.name) {
                    existing.values.extend(std::iter::repeat(Value::Null).take(added));
                }
            }
            index.extend(collection.index());
            rows += added;
        }
        for column in &mut columns {
            column.redetect_kind();
        }

        debug!(parts = self.collections.len(), rows, "concatenated");
        let merged = Collection::new(index, columns, first.metadata().clone())?;
        Ok(Proxy::with_domain(merged, self.domain.clone(), self.toolkit.clone()))
    }

    /// Convert every element to `target`
    pub fn as_domain(&self, target: &str, params: Params) -> Result<ListProxy, TascError> {
        let converted = self
            .collections
            .iter()
            .map(|c| {
                Proxy::with_domain(c.clone(), self.domain.clone(), self.toolkit.clone())
                    .as_domain(target, params.clone())
                    .map(Proxy::end)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListProxy::new(converted, target, self.toolkit.clone()))
    }
}

impl std::fmt::Debug for ListProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListProxy")
            .field("domain", &self.domain)
            .field("len", &self.collections.len())
            .finish()
    }
}
