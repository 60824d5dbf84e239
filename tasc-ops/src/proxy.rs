//! Operation Proxy: chainable dispatch over one collection

use crate::factory::Params;
use crate::list_proxy::ListProxy;
use crate::registry::{similar_names, OperationRegistry, OperationTable};
use crate::toolkit::Toolkit;
use crate::{Args, Outcome};
use std::sync::Arc;
use tasc_core::{Collection, TascError, Value, CORE_DOMAIN};
use tracing::debug;

/// Result of a dispatched call
pub enum Chained {
    Proxy(Proxy),
    List(ListProxy),
    Value(Value),
}

impl Chained {
    fn kind(&self) -> &'static str {
        match self {
            Chained::Proxy(_) => "Collection",
            Chained::List(_) => "List<Collection>",
            Chained::Value(v) => v.type_name(),
        }
    }

    pub fn into_proxy(self) -> Result<Proxy, TascError> {
        match self {
            Chained::Proxy(p) => Ok(p),
            other => Err(TascError::type_error("Collection", other.kind())),
        }
    }

    pub fn into_list(self) -> Result<ListProxy, TascError> {
        match self {
            Chained::List(l) => Ok(l),
            other => Err(TascError::type_error("List<Collection>", other.kind())),
        }
    }

    pub fn into_value(self) -> Result<Value, TascError> {
        match self {
            Chained::Value(v) => Ok(v),
            other => Err(TascError::type_error("Value", other.kind())),
        }
    }

    /// Unwrap proxies back into plain results
    pub fn into_outcome(self) -> Outcome {
        match self {
            Chained::Proxy(p) => Outcome::Collection(p.end()),
            Chained::List(l) => Outcome::Collections(l.end_all()),
            Chained::Value(v) => Outcome::Value(v),
        }
    }
}

impl std::fmt::Debug for Chained {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chained::Proxy(p) => f.debug_tuple("Proxy").field(p).finish(),
            Chained::List(l) => f.debug_tuple("List").field(l).finish(),
            Chained::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

/// Core operations overlaid with the domain's own
pub(crate) fn bind_operations(registry: &OperationRegistry, domain: &str) -> OperationTable {
    let mut table = registry.get_operations(CORE_DOMAIN);
    if domain != CORE_DOMAIN {
        table.extend(registry.get_operations(domain));
    }
    table
}

/// A collection plus the operations of its domain
pub struct Proxy {
    collection: Collection,
    domain: String,
    operations: OperationTable,
    toolkit: Arc<Toolkit>,
}

impl Proxy {
    /// Proxy in the collection's own domain
    pub fn new(collection: Collection, toolkit: Arc<Toolkit>) -> Self {
        let domain = collection.domain().to_string();
        Self::with_domain(collection, domain, toolkit)
    }

    /// Proxy bound to an explicit domain's operations
    pub fn with_domain(collection: Collection, domain: impl Into<String>, toolkit: Arc<Toolkit>) -> Self {
        let domain = domain.into();
        let operations = bind_operations(toolkit.registry(), &domain);
        debug!(domain = %domain, operations = operations.len(), "proxy bound");
        Self { collection, domain, operations, toolkit }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn toolkit(&self) -> &Arc<Toolkit> {
        &self.toolkit
    }

    /// The wrapped collection
    pub fn end(self) -> Collection {
        self.collection
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    fn unknown_operation(&self, name: &str) -> TascError {
        let err = TascError::unknown_operation(name, &self.domain);
        let similar = similar_names(name, self.operation_names());
        if similar.is_empty() {
            return err;
        }
        let shown: Vec<&str> = similar.iter().take(5).map(String::as_str).collect();
        err.with_suggestion(format!("Similar: {}", shown.join(", ")))
    }

    /// Run operation `name` and wrap its result for further chaining
    pub fn invoke(&self, name: &str, args: Args) -> Result<Chained, TascError> {
        let op = self
            .operations
            .get(name)
            .ok_or_else(|| self.unknown_operation(name))?;
        let outcome = op
            .call(&self.collection, &args)
            .map_err(|e| e.in_operation(name).in_domain(&self.domain))?;
        Ok(self.wrap(outcome))
    }

    fn wrap(&self, outcome: Outcome) -> Chained {
        match outcome {
            Outcome::Collection(c) => {
                // The result keeps this proxy's domain unless the operation retagged it
                let domain = if c.domain() != self.collection.domain() {
                    c.domain().to_string()
                } else {
                    self.domain.clone()
                };
                Chained::Proxy(Proxy::with_domain(c, domain, self.toolkit.clone()))
            }
            Outcome::Collections(cs) => {
                Chained::List(ListProxy::new(cs, self.domain.clone(), self.toolkit.clone()))
            }
            Outcome::Value(v) => Chained::Value(v),
        }
    }

    /// Run an operation that returns a collection
    pub fn call(&self, name: &str, args: Args) -> Result<Proxy, TascError> {
        self.invoke(name, args)?
            .into_proxy()
            .map_err(|e| e.in_operation(name))
    }

    /// Run an operation that returns several collections
    pub fn split(&self, name: &str, args: Args) -> Result<ListProxy, TascError> {
        self.invoke(name, args)?
            .into_list()
            .map_err(|e| e.in_operation(name))
    }

    /// Run an operation that returns a plain value
    pub fn value(&self, name: &str, args: Args) -> Result<Value, TascError> {
        self.invoke(name, args)?
            .into_value()
            .map_err(|e| e.in_operation(name))
    }

    /// Convert to `target` and bind that domain's operations.
    ///
    /// The proxy's domain is the source of the conversion, whatever the
    /// collection itself is tagged with.
    pub fn as_domain(&self, target: &str, params: Params) -> Result<Proxy, TascError> {
        let factory = self.toolkit.factory();
        if !factory.contains(target) {
            return Err(TascError::unknown_domain(target));
        }
        let mut source = self.collection.clone();
        if source.domain() != self.domain {
            source.set_domain(&self.domain);
        }
        let (prepared, params) = self
            .toolkit
            .converters()
            .prepare(source, target, params)?;
        let created = factory.from_collection(&prepared, target, params)?;
        debug!(from = %self.domain, to = target, "domain changed");
        Ok(Proxy::with_domain(created, target, self.toolkit.clone()))
    }

    /// Apply `f` to the collection and keep chaining
    pub fn pipe<F>(self, f: F) -> Result<Proxy, TascError>
    where
        F: FnOnce(Collection) -> Result<Collection, TascError>,
    {
        let Proxy { collection, domain, operations, toolkit } = self;
        let before = collection.domain().to_string();
        let collection = f(collection)?;
        if collection.domain() != before {
            let domain = collection.domain().to_string();
            return Ok(Proxy::with_domain(collection, domain, toolkit));
        }
        Ok(Proxy { collection, domain, operations, toolkit })
    }

    /// Log a summary of the collection at debug level
    pub fn debug(self, message: Option<&str>) -> Self {
        debug!(
            message = message.unwrap_or(""),
            domain = %self.domain,
            rows = self.collection.row_count(),
            columns = ?self.collection.column_names(),
            "proxy state"
        );
        self
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("domain", &self.domain)
            .field("collection", &self.collection.to_string())
            .field("operations", &self.operations.len())
            .finish()
    }
}
