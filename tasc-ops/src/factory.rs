//! Domain Factory: builds collections tagged with a domain

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tasc_core::{Collection, Column, Indices, Metadata, TascError, Value, CORE_DOMAIN};
use tracing::debug;

/// Named domain-specific parameters, e.g. `load_column`
pub type Params = BTreeMap<String, Value>;

/// Everything a domain constructor receives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainParams {
    pub index: Indices,
    pub columns: Vec<Column>,
    pub metadata: Metadata,
    pub extra: Params,
}

impl DomainParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parts of `collection` with no extra parameters
    pub fn from_collection(collection: Collection) -> Self {
        let (index, columns, metadata) = collection.into_parts();
        Self { index, columns, metadata, extra: Params::new() }
    }

    pub fn with_extra(mut self, extra: Params) -> Self {
        self.extra.extend(extra);
        self
    }

    /// Builder: set one extra parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Non-null extra parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key).filter(|v| !v.is_null())
    }

    /// Extra parameter that must be text when present
    pub fn text(&self, key: &str) -> Result<Option<&str>, TascError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(other) => Err(TascError::type_error("Text", other.type_name())
                .with_note(format!("parameter '{}'", key))),
        }
    }

    /// Assemble the collection, checking shape
    pub fn into_collection(self) -> Result<Collection, TascError> {
        Ok(Collection::new(self.index, self.columns, self.metadata)?)
    }
}

/// Builds a collection of one domain from parameters
pub type Constructor = Arc<dyn Fn(DomainParams) -> Result<Collection, TascError> + Send + Sync>;

/// Constructor of the neutral domain
pub fn core_constructor(params: DomainParams) -> Result<Collection, TascError> {
    if !params.extra.is_empty() {
        debug!(keys = ?params.extra.keys().collect::<Vec<_>>(), "core domain ignores extra parameters");
    }
    let mut collection = params.into_collection()?;
    collection.set_domain(CORE_DOMAIN);
    Ok(collection)
}

/// Domain name → constructor
pub struct DomainFactory {
    constructors: RwLock<BTreeMap<String, Constructor>>,
}

impl Default for DomainFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainFactory {
    /// Factory with the core domain pre-registered
    pub fn new() -> Self {
        let mut constructors: BTreeMap<String, Constructor> = BTreeMap::new();
        constructors.insert(CORE_DOMAIN.to_string(), Arc::new(core_constructor));
        Self { constructors: RwLock::new(constructors) }
    }

    pub fn register<F>(&self, domain: &str, constructor: F)
    where
        F: Fn(DomainParams) -> Result<Collection, TascError> + Send + Sync + 'static,
    {
        self.register_arc(domain, Arc::new(constructor));
    }

    pub fn register_arc(&self, domain: &str, constructor: Constructor) {
        let mut constructors = self.constructors.write().unwrap_or_else(PoisonError::into_inner);
        if constructors.insert(domain.to_string(), constructor).is_some() {
            debug!(domain, "constructor replaced");
        }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(domain)
    }

    /// Construct a collection of `domain`
    pub fn create(&self, domain: &str, params: DomainParams) -> Result<Collection, TascError> {
        let constructor = self
            .constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(domain)
            .cloned()
            .ok_or_else(|| TascError::unknown_domain(domain))?;
        constructor(params).map_err(|e| e.in_domain(domain))
    }

    /// Construct `domain` from a copy of `collection` plus extra parameters
    pub fn from_collection(
        &self,
        collection: &Collection,
        domain: &str,
        extra: Params,
    ) -> Result<Collection, TascError> {
        let params = DomainParams::from_collection(collection.clone()).with_extra(extra);
        self.create(domain, params)
    }

    pub fn available_domains(&self) -> Vec<String> {
        self.constructors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
