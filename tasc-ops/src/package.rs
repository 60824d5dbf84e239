//! Domain packages: what a domain crate contributes to a toolkit

use crate::converters::Converter;
use crate::factory::{Constructor, DomainParams, Params};
use crate::registry::ModuleLoader;
use std::sync::Arc;
use tasc_core::{Collection, TascError};

/// A domain's module loaders, constructor and converters
pub struct DomainPackage {
    name: String,
    modules: Vec<(String, ModuleLoader)>,
    constructor: Option<Constructor>,
    converters: Vec<(String, String, Converter)>,
}

impl DomainPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
            constructor: None,
            converters: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builder: add a named module; loaders run on first use of the domain
    pub fn with_module(mut self, name: impl Into<String>, loader: ModuleLoader) -> Self {
        self.modules.push((name.into(), loader));
        self
    }

    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(DomainParams) -> Result<Collection, TascError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn with_converter<F>(mut self, source: &str, target: &str, converter: F) -> Self
    where
        F: Fn(Collection, Params) -> Result<(Collection, Params), TascError> + Send + Sync + 'static,
    {
        self.converters
            .push((source.to_string(), target.to_string(), Arc::new(converter)));
        self
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (String, Vec<(String, ModuleLoader)>, Option<Constructor>, Vec<(String, String, Converter)>) {
        (self.name, self.modules, self.constructor, self.converters)
    }
}

impl std::fmt::Debug for DomainPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainPackage")
            .field("name", &self.name)
            .field("modules", &self.module_names())
            .field("constructor", &self.constructor.is_some())
            .field("converters", &self.converters.iter().map(|(s, t, _)| (s, t)).collect::<Vec<_>>())
            .finish()
    }
}
