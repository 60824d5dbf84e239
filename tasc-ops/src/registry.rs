//! Operation Registry
//!
//! Operations are grouped by domain. A domain's operations come from two
//! places: direct `register` calls and the module loaders of the domain's
//! package, which run the first time anything asks for that domain.

use crate::{Operation, OperationMeta};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tasc_core::{TascError, CORE_DOMAIN};
use tracing::{debug, warn};

/// Operations of one domain, keyed by name
pub type OperationTable = BTreeMap<String, Arc<dyn Operation>>;

/// Registers one module's operations; an error discards the whole module
pub type ModuleLoader = fn(&mut Registrar) -> Result<(), TascError>;

/// Collects registrations from a module loader before they are applied
pub struct Registrar {
    domain: String,
    entries: Vec<(String, Arc<dyn Operation>)>,
}

impl Registrar {
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into(), entries: Vec::new() }
    }

    /// Domain of the package being loaded
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Register into the package's own domain
    pub fn register<O: Operation + 'static>(&mut self, op: O) -> &mut Self {
        let domain = self.domain.clone();
        self.register_with(op, &domain, &[])
    }

    /// Register into the package's domain and the listed other domains
    pub fn register_shared<O: Operation + 'static>(&mut self, op: O, shared_with: &[&str]) -> &mut Self {
        let domain = self.domain.clone();
        self.register_with(op, &domain, shared_with)
    }

    pub fn register_with<O: Operation + 'static>(
        &mut self,
        op: O,
        domain: &str,
        shared_with: &[&str],
    ) -> &mut Self {
        let op: Arc<dyn Operation> = Arc::new(op);
        self.entries.push((domain.to_string(), op.clone()));
        for other in shared_with {
            self.entries.push((other.to_string(), op.clone()));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn into_entries(self) -> Vec<(String, Arc<dyn Operation>)> {
        self.entries
    }
}

/// One parameter of an operation, for tooling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    pub typ: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
}

/// Descriptive record of a registered operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationInfo {
    pub name: String,
    pub domain: String,
    pub signature: String,
    pub docstring: String,
    pub parameters: Vec<ParameterInfo>,
    pub returns: String,
    pub category: String,
    pub examples: Vec<String>,
}

impl OperationInfo {
    pub fn from_meta(meta: &OperationMeta, domain: &str) -> Self {
        Self {
            name: meta.name.to_string(),
            domain: domain.to_string(),
            signature: meta.signature(),
            docstring: meta.description.to_string(),
            parameters: meta
                .args
                .iter()
                .map(|a| ParameterInfo {
                    name: a.name.to_string(),
                    typ: a.typ.to_string(),
                    description: a.description.to_string(),
                    default: a.default.map(str::to_string),
                    required: !a.optional,
                })
                .collect(),
            returns: meta.returns.describe().to_string(),
            category: meta.category.to_string(),
            examples: meta.examples.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    operations: BTreeMap<String, OperationTable>,
    initialized: BTreeSet<String>,
    catalog: BTreeMap<String, Vec<(String, ModuleLoader)>>,
}

impl RegistryState {
    fn insert(&mut self, domain: &str, op: Arc<dyn Operation>) {
        let name = op.meta().name.to_string();
        let table = self.operations.entry(domain.to_string()).or_default();
        if let Some(previous) = table.insert(name.clone(), op.clone()) {
            if !Arc::ptr_eq(&previous, &op) {
                warn!(domain, operation = %name, "operation re-registered; last registration wins");
            }
        }
    }
}

/// Central operation registry
#[derive(Default)]
pub struct OperationRegistry {
    state: RwLock<RegistryState>,
    discovery: Mutex<()>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a package's module loaders to the catalog
    pub fn add_package(&self, domain: &str, modules: Vec<(String, ModuleLoader)>) {
        let mut state = self.write();
        if state.initialized.contains(domain) {
            warn!(domain, "package added after discovery; its modules will not be loaded");
        }
        state.catalog.entry(domain.to_string()).or_default().extend(modules);
    }

    /// Register `op` under `domain` and every `shared_with` domain.
    ///
    /// Returns the shared handle so callers can compare identity.
    pub fn register<O: Operation + 'static>(
        &self,
        op: O,
        domain: &str,
        shared_with: &[&str],
    ) -> Arc<dyn Operation> {
        let op: Arc<dyn Operation> = Arc::new(op);
        self.register_arc(op.clone(), domain, shared_with);
        op
    }

    pub fn register_arc(&self, op: Arc<dyn Operation>, domain: &str, shared_with: &[&str]) {
        let mut state = self.write();
        state.insert(domain, op.clone());
        for other in shared_with {
            state.insert(other, op.clone());
        }
    }

    /// Operations of `domain`, discovering the domain first if needed
    pub fn get_operations(&self, domain: &str) -> OperationTable {
        self.ensure_discovered(domain);
        self.read().operations.get(domain).cloned().unwrap_or_default()
    }

    pub fn get_operation(&self, domain: &str, name: &str) -> Option<Arc<dyn Operation>> {
        self.ensure_discovered(domain);
        self.read().operations.get(domain)?.get(name).cloned()
    }

    /// Currently registered operations of `domain`, without discovery
    pub fn peek_operations(&self, domain: &str) -> Option<OperationTable> {
        self.read().operations.get(domain).cloned()
    }

    /// Discover every catalogued domain plus core; returns sorted names
    pub fn discover_domains(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.read().catalog.keys().cloned().collect();
        names.insert(CORE_DOMAIN.to_string());
        for name in &names {
            self.ensure_discovered(name);
        }
        names.into_iter().collect()
    }

    /// Domains with a package in the catalog
    pub fn catalog_domains(&self) -> Vec<String> {
        self.read().catalog.keys().cloned().collect()
    }

    /// Domains discovered so far
    pub fn domains(&self) -> Vec<String> {
        self.read().initialized.iter().cloned().collect()
    }

    pub fn is_initialized(&self, domain: &str) -> bool {
        self.read().initialized.contains(domain)
    }

    fn ensure_discovered(&self, domain: &str) {
        if self.is_initialized(domain) {
            return;
        }
        let _guard = self.discovery.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_initialized(domain) {
            return;
        }

        let modules = self.read().catalog.get(domain).cloned();
        let mut accepted = Vec::new();
        match modules {
            None => debug!(domain, "no package for domain; registering it empty"),
            Some(modules) => {
                for (module, loader) in modules {
                    let mut registrar = Registrar::new(domain);
                    match loader(&mut registrar) {
                        Ok(()) => {
                            debug!(domain, module = %module, count = registrar.len(), "module loaded");
                            accepted.extend(registrar.into_entries());
                        }
                        Err(e) => {
                            let err = TascError::discovery_failed(domain, &module, e.to_string());
                            warn!(domain, module = %module, error = %err, "skipping module");
                        }
                    }
                }
            }
        }

        let mut state = self.write();
        state.operations.entry(domain.to_string()).or_default();
        for (target, op) in accepted {
            state.insert(&target, op);
        }
        state.initialized.insert(domain.to_string());
    }

    /// Descriptive record of a registered operation.
    ///
    /// Only looks at what is already registered. Without `domain`, core is
    /// searched first, then the other domains in name order.
    pub fn get_operation_info(&self, name: &str, domain: Option<&str>) -> Result<OperationInfo, TascError> {
        let state = self.read();
        let found = match domain {
            Some(d) => state
                .operations
                .get(d)
                .and_then(|t| t.get(name))
                .map(|op| (d.to_string(), op.clone())),
            None => std::iter::once(CORE_DOMAIN)
                .chain(state.operations.keys().map(String::as_str).filter(|d| *d != CORE_DOMAIN))
                .find_map(|d| {
                    state.operations.get(d)?.get(name).map(|op| (d.to_string(), op.clone()))
                }),
        };
        let (domain_name, op) = found.ok_or_else(|| {
            TascError::unknown_operation(name, domain.unwrap_or("any domain"))
        })?;
        Ok(OperationInfo::from_meta(&op.meta(), &domain_name))
    }

    /// Sorted operation names per domain; all domains when `domain` is `None`
    pub fn list_available_operations(&self, domain: Option<&str>) -> BTreeMap<String, Vec<String>> {
        let domains = match domain {
            Some(d) => vec![d.to_string()],
            None => self.discover_domains(),
        };
        domains
            .into_iter()
            .map(|d| {
                let names = self.get_operations(&d).into_keys().collect();
                (d, names)
            })
            .collect()
    }

    /// Merged view of every domain (later domains win on name clashes)
    pub fn get_all_operations(&self) -> OperationTable {
        let mut all = OperationTable::new();
        for domain in self.discover_domains() {
            all.extend(self.get_operations(&domain));
        }
        all
    }
}

/// Candidate names most similar to `query`, best first
pub fn similar_names<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let query = query.to_lowercase();
    let mut matches: Vec<(&str, usize)> = candidates
        .into_iter()
        .filter_map(|c| {
            let score = similarity_score(&query, c);
            (score > 0).then_some((c, score))
        })
        .collect();
    matches.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    matches.into_iter().map(|(name, _)| name.to_string()).collect()
}

fn similarity_score(query: &str, candidate: &str) -> usize {
    let mut score = 0;

    if candidate.starts_with(query) {
        score += 100;
    } else if candidate.contains(query) {
        score += 50;
    } else if query.contains(candidate) {
        score += 30;
    }

    let query_chars: HashSet<char> = query.chars().collect();
    let candidate_chars: HashSet<char> = candidate.chars().collect();
    let common = query_chars.intersection(&candidate_chars).count();
    // Sharing a letter or two is noise
    if common * 2 < query_chars.len() && score == 0 {
        return 0;
    }
    score += common * 2;

    let len_diff = query.len().abs_diff(candidate.len());
    if len_diff < 5 && score > 0 {
        score += 5 - len_diff;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Args, ArgMeta, Outcome, ReturnShape};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tasc_core::Collection;

    struct Named(&'static str);

    static NO_ARGS: [ArgMeta; 0] = [];

    impl Operation for Named {
        fn meta(&self) -> OperationMeta {
            OperationMeta {
                name: self.0,
                description: "test operation",
                args: &NO_ARGS,
                returns: ReturnShape::Collection,
                examples: &[],
                category: "test",
            }
        }

        fn call(&self, collection: &Collection, _args: &Args) -> Result<Outcome, TascError> {
            Ok(Outcome::Collection(collection.clone()))
        }
    }

    fn load_good(r: &mut Registrar) -> Result<(), TascError> {
        r.register(Named("good_a")).register(Named("good_b"));
        Ok(())
    }

    fn load_broken(r: &mut Registrar) -> Result<(), TascError> {
        r.register(Named("half_registered"));
        Err(TascError::internal("module exploded"))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = OperationRegistry::new();
        let op = registry.register(Named("double"), "core", &[]);
        let found = registry.get_operation("core", "double").unwrap();
        assert!(Arc::ptr_eq(&op, &found));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = OperationRegistry::new();
        registry.register(Named("double"), "core", &[]);
        let second = registry.register(Named("double"), "core", &[]);
        let found = registry.get_operation("core", "double").unwrap();
        assert!(Arc::ptr_eq(&second, &found));
        assert_eq!(registry.get_operations("core").len(), 1);
    }

    #[test]
    fn test_shared_with_uses_same_handle() {
        let registry = OperationRegistry::new();
        let op = registry.register(Named("peak"), "core", &["load_displacement"]);
        let shared = registry.get_operation("load_displacement", "peak").unwrap();
        assert!(Arc::ptr_eq(&op, &shared));
    }

    #[test]
    fn test_unknown_domain_is_empty_and_initialized() {
        let registry = OperationRegistry::new();
        assert!(!registry.is_initialized("widget"));
        assert!(registry.get_operations("widget").is_empty());
        assert!(registry.is_initialized("widget"));
    }

    #[test]
    fn test_failing_module_is_skipped() {
        let registry = OperationRegistry::new();
        registry.add_package(
            "lab",
            vec![("broken".into(), load_broken as ModuleLoader), ("good".into(), load_good)],
        );
        let ops = registry.get_operations("lab");
        assert_eq!(ops.keys().collect::<Vec<_>>(), vec!["good_a", "good_b"]);
        assert!(registry.is_initialized("lab"));
    }

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn load_counted(r: &mut Registrar) -> Result<(), TascError> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        r.register(Named("counted"));
        Ok(())
    }

    #[test]
    fn test_discovery_runs_once_across_threads() {
        let registry = Arc::new(OperationRegistry::new());
        registry.add_package("counted", vec![("m".into(), load_counted as ModuleLoader)]);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = registry.clone();
                std::thread::spawn(move || r.get_operations("counted").len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
        registry.discover_domains();
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_discover_domains_includes_core() {
        let registry = OperationRegistry::new();
        registry.add_package("lab", vec![("good".into(), load_good as ModuleLoader)]);
        assert_eq!(registry.discover_domains(), vec!["core", "lab"]);
        assert_eq!(registry.domains(), vec!["core", "lab"]);
    }

    #[test]
    fn test_operation_info_does_not_discover() {
        let registry = OperationRegistry::new();
        registry.add_package("lab", vec![("good".into(), load_good as ModuleLoader)]);
        assert!(registry.get_operation_info("good_a", None).is_err());
        assert!(!registry.is_initialized("lab"));

        registry.get_operations("lab");
        let info = registry.get_operation_info("good_a", None).unwrap();
        assert_eq!(info.domain, "lab");
        assert_eq!(info.signature, "good_a() -> Collection");
        assert_eq!(info.docstring, "test operation");
    }

    #[test]
    fn test_info_prefers_core() {
        let registry = OperationRegistry::new();
        registry.register(Named("x"), "alpha", &[]);
        registry.register(Named("x"), "core", &[]);
        assert_eq!(registry.get_operation_info("x", None).unwrap().domain, "core");
        assert_eq!(registry.get_operation_info("x", Some("alpha")).unwrap().domain, "alpha");
    }

    #[test]
    fn test_list_and_merge() {
        let registry = OperationRegistry::new();
        registry.register(Named("a"), "core", &[]);
        registry.register(Named("b"), "lab", &[]);
        registry.add_package("lab", vec![("good".into(), load_good as ModuleLoader)]);
        let listed = registry.list_available_operations(None);
        assert_eq!(listed["core"], vec!["a"]);
        assert_eq!(listed["lab"], vec!["b", "good_a", "good_b"]);
        assert_eq!(registry.get_all_operations().len(), 4);
    }

    #[test]
    fn test_similar_names() {
        let names = similar_names("moving_avg", ["moving_average", "normalize", "sin"]);
        assert_eq!(names.first().map(String::as_str), Some("moving_average"));
        assert!(!names.contains(&"sin".to_string()));
    }
}
