//! Toolkit: the runtime context owning registry, factory and converters

use crate::converters::ConverterRegistry;
use crate::factory::{DomainFactory, DomainParams};
use crate::package::DomainPackage;
use crate::proxy::Proxy;
use crate::registry::OperationRegistry;
use crate::stubs::{write_stubs, DomainStub, StubGenerator};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tasc_core::{Collection, TascError};
use tracing::{debug, info, warn};

/// Environment variable toggling stub generation during `init`
pub const GENERATE_STUBS_ENV: &str = "TASC_GENERATE_STUBS";
/// Environment variable naming a directory to write stubs to
pub const STUB_DIR_ENV: &str = "TASC_STUB_DIR";

/// Toolkit settings
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitConfig {
    pub generate_stubs: bool,
    pub stub_dir: Option<PathBuf>,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self { generate_stubs: true, stub_dir: None }
    }
}

impl ToolkitConfig {
    /// Read `TASC_GENERATE_STUBS` and `TASC_STUB_DIR`
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(GENERATE_STUBS_ENV).ok().as_deref(),
            std::env::var(STUB_DIR_ENV).ok().as_deref(),
        )
    }

    fn from_vars(generate: Option<&str>, dir: Option<&str>) -> Self {
        Self {
            generate_stubs: generate.map(flag_enabled).unwrap_or(true),
            stub_dir: dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from),
        }
    }

    pub fn with_stub_generation(mut self, enabled: bool) -> Self {
        self.generate_stubs = enabled;
        self
    }

    pub fn with_stub_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stub_dir = Some(dir.into());
        self
    }
}

/// Anything but `0`, `false`, `no` or `off` enables a flag
fn flag_enabled(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Runtime context shared by every proxy
pub struct Toolkit {
    registry: OperationRegistry,
    factory: DomainFactory,
    converters: ConverterRegistry,
    config: ToolkitConfig,
    stubs: OnceLock<Vec<DomainStub>>,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit {
    /// Empty toolkit: core constructor only, no packages
    pub fn new() -> Self {
        Self::with_config(ToolkitConfig::default())
    }

    pub fn with_config(config: ToolkitConfig) -> Self {
        Self {
            registry: OperationRegistry::new(),
            factory: DomainFactory::new(),
            converters: ConverterRegistry::new(),
            config,
            stubs: OnceLock::new(),
        }
    }

    pub fn builder() -> ToolkitBuilder {
        ToolkitBuilder::default()
    }

    /// Add a package: modules to the catalog, constructor and converters
    /// registered immediately
    pub fn install(&self, package: DomainPackage) {
        let (name, modules, constructor, converters) = package.into_parts();
        debug!(domain = %name, modules = modules.len(), "installing package");
        self.registry.add_package(&name, modules);
        if let Some(constructor) = constructor {
            self.factory.register_arc(&name, constructor);
        }
        for (source, target, converter) in converters {
            self.converters.register_arc(&source, &target, converter);
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn factory(&self) -> &DomainFactory {
        &self.factory
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Discover every catalogued domain
    pub fn discover(&self) -> Vec<String> {
        let domains = self.registry.discover_domains();
        info!(?domains, "domains discovered");
        domains
    }

    /// Generate stubs from the current registry state
    pub fn generate_stubs(&self) -> Result<Vec<DomainStub>, TascError> {
        StubGenerator::new(&self.registry, &self.factory).generate()
    }

    /// Generate stubs, keep them, and write them when a directory is set.
    ///
    /// Stubs are kept from the first successful call only.
    pub fn prepare_stubs(&self) -> Result<&[DomainStub], TascError> {
        if let Some(stubs) = self.stubs.get() {
            return Ok(stubs.as_slice());
        }
        let stubs = self.generate_stubs()?;
        if let Some(dir) = &self.config.stub_dir {
            let written = write_stubs(&stubs, dir)?;
            info!(dir = %dir.display(), files = written.len(), "stubs written");
        }
        Ok(self.stubs.get_or_init(|| stubs).as_slice())
    }

    /// Stubs kept by `prepare_stubs`, if any
    pub fn stubs(&self) -> Option<&[DomainStub]> {
        self.stubs.get().map(Vec::as_slice)
    }

    /// Construct a collection of `domain`
    pub fn create(&self, domain: &str, params: DomainParams) -> Result<Collection, TascError> {
        self.factory.create(domain, params)
    }

    /// Proxy over `collection` in its own domain
    pub fn proxy(self: &Arc<Self>, collection: Collection) -> Proxy {
        Proxy::new(collection, self.clone())
    }
}

/// Builder for [`Toolkit`]
#[derive(Default)]
pub struct ToolkitBuilder {
    packages: Vec<DomainPackage>,
    config: Option<ToolkitConfig>,
}

impl ToolkitBuilder {
    pub fn with_package(mut self, package: DomainPackage) -> Self {
        self.packages.push(package);
        self
    }

    /// Settings to use instead of the environment
    pub fn with_config(mut self, config: ToolkitConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Toolkit with every package installed; nothing discovered yet
    pub fn build(self) -> Toolkit {
        let toolkit = Toolkit::with_config(self.config.unwrap_or_else(ToolkitConfig::from_env));
        for package in self.packages {
            toolkit.install(package);
        }
        toolkit
    }

    /// Build, discover every domain, then generate stubs if enabled.
    ///
    /// Stub failures are logged and do not fail initialization.
    pub fn init(self) -> Arc<Toolkit> {
        let toolkit = self.build();
        toolkit.discover();
        if toolkit.config.generate_stubs {
            if let Err(e) = toolkit.prepare_stubs() {
                warn!(error = %e, "stub generation failed; continuing without interface descriptions");
            }
        }
        Arc::new(toolkit)
    }
}
