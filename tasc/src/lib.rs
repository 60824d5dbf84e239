//! tasc - operation dispatch for engineering test records
//!
//! Bundles the core, load-displacement and coordinate domains into one
//! toolkit and gives collections an `ops()` entry point:
//!
//! ```ignore
//! use tasc::prelude::*;
//!
//! let result = collection
//!     .ops()
//!     .multiply("load", Value::from(2.0), Some("twice"))?
//!     .as_domain("load_displacement", Params::new())?
//!     .cycle_count(None, None, None)?
//!     .end();
//! ```

pub mod logging;

pub use tasc_core::{
    codes, domain_key, keys, Collection, CollectionError, Column, ColumnKind, ErrorCategory, Indices,
    Metadata, TascError, Value, CORE_DOMAIN,
};
pub use tasc_ops::{
    archived_settings, args, convert_to_core, prepare_for_timeseries, Args, Chained, DomainPackage, DomainParams, DomainStub, ListProxy, Operation,
    OperationInfo, OperationRegistry, Outcome, Params, Proxy, Toolkit, ToolkitBuilder, ToolkitConfig,
};
pub use tasc_std::CoreOps;

pub use tasc_coordinate as coordinate;
pub use tasc_load_displacement as load_displacement;

use std::sync::{Arc, LazyLock};

/// Packages of every bundled domain
pub fn standard_packages() -> Vec<DomainPackage> {
    vec![
        tasc_std::package(),
        tasc_load_displacement::package(),
        tasc_coordinate::package(),
    ]
}

/// Builder preloaded with every bundled domain
pub fn standard_builder() -> ToolkitBuilder {
    standard_packages()
        .into_iter()
        .fold(Toolkit::builder(), ToolkitBuilder::with_package)
}

/// Fresh toolkit with every bundled domain discovered.
///
/// Stub generation follows `TASC_GENERATE_STUBS` / `TASC_STUB_DIR`.
pub fn standard_toolkit() -> Arc<Toolkit> {
    standard_builder().init()
}

static TOOLKIT: LazyLock<Arc<Toolkit>> = LazyLock::new(standard_toolkit);

/// Process-wide toolkit, initialized on first use
pub fn toolkit() -> Arc<Toolkit> {
    TOOLKIT.clone()
}

/// Entry point from a collection into chained operations
pub trait CollectionExt {
    /// Proxy bound to the collection's own domain on the shared toolkit
    fn ops(&self) -> Proxy;

    /// Same, on a specific toolkit
    fn ops_with(&self, toolkit: &Arc<Toolkit>) -> Proxy;
}

impl CollectionExt for Collection {
    fn ops(&self) -> Proxy {
        self.ops_with(&TOOLKIT)
    }

    fn ops_with(&self, toolkit: &Arc<Toolkit>) -> Proxy {
        toolkit.proxy(self.clone())
    }
}

pub mod prelude {
    pub use crate::CollectionExt;
    pub use tasc_ops::prelude::*;
    pub use tasc_coordinate::CoordinateOps;
    pub use tasc_load_displacement::LoadDisplacementOps;
    pub use tasc_std::CoreOps;
}
