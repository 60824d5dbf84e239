//! tasc operation system
//!
//! Provides the machinery for extending tasc with domain operations:
//! - `Operation` trait and metadata for individual transforms
//! - `OperationRegistry` grouping operations by domain, discovered lazily
//! - `DomainFactory` and `ConverterRegistry` for moving between domains
//! - `Proxy` / `ListProxy` for chained dispatch
//! - `StubGenerator` for typed interface descriptions

mod traits;
mod arguments;
mod registry;
mod factory;
mod converters;
mod package;
mod proxy;
mod list_proxy;
mod stubs;
mod toolkit;

pub use traits::{ArgMeta, FnOperation, Operation, OperationMeta, Outcome, ReturnShape};
pub use arguments::{ArgError, Args, BoundArgs};
pub use registry::{
    similar_names, ModuleLoader, OperationInfo, OperationRegistry, OperationTable, ParameterInfo,
    Registrar,
};
pub use factory::{core_constructor, Constructor, DomainFactory, DomainParams, Params};
pub use converters::{
    archived_settings, convert_to_core, parse_frequency, prepare_for_timeseries, Converter, ConverterRegistry,
    TIMESERIES_DOMAIN,
};
pub use package::DomainPackage;
pub use proxy::{Chained, Proxy};
pub use list_proxy::{ListProxy, Mapped};
pub use stubs::{trait_name, write_stubs, DomainStub, StubGenerator};
pub use toolkit::{Toolkit, ToolkitBuilder, ToolkitConfig, GENERATE_STUBS_ENV, STUB_DIR_ENV};

/// Re-export core types for operation authors
pub mod prelude {
    pub use crate::{
        args, ArgMeta, Args, BoundArgs, Chained, DomainPackage, DomainParams, ListProxy,
        Operation, OperationMeta, Outcome, Params, Proxy, Registrar, ReturnShape, Toolkit,
    };
    pub use tasc_core::prelude::*;
}
