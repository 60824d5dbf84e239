//! tasc core operations
//!
//! The neutral domain's operation set. Every other domain binds these
//! operations too, beneath its own.

mod helpers;
mod math;
mod transform;
mod select;
mod filters;
mod search;
mod split;
mod stats;
mod combine;
mod chain;

pub use chain::CoreOps;
pub use split::split_rows;

use tasc_core::{TascError, CORE_DOMAIN};
use tasc_ops::{DomainPackage, Registrar};

fn load_math(r: &mut Registrar) -> Result<(), TascError> {
    r.register(math::Add)
        .register(math::Subtract)
        .register(math::Multiply)
        .register(math::Divide);
    Ok(())
}

fn load_transform(r: &mut Registrar) -> Result<(), TascError> {
    r.register(transform::Sin)
        .register(transform::Cos)
        .register(transform::AbsValues)
        .register(transform::RoundValues)
        .register(transform::Normalize);
    Ok(())
}

fn load_select(r: &mut Registrar) -> Result<(), TascError> {
    r.register(select::Select).register(select::SelectStep);
    Ok(())
}

fn load_filters(r: &mut Registrar) -> Result<(), TascError> {
    r.register(filters::FilterByValue).register(filters::FilterOutNone);
    Ok(())
}

fn load_search(r: &mut Registrar) -> Result<(), TascError> {
    r.register(search::SearchByRange);
    Ok(())
}

fn load_split(r: &mut Registrar) -> Result<(), TascError> {
    r.register(split::SplitByIntegers);
    Ok(())
}

fn load_stats(r: &mut Registrar) -> Result<(), TascError> {
    r.register(stats::MovingAverage).register(stats::Describe);
    Ok(())
}

fn load_combine(r: &mut Registrar) -> Result<(), TascError> {
    r.register(combine::SumColumns).register(combine::AverageColumns);
    Ok(())
}

/// The core domain package. The factory already knows how to build core
/// collections, so the package carries no constructor.
pub fn package() -> DomainPackage {
    DomainPackage::new(CORE_DOMAIN)
        .with_module("math", load_math)
        .with_module("transform", load_transform)
        .with_module("select", load_select)
        .with_module("filters", load_filters)
        .with_module("search", load_search)
        .with_module("split", load_split)
        .with_module("stats", load_stats)
        .with_module("combine", load_combine)
}
