//! Load-displacement domain
//!
//! Collections that know which column is load and which is displacement,
//! plus cycle counting and curve analysis on top of the core operations.

mod analysis;
mod chain;
mod converter;
mod curves;
mod cycles;
mod domain;
mod helpers;

pub use analysis::point_slopes;
pub use chain::LoadDisplacementOps;
pub use converter::from_core;
pub use curves::{cumulative_curve, curve, skeleton_curve, Curve, Decrease, CUMULATIVE_CURVE, SKELETON_CURVE};
pub use cycles::count_cycles;
pub use domain::{construct, LoadDisplacement, DISPLACEMENT_COLUMN, DOMAIN, LOAD_COLUMN};

use tasc_core::{TascError, CORE_DOMAIN};
use tasc_ops::{DomainPackage, Registrar};

fn load_cycles(r: &mut Registrar) -> Result<(), TascError> {
    r.register(cycles::CycleCount).register(cycles::SplitByCycles);
    Ok(())
}

fn load_curves(r: &mut Registrar) -> Result<(), TascError> {
    r.register(curves::CreateSkeletonCurve)
        .register(curves::CreateCumulativeCurve)
        .register(curves::GetCurve);
    Ok(())
}

fn load_analysis(r: &mut Registrar) -> Result<(), TascError> {
    r.register(analysis::CalculateSlopes)
        .register(analysis::MaxLoad)
        .register(analysis::CalculateStiffness);
    Ok(())
}

pub fn package() -> DomainPackage {
    DomainPackage::new(DOMAIN)
        .with_module("cycles", load_cycles)
        .with_module("analysis", load_analysis)
        .with_module("curves", load_curves)
        .with_constructor(domain::construct)
        .with_converter(CORE_DOMAIN, DOMAIN, converter::from_core)
}
