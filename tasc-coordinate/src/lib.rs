//! Coordinate domain
//!
//! Each column may carry a sensor position (x, y, z) in its metadata.
//! The key holding it is a domain setting, `coordinates` by default.

mod basic;
mod chain;
mod converter;
mod distance;
mod domain;

pub use chain::CoordinateOps;
pub use converter::from_core;
pub use domain::{
    construct, set_coordinates, CoordinateView, Coordinates, COORDINATES_PARAM, DEFAULT_METADATA_KEY, DOMAIN,
    METADATA_KEY_SETTING,
};

use tasc_core::{TascError, CORE_DOMAIN};
use tasc_ops::{DomainPackage, Registrar};

fn load_basic(r: &mut Registrar) -> Result<(), TascError> {
    r.register(basic::SetColumnCoordinates)
        .register(basic::GetColumnCoordinates)
        .register(basic::GetColumnsWithCoordinates)
        .register(basic::ExtractCoordinates);
    Ok(())
}

fn load_distance(r: &mut Registrar) -> Result<(), TascError> {
    r.register(distance::CalculateDistance)
        .register(distance::CalculateDistanceMatrix);
    Ok(())
}

pub fn package() -> DomainPackage {
    DomainPackage::new(DOMAIN)
        .with_module("basic", load_basic)
        .with_module("distance", load_distance)
        .with_constructor(domain::construct)
        .with_converter(CORE_DOMAIN, DOMAIN, converter::from_core)
}
