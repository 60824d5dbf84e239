//! The load-displacement collection: constructor and accessor view

use std::collections::BTreeMap;
use tasc_core::{domain_key, Collection, Column, TascError, Value};
use tasc_ops::DomainParams;

pub const DOMAIN: &str = "load_displacement";
pub const LOAD_COLUMN: &str = "load_column";
pub const DISPLACEMENT_COLUMN: &str = "displacement_column";
pub const DEFAULT_LOAD: &str = "load";
pub const DEFAULT_DISPLACEMENT: &str = "displacement";

fn settings(metadata: &BTreeMap<String, Value>) -> Option<&BTreeMap<String, Value>> {
    metadata.get(&domain_key(DOMAIN))?.as_object()
}

fn setting<'a>(metadata: &'a BTreeMap<String, Value>, key: &str) -> Option<&'a str> {
    settings(metadata)?.get(key)?.as_text()
}

/// Build a load-displacement collection.
///
/// Column names come from the `load_column` / `displacement_column`
/// parameters, then from settings already in the metadata, then default to
/// `load` / `displacement`. When columns are given, both must exist.
pub fn construct(params: DomainParams) -> Result<Collection, TascError> {
    let load = match params.text(LOAD_COLUMN)? {
        Some(name) => name.to_string(),
        None => setting(&params.metadata, LOAD_COLUMN).unwrap_or(DEFAULT_LOAD).to_string(),
    };
    let displacement = match params.text(DISPLACEMENT_COLUMN)? {
        Some(name) => name.to_string(),
        None => setting(&params.metadata, DISPLACEMENT_COLUMN)
            .unwrap_or(DEFAULT_DISPLACEMENT)
            .to_string(),
    };

    if !params.columns.is_empty() {
        for (param, name) in [(LOAD_COLUMN, &load), (DISPLACEMENT_COLUMN, &displacement)] {
            if !params.columns.iter().any(|c| &c.name == name) {
                return Err(TascError::unknown_column(name)
                    .with_note(format!("{} of the {} domain", param, DOMAIN))
                    .with_suggestion(format!("pass {}=<column> to choose another column", param)));
            }
        }
    }

    let mut collection = params.into_collection()?;
    collection.metadata_mut().insert(
        domain_key(DOMAIN),
        Value::object([(LOAD_COLUMN, load), (DISPLACEMENT_COLUMN, displacement)]),
    );
    collection.set_domain(DOMAIN);
    Ok(collection)
}

/// Read-only view naming a collection's load and displacement columns
#[derive(Debug, Clone, Copy)]
pub struct LoadDisplacement<'a> {
    collection: &'a Collection,
}

impl<'a> LoadDisplacement<'a> {
    pub fn of(collection: &'a Collection) -> Self {
        Self { collection }
    }

    pub fn load_column(&self) -> &'a str {
        setting(self.collection.metadata(), LOAD_COLUMN).unwrap_or(DEFAULT_LOAD)
    }

    pub fn displacement_column(&self) -> &'a str {
        setting(self.collection.metadata(), DISPLACEMENT_COLUMN).unwrap_or(DEFAULT_DISPLACEMENT)
    }

    pub fn load(&self) -> Result<&'a Column, TascError> {
        Ok(self.collection.column(self.load_column())?)
    }

    pub fn displacement(&self) -> Result<&'a Column, TascError> {
        Ok(self.collection.column(self.displacement_column())?)
    }

    /// Rows where both load and displacement are present
    pub fn valid_pairs(&self) -> Result<Vec<(f64, f64)>, TascError> {
        let load = self.load()?.numbers();
        let displacement = self.displacement()?.numbers();
        Ok(load
            .into_iter()
            .zip(displacement)
            .filter_map(|(l, d)| Some((l?, d?)))
            .collect())
    }
}
