//! Conversion from the core domain
//!
//! Resolves which columns hold load and displacement so the constructor
//! can validate them.

use crate::domain::{DISPLACEMENT_COLUMN, DOMAIN, LOAD_COLUMN};
use tasc_core::{Collection, TascError, Value};
use tasc_ops::{archived_settings, Params};
use tracing::debug;

const LOAD_HINTS: [&str; 4] = ["load", "force", "荷重", "力"];
const DISPLACEMENT_HINTS: [&str; 4] = ["disp", "displacement", "変位", "変形"];

/// First column whose name contains a hint, trying hints in order
fn match_hints<'a>(names: &[&'a str], hints: &[&str]) -> Option<&'a str> {
    hints.iter().find_map(|hint| {
        let hint = hint.to_lowercase();
        names.iter().copied().find(|name| name.to_lowercase().contains(&hint))
    })
}

/// Prepare a core collection for the load-displacement domain.
///
/// Each of `load_column` and `displacement_column` is taken from, in order:
/// explicit parameters, settings archived by an earlier conversion to core,
/// column names matching known hints, and finally the first unclaimed
/// numeric columns.
pub fn from_core(collection: Collection, mut params: Params) -> Result<(Collection, Params), TascError> {
    let explicit = |params: &Params, key: &str| -> Option<String> {
        params.get(key).and_then(Value::as_text).map(str::to_string)
    };
    let archived = |key: &str| -> Option<String> {
        archived_settings(&collection, DOMAIN)?
            .get(key)?
            .as_text()
            .map(str::to_string)
    };

    let names = collection.column_names();
    let mut load = explicit(&params, LOAD_COLUMN)
        .or_else(|| archived(LOAD_COLUMN))
        .or_else(|| match_hints(&names, &LOAD_HINTS).map(str::to_string));
    let mut displacement = explicit(&params, DISPLACEMENT_COLUMN)
        .or_else(|| archived(DISPLACEMENT_COLUMN))
        .or_else(|| match_hints(&names, &DISPLACEMENT_HINTS).map(str::to_string));

    if load.is_none() || displacement.is_none() {
        let (known_load, known_displacement) = (load.clone(), displacement.clone());
        let mut numeric = collection
            .columns()
            .iter()
            .filter(|c| c.values.iter().any(Value::is_number))
            .map(|c| c.name.clone())
            .filter(|name| Some(name) != known_load.as_ref() && Some(name) != known_displacement.as_ref());
        if load.is_none() {
            load = numeric.next();
        }
        if displacement.is_none() {
            displacement = numeric.next();
        }
    }

    let (Some(load), Some(displacement)) = (load, displacement) else {
        return Err(TascError::inference_failed(
            "cannot determine load_column and displacement_column; pass them explicitly",
        )
        .in_domain(DOMAIN));
    };

    debug!(load = %load, displacement = %displacement, "resolved load-displacement columns");
    params.insert(LOAD_COLUMN.to_string(), Value::from(load));
    params.insert(DISPLACEMENT_COLUMN.to_string(), Value::from(displacement));
    Ok((collection, params))
}
