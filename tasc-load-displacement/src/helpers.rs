//! Column extraction shared by the cycle, curve and analysis operations

use crate::cycles::CycleCount;
use crate::domain::LoadDisplacement;
use tasc_ops::prelude::*;
use tracing::debug;

/// Numeric values of a column; text or other kinds are a type error
pub fn numbers_of(c: &Collection, name: &str, op: &str) -> Result<Vec<Option<f64>>, TascError> {
    c.column(name)?
        .values
        .iter()
        .map(|v| match v {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            other => Err(TascError::type_error("Number", other.type_name())
                .in_operation(op)
                .with_note(format!("column '{}'", name))),
        })
        .collect()
}

/// Cycle number per row.
///
/// Uses `explicit` when given, else the first column whose name contains
/// "cycle", else counts cycles on the load column. Returns the collection
/// the markers belong to (with the counted column when one was added).
pub fn cycle_markers(
    collection: &Collection,
    explicit: Option<&str>,
    op: &str,
) -> Result<(Collection, Vec<i64>), TascError> {
    let found = explicit.map(str::to_string).or_else(|| {
        collection
            .column_names()
            .into_iter()
            .find(|name| name.to_lowercase().contains("cycle"))
            .map(str::to_string)
    });

    let (source, cycle_column) = match found {
        Some(name) => (collection.clone(), name),
        None => {
            let counted = CycleCount.call(collection, &Args::new())?.into_collection()?;
            let name = format!("{}_cycle", LoadDisplacement::of(collection).load_column());
            debug!(column = %name, op, "no cycle column; counted cycles");
            (counted, name)
        }
    };

    let markers = source
        .column(&cycle_column)?
        .values
        .iter()
        .map(|v| {
            v.as_integer().ok_or_else(|| {
                TascError::type_error("Integer", v.type_name())
                    .in_operation(op)
                    .with_note(format!("column '{}'", cycle_column))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((source, markers))
}
