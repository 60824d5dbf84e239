//! Splitting a collection into groups

use tasc_ops::prelude::*;
use std::collections::BTreeMap;

pub struct SplitByIntegers;

static SPLIT_BY_INTEGERS_ARGS: [ArgMeta; 1] = [ArgMeta::required(
    "markers",
    "List<Integer>",
    "Group marker per row; must match the row count",
)];

static SPLIT_BY_INTEGERS_EXAMPLES: [&str; 1] =
    ["split_by_integers([2, 1, 2, 3, 1, 3]) → 3 collections for markers 1, 2, 3"];

impl Operation for SplitByIntegers {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "split_by_integers",
            description: "Group rows by integer marker, one collection per marker in ascending order",
            args: &SPLIT_BY_INTEGERS_ARGS,
            returns: ReturnShape::Collections,
            examples: &SPLIT_BY_INTEGERS_EXAMPLES,
            category: "split",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let markers = args.bind(&self.meta())?.integer_list("markers")?;
        split_rows(collection, &markers).map(Outcome::Collections)
    }
}

/// One collection per distinct marker, ascending; rows keep their order
pub fn split_rows(collection: &Collection, markers: &[i64]) -> Result<Vec<Collection>, TascError> {
    if markers.len() != collection.row_count() {
        return Err(TascError::length_mismatch("markers", collection.row_count(), markers.len()));
    }

    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, marker) in markers.iter().enumerate() {
        groups.entry(*marker).or_default().push(row);
    }
    groups
        .values()
        .map(|rows| collection.take_rows(rows).map_err(TascError::from))
        .collect()
}
