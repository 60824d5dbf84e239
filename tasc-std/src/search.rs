//! Range search over a column

use tasc_ops::prelude::*;
use std::cmp::Ordering;

pub struct SearchByRange;

static SEARCH_BY_RANGE_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("column_name", "Text", "Column to test"),
    ArgMeta::required("min_value", "Any", "Lower bound"),
    ArgMeta::required("max_value", "Any", "Upper bound"),
    ArgMeta::optional("inclusive", "Bool", "Whether the bounds themselves match", "true"),
];

static SEARCH_BY_RANGE_EXAMPLES: [&str; 1] =
    ["search_by_range(\"load\", 0, 100) → rows with 0 ≤ load ≤ 100"];

impl Operation for SearchByRange {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "search_by_range",
            description: "Keep rows whose value lies between two bounds; missing values never match",
            args: &SEARCH_BY_RANGE_ARGS,
            returns: ReturnShape::Collection,
            examples: &SEARCH_BY_RANGE_EXAMPLES,
            category: "search",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let column = collection.column(bound.text("column_name")?)?;
        let min = bound.value("min_value")?;
        let max = bound.value("max_value")?;
        let inclusive = bound.bool_or("inclusive", true)?;

        let above = |v: &Value| match v.compare(min) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => inclusive,
            _ => false,
        };
        let below = |v: &Value| match v.compare(max) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => inclusive,
            _ => false,
        };

        let keep: Vec<usize> = column
            .values
            .iter()
            .enumerate()
            .filter(|&(_, v)| !v.is_null() && above(v) && below(v))
            .map(|(i, _)| i)
            .collect();
        Ok(collection.take_rows(&keep)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_ops::args;

    fn sample() -> Collection {
        Collection::from_columns([(
            "load",
            vec![Value::from(0.0), Value::from(5.0), Value::Null, Value::from(10.0), Value::from(12.0)],
        )])
        .unwrap()
    }

    fn loads(args: Args) -> Vec<Option<f64>> {
        SearchByRange
            .call(&sample(), &args)
            .unwrap()
            .into_collection()
            .unwrap()
            .column("load")
            .unwrap()
            .numbers()
    }

    #[test]
    fn test_inclusive_bounds() {
        assert_eq!(loads(args!["load", 0.0, 10.0]), vec![Some(0.0), Some(5.0), Some(10.0)]);
    }

    #[test]
    fn test_exclusive_bounds() {
        assert_eq!(loads(args!["load", 0.0, 10.0; inclusive = false]), vec![Some(5.0)]);
    }

    #[test]
    fn test_unknown_column() {
        let err = SearchByRange.call(&sample(), &args!["x", 0.0, 1.0]).unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_COLUMN);
    }
}
