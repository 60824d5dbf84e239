//! Row filters

use tasc_ops::prelude::*;

// ============ Filter by value ============

pub struct FilterByValue;

static FILTER_BY_VALUE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("column_name", "Text", "Column to compare"),
    ArgMeta::required("value", "Any", "Value to keep"),
    ArgMeta::optional("tolerance", "Number", "Accept numbers within ± tolerance", "None"),
];

static FILTER_BY_VALUE_EXAMPLES: [&str; 2] = [
    "filter_by_value(\"mode\", \"hold\") → rows whose mode is hold",
    "filter_by_value(\"load\", 10, tolerance=0.5) → rows with 9.5 ≤ load ≤ 10.5",
];

impl Operation for FilterByValue {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "filter_by_value",
            description: "Keep rows whose column equals a value",
            args: &FILTER_BY_VALUE_ARGS,
            returns: ReturnShape::Collection,
            examples: &FILTER_BY_VALUE_EXAMPLES,
            category: "filter",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let column = collection.column(bound.text("column_name")?)?;
        let target = bound.value("value")?;
        let tolerance = bound.opt_number("tolerance")?;

        let keep: Vec<usize> = match tolerance {
            Some(tolerance) => {
                let center = target.as_number().ok_or_else(|| {
                    TascError::type_error("Number", target.type_name())
                        .with_note("value must be numeric when a tolerance is given")
                })?;
                column
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.as_number().is_some_and(|n| (n - center).abs() <= tolerance))
                    .map(|(i, _)| i)
                    .collect()
            }
            None => column
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| *v == target)
                .map(|(i, _)| i)
                .collect(),
        };

        Ok(collection.take_rows(&keep)?.into())
    }
}

// ============ Filter out missing ============

pub struct FilterOutNone;

static FILTER_OUT_NONE_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("columns", "List<Text>", "Columns to inspect (all when omitted)", "None"),
    ArgMeta::optional(
        "mode",
        "Text",
        "\"any\" drops rows with any missing entry, \"all\" only rows missing everywhere",
        "\"any\"",
    ),
];

impl Operation for FilterOutNone {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "filter_out_none",
            description: "Drop rows with missing values",
            args: &FILTER_OUT_NONE_ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "filter",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let require_all = match bound.text_or("mode", "any")? {
            "any" => false,
            "all" => true,
            other => {
                return Err(TascError::invalid_argument(format!(
                    "mode must be 'any' or 'all' (got '{}')",
                    other
                )))
            }
        };

        let inspected: Vec<&Column> = match bound.opt_text_list("columns")? {
            Some(names) => names
                .iter()
                .map(|n| collection.column(n))
                .collect::<Result<_, _>>()?,
            None => collection.columns().iter().collect(),
        };

        let keep: Vec<usize> = (0..collection.row_count())
            .filter(|&row| {
                let mut missing = inspected.iter().map(|col| col.values[row].is_null());
                if require_all {
                    !missing.all(|m| m)
                } else {
                    !missing.any(|m| m)
                }
            })
            .collect();

        Ok(collection.take_rows(&keep)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_ops::args;

    fn sample() -> Collection {
        Collection::from_columns([
            ("a", vec![Value::from(1.0), Value::Null, Value::Null, Value::from(10.2)]),
            ("b", vec![Value::from("x"), Value::from("y"), Value::Null, Value::from("x")]),
        ])
        .unwrap()
    }

    fn run(op: &dyn Operation, args: Args) -> Collection {
        op.call(&sample(), &args).unwrap().into_collection().unwrap()
    }

    #[test]
    fn test_filter_by_exact_value() {
        let out = run(&FilterByValue, args!["b", "x"]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.index().values(), &[Value::from(1.0), Value::from(4.0)]);
    }

    #[test]
    fn test_filter_by_value_with_tolerance() {
        let out = run(&FilterByValue, args!["a", 10.0, 0.5]);
        assert_eq!(out.column("a").unwrap().numbers(), vec![Some(10.2)]);
        let err = FilterByValue.call(&sample(), &args!["a", "x", 0.5]).unwrap_err();
        assert_eq!(err.code, codes::TYPE_ERROR);
    }

    #[test]
    fn test_filter_out_none_modes() {
        assert_eq!(run(&FilterOutNone, Args::new()).row_count(), 2);
        assert_eq!(run(&FilterOutNone, args![; mode = "all"]).row_count(), 3);
        assert_eq!(run(&FilterOutNone, args![; columns = "b"]).row_count(), 3);
    }

    #[test]
    fn test_filter_out_none_bad_mode() {
        let err = FilterOutNone.call(&sample(), &args![; mode = "some"]).unwrap_err();
        assert_eq!(err.code, codes::INVALID_ARGUMENT);
    }
}
