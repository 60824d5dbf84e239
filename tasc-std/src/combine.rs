//! Row-wise combination of several columns

use tasc_ops::prelude::*;
use crate::helpers::{combine_rows, numeric_column, numeric_column_names, to_values};

static COMBINE_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("columns", "List<Text>", "Columns to combine (all numeric when omitted)", "None"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
];

/// Shared body of `sum_columns` and `average_columns`; the result column is
/// named `<label>(<a>_<b>...)` and takes its unit from the first input
fn combine<F>(c: &Collection, args: &Args, meta: &OperationMeta, label: &str, f: F) -> Result<Outcome, TascError>
where
    F: Fn(&[f64]) -> f64,
{
    let bound = args.bind(meta)?;
    let columns = match bound.opt_text_list("columns")? {
        Some(columns) => columns,
        None => numeric_column_names(c),
    };
    let Some(first) = columns.first() else {
        return Err(TascError::empty_input(format!("{} needs at least one column", meta.name)));
    };

    let inputs = columns
        .iter()
        .map(|name| numeric_column(c, name, meta.name))
        .collect::<Result<Vec<_>, _>>()?;
    let name = match bound.opt_text("result_column")? {
        Some(name) => name.to_string(),
        None => format!("{}({})", label, columns.join("_")),
    };

    let source = c.column(first)?;
    let mut result = Column::new(name, to_values(combine_rows(&inputs, f)));
    if let Some(unit) = &source.unit {
        result = result.with_unit(unit.clone());
    }
    let mut out = c.clone();
    out.set_column(result)?;
    Ok(out.into())
}

// ============ Sum ============

pub struct SumColumns;

static SUM_EXAMPLES: [&str; 1] = ["sum_columns([\"load1\", \"load2\"]) → column \"sum(load1_load2)\""];

impl Operation for SumColumns {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "sum_columns",
            description: "Row-wise sum of several columns",
            args: &COMBINE_ARGS,
            returns: ReturnShape::Collection,
            examples: &SUM_EXAMPLES,
            category: "combine",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        combine(collection, args, &self.meta(), "sum", |xs| xs.iter().sum())
    }
}

// ============ Average ============

pub struct AverageColumns;

static AVERAGE_EXAMPLES: [&str; 1] =
    ["average_columns([\"load1\", \"load2\"]) → column \"average(load1_load2)\""];

impl Operation for AverageColumns {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "average_columns",
            description: "Row-wise mean of several columns",
            args: &COMBINE_ARGS,
            returns: ReturnShape::Collection,
            examples: &AVERAGE_EXAMPLES,
            category: "combine",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        combine(collection, args, &self.meta(), "average", |xs| {
            xs.iter().sum::<f64>() / xs.len() as f64
        })
    }
}
