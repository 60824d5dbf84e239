//! Smoothing and summary statistics

use tasc_ops::prelude::*;
use crate::helpers::{numeric_column, with_result};
use std::collections::BTreeMap;

// ============ Moving average ============

pub struct MovingAverage;

static MOVING_AVERAGE_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("column", "Text", "Input column"),
    ArgMeta::optional("window_size", "Integer", "Window length (odd recommended)", "3"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
    ArgMeta::optional(
        "edge_handling",
        "Text",
        "\"asymmetric\" truncates the window at the ends, \"symmetric\" shrinks it evenly",
        "\"asymmetric\"",
    ),
];

static MOVING_AVERAGE_EXAMPLES: [&str; 1] = ["moving_average(\"load\", 5) → column \"ma5(load)\""];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Edges {
    Asymmetric,
    Symmetric,
}

/// Mean of the present values around each row; `None` when the window
/// holds no values
fn moving_average(values: &[Option<f64>], window: usize, edges: Edges) -> Vec<Option<f64>> {
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let (start, end) = match edges {
                Edges::Asymmetric => (i.saturating_sub(half), (i + half + 1).min(n)),
                Edges::Symmetric => {
                    let radius = half.min(i).min(n - 1 - i);
                    (i - radius, i + radius + 1)
                }
            };
            let present: Vec<f64> = values[start..end].iter().flatten().copied().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        })
        .collect()
}

impl Operation for MovingAverage {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "moving_average",
            description: "Centered moving average of a column",
            args: &MOVING_AVERAGE_ARGS,
            returns: ReturnShape::Collection,
            examples: &MOVING_AVERAGE_EXAMPLES,
            category: "stats",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let column = bound.text("column")?;
        let window = bound.usize_or("window_size", 3)?;
        let edges = match bound.text_or("edge_handling", "asymmetric")? {
            "asymmetric" => Edges::Asymmetric,
            "symmetric" => Edges::Symmetric,
            other => {
                return Err(TascError::invalid_argument(format!(
                    "edge_handling must be symmetric or asymmetric (got '{}')",
                    other
                )))
            }
        };
        if window < 1 {
            return Err(TascError::invalid_argument("window_size must be at least 1"));
        }
        if window > collection.row_count() {
            return Err(TascError::invalid_argument(format!(
                "window_size {} exceeds the row count {}",
                window,
                collection.row_count()
            )));
        }

        let values = numeric_column(collection, column, "moving_average")?;
        let name = match bound.opt_text("result_column")? {
            Some(name) => name.to_string(),
            None => format!("ma{}({})", window, column),
        };
        let averaged = moving_average(&values, window, edges);
        Ok(with_result(collection, column, &name, averaged)?.into())
    }
}

// ============ Describe ============

pub struct Describe;

static DESCRIBE_ARGS: [ArgMeta; 1] = [ArgMeta::optional(
    "columns",
    "List<Text>",
    "Columns to summarize (all numeric when omitted)",
    "None",
)];

impl Operation for Describe {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "describe",
            description: "count, mean, min and max of numeric columns",
            args: &DESCRIBE_ARGS,
            returns: ReturnShape::Scalar("Object"),
            examples: &[],
            category: "stats",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let summary = collection.describe();
        let Some(columns) = bound.opt_text_list("columns")? else {
            return Ok(summary.into());
        };

        let mut picked = BTreeMap::new();
        for name in columns {
            collection.column(&name)?;
            if let Some(stats) = summary.get(&name) {
                picked.insert(name, stats.clone());
            }
        }
        Ok(Value::Object(picked).into())
    }
}
