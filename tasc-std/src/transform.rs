//! Elementwise transforms of a single column

use tasc_ops::prelude::*;
use crate::helpers::{numeric_column, with_result};

/// Apply `f` to every present value of `column`, storing the result as
/// `result_column` or `default_name`
fn map_column<F>(
    c: &Collection,
    bound: &BoundArgs,
    default_name: impl FnOnce(&str) -> String,
    f: F,
) -> Result<Outcome, TascError>
where
    F: Fn(f64) -> f64,
{
    let column = bound.text("column")?;
    let values = numeric_column(c, column, bound.op())?;
    let name = match bound.opt_text("result_column")? {
        Some(name) => name.to_string(),
        None => default_name(column),
    };
    let mapped = values.into_iter().map(|v| v.map(&f)).collect();
    Ok(with_result(c, column, &name, mapped)?.into())
}

// ============ Sin / Cos ============

static TRIG_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("column", "Text", "Input column"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
    ArgMeta::optional("degrees", "Bool", "Treat input as degrees", "false"),
];

fn trig(c: &Collection, args: &Args, meta: &OperationMeta, f: fn(f64) -> f64) -> Result<Outcome, TascError> {
    let bound = args.bind(meta)?;
    let degrees = bound.bool_or("degrees", false)?;
    let name = meta.name;
    map_column(c, &bound, |col| format!("{}({})", name, col), |v| {
        f(if degrees { v.to_radians() } else { v })
    })
}

pub struct Sin;

static SIN_EXAMPLES: [&str; 1] = ["sin(\"angle\", degrees=true) → column \"sin(angle)\""];

impl Operation for Sin {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "sin",
            description: "Sine of each value",
            args: &TRIG_ARGS,
            returns: ReturnShape::Collection,
            examples: &SIN_EXAMPLES,
            category: "transform",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        trig(collection, args, &self.meta(), f64::sin)
    }
}

pub struct Cos;

impl Operation for Cos {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "cos",
            description: "Cosine of each value",
            args: &TRIG_ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "transform",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        trig(collection, args, &self.meta(), f64::cos)
    }
}

// ============ Abs ============

pub struct AbsValues;

static ABS_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("column", "Text", "Input column"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
];

impl Operation for AbsValues {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "abs_values",
            description: "Absolute value of each value",
            args: &ABS_ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "transform",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        map_column(collection, &bound, |col| format!("abs({})", col), f64::abs)
    }
}

// ============ Round ============

pub struct RoundValues;

static ROUND_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("column", "Text", "Input column"),
    ArgMeta::optional("decimals", "Integer", "Digits after the decimal point", "0"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
];

static ROUND_EXAMPLES: [&str; 1] = ["round_values(\"load\", 2) → column \"round(load, 2)\""];

/// Round half to even at `decimals` digits
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

impl Operation for RoundValues {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "round_values",
            description: "Round each value to a number of decimals",
            args: &ROUND_ARGS,
            returns: ReturnShape::Collection,
            examples: &ROUND_EXAMPLES,
            category: "transform",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let decimals = bound.opt_integer("decimals")?.unwrap_or(0);
        let decimals = i32::try_from(decimals)
            .map_err(|_| TascError::invalid_argument(format!("decimals out of range: {}", decimals)))?;
        map_column(
            collection,
            &bound,
            |col| format!("round({}, {})", col, decimals),
            |v| round_to(v, decimals),
        )
    }
}

// ============ Normalize ============

pub struct Normalize;

static NORMALIZE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("column", "Text", "Input column"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
    ArgMeta::optional("method", "Text", "\"minmax\" to [0, 1] or \"zscore\"", "\"minmax\""),
];

static NORMALIZE_EXAMPLES: [&str; 2] = [
    "normalize(\"load\") → column \"norm_minmax(load)\"",
    "normalize(\"load\", method=\"zscore\") → column \"norm_zscore(load)\"",
];

impl Operation for Normalize {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "normalize",
            description: "Scale a column by min-max or z-score",
            args: &NORMALIZE_ARGS,
            returns: ReturnShape::Collection,
            examples: &NORMALIZE_EXAMPLES,
            category: "transform",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let method = bound.text_or("method", "minmax")?;
        let column = bound.text("column")?;
        let present = collection.column(column)?.present_numbers();
        let default_name = |col: &str| format!("norm_{}({})", method, col);

        // An all-missing column normalizes to all-missing
        let (offset, scale, constant) = match method {
            "minmax" => {
                let min = present.iter().copied().fold(f64::INFINITY, f64::min);
                let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (min, max - min, 0.5)
            }
            "zscore" => {
                let n = present.len().max(1) as f64;
                let mean = present.iter().sum::<f64>() / n;
                let variance = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                (mean, variance.sqrt(), 0.0)
            }
            other => {
                return Err(TascError::invalid_argument(format!(
                    "method must be minmax or zscore (got '{}')",
                    other
                )))
            }
        };

        map_column(collection, &bound, default_name, |v| {
            if scale == 0.0 {
                constant
            } else {
                (v - offset) / scale
            }
        })
    }
}
