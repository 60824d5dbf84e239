//! Curve analysis: slopes, peak load, stiffness

use crate::domain::LoadDisplacement;
use crate::helpers::numbers_of;
use tasc_ops::prelude::*;

/// Point-to-point slopes dy/dx; the first row and any row with a missing
/// value or a repeated x has none
pub fn point_slopes(x: &[Option<f64>], y: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut slopes = Vec::with_capacity(x.len());
    if !x.is_empty() {
        slopes.push(None);
    }
    for i in 1..x.len().min(y.len()) {
        let slope = match (x[i - 1], x[i], y[i - 1], y[i]) {
            (Some(x0), Some(x1), Some(y0), Some(y1)) if x1 != x0 => Some((y1 - y0) / (x1 - x0)),
            _ => None,
        };
        slopes.push(slope);
    }
    slopes
}

// ============ Slopes ============

pub struct CalculateSlopes;

static SLOPES_ARGS: [ArgMeta; 3] = [
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
    ArgMeta::optional("x_column", "Text", "Independent column (displacement when omitted)", "None"),
    ArgMeta::optional("y_column", "Text", "Dependent column (load when omitted)", "None"),
];

static SLOPES_EXAMPLES: [&str; 1] = ["calculate_slopes() → column \"slope_load_displacement\""];

impl Operation for CalculateSlopes {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "calculate_slopes",
            description: "Point-to-point slope of y over x",
            args: &SLOPES_ARGS,
            returns: ReturnShape::Collection,
            examples: &SLOPES_EXAMPLES,
            category: "analysis",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let view = LoadDisplacement::of(collection);
        let x_column = bound.opt_text("x_column")?.unwrap_or(view.displacement_column());
        let y_column = bound.opt_text("y_column")?.unwrap_or(view.load_column());

        let x = numbers_of(collection, x_column, "calculate_slopes")?;
        let y = numbers_of(collection, y_column, "calculate_slopes")?;
        if x.len() < 2 {
            return Err(TascError::empty_input("calculate_slopes needs at least two rows")
                .in_operation("calculate_slopes"));
        }

        let name = match bound.opt_text("result_column")? {
            Some(name) => name.to_string(),
            None => format!("slope_{}_{}", y_column, x_column),
        };
        let mut result = Column::numeric(name, point_slopes(&x, &y))
            .with_metadata("description", format!("Slope between {} and {}", y_column, x_column));
        if let (Some(y_unit), Some(x_unit)) = (
            collection.column(y_column)?.unit.as_deref(),
            collection.column(x_column)?.unit.as_deref(),
        ) {
            result = result.with_unit(format!("{}/{}", y_unit, x_unit));
        }

        let mut out = collection.clone();
        out.set_column(result)?;
        Ok(out.into())
    }
}

// ============ Max Load ============

pub struct MaxLoad;

static MAX_LOAD_ARGS: [ArgMeta; 1] = [ArgMeta::optional(
    "absolute",
    "Bool",
    "Compare magnitudes, keeping the sign of the peak",
    "false",
)];

static MAX_LOAD_EXAMPLES: [&str; 2] = ["max_load() → 12.5", "max_load(true) → -14.0"];

impl Operation for MaxLoad {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "max_load",
            description: "Peak value of the load column",
            args: &MAX_LOAD_ARGS,
            returns: ReturnShape::Scalar("Number"),
            examples: &MAX_LOAD_EXAMPLES,
            category: "analysis",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let absolute = args.bind(&self.meta())?.bool_or("absolute", false)?;
        let load = LoadDisplacement::of(collection).load_column();
        let values = numbers_of(collection, load, "max_load")?;
        let key = |v: f64| if absolute { v.abs() } else { v };

        values
            .into_iter()
            .flatten()
            .reduce(|best, v| if key(v) > key(best) { v } else { best })
            .map(|peak| Outcome::Value(Value::from(peak)))
            .ok_or_else(|| {
                TascError::empty_input(format!("column '{}' has no values", load)).in_operation("max_load")
            })
    }
}

// ============ Stiffness ============

pub struct CalculateStiffness;

static STIFFNESS_ARGS: [ArgMeta; 3] = [
    ArgMeta::optional("range_start", "Number", "Lower bound as a fraction of the peak load", "0.2"),
    ArgMeta::optional("range_end", "Number", "Upper bound as a fraction of the peak load", "0.8"),
    ArgMeta::optional("method", "Text", "linear_regression | secant", "\"linear_regression\""),
];

static STIFFNESS_EXAMPLES: [&str; 2] = [
    "calculate_stiffness() → 2.1",
    "calculate_stiffness(0.1, 0.4, \"secant\")",
];

impl Operation for CalculateStiffness {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "calculate_stiffness",
            description: "Load over displacement within a band of the peak load",
            args: &STIFFNESS_ARGS,
            returns: ReturnShape::Scalar("Number"),
            examples: &STIFFNESS_EXAMPLES,
            category: "analysis",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let range_start = bound.number_or("range_start", 0.2)?;
        let range_end = bound.number_or("range_end", 0.8)?;
        let method = bound.text_or("method", "linear_regression")?;

        let pairs = LoadDisplacement::of(collection).valid_pairs()?;
        if pairs.len() < 2 {
            return Err(TascError::empty_input("not enough rows with both load and displacement")
                .in_operation("calculate_stiffness"));
        }
        let peak = pairs.iter().map(|(l, _)| *l).fold(f64::NEG_INFINITY, f64::max);
        let (low, high) = (peak * range_start, peak * range_end);
        let band: Vec<(f64, f64)> = pairs
            .into_iter()
            .filter(|(l, _)| *l >= low && *l <= high)
            .map(|(l, d)| (d, l))
            .collect();
        if band.len() < 2 {
            return Err(TascError::empty_input(format!(
                "fewer than two rows between {}% and {}% of the peak load",
                range_start * 100.0,
                range_end * 100.0
            ))
            .in_operation("calculate_stiffness"));
        }

        let stiffness = match method {
            "linear_regression" => fit_slope(&band),
            "secant" => {
                let (x0, y0) = band[0];
                let (x1, y1) = band[band.len() - 1];
                (x1 != x0).then(|| (y1 - y0) / (x1 - x0))
            }
            other => {
                return Err(TascError::invalid_argument(format!("unknown stiffness method '{}'", other))
                    .with_suggestion("use linear_regression or secant"))
            }
        };
        stiffness
            .map(|s| Outcome::Value(Value::from(s)))
            .ok_or_else(|| TascError::div_zero().in_operation("calculate_stiffness"))
    }
}

/// Least-squares slope; none when every x is equal
fn fit_slope(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    (sxx != 0.0).then(|| sxy / sxx)
}
