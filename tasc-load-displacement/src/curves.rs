//! Skeleton and cumulative curves
//!
//! A curve rarely has one point per row, so it lives in the metadata under
//! `curves.<name>` as `{load, displacement, load_column, displacement_column}`
//! instead of as columns.

use crate::domain::LoadDisplacement;
use crate::helpers::{cycle_markers, numbers_of};
use std::collections::BTreeMap;
use tasc_ops::prelude::*;

pub const SKELETON_CURVE: &str = "skeleton_curve";
pub const CUMULATIVE_CURVE: &str = "cumulative_curve";

/// Load-displacement points in curve order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub load: Vec<f64>,
    pub displacement: Vec<f64>,
}

impl Curve {
    pub fn len(&self) -> usize {
        self.load.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty()
    }

    fn push(&mut self, load: f64, displacement: f64) {
        self.load.push(load);
        self.displacement.push(displacement);
    }

    fn last(&self) -> Option<(f64, f64)> {
        Some((*self.load.last()?, *self.displacement.last()?))
    }

    /// Displacement where the line through the last two points reaches `load`
    fn extend_to(&self, load: f64) -> Option<f64> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        Some(displacement_at(
            (self.load[n - 2], self.displacement[n - 2]),
            (self.load[n - 1], self.displacement[n - 1]),
            load,
        ))
    }

    fn from_value(name: &str, value: &Value) -> Result<Self, TascError> {
        let numbers = |key: &str| -> Result<Vec<f64>, TascError> {
            let list = value.get(key).and_then(Value::as_list).ok_or_else(|| {
                TascError::type_error("List<Number>", value.get(key).map_or("Null", Value::type_name))
                    .with_note(format!("{}.{}.{}", keys::CURVES, name, key))
            })?;
            list.iter()
                .map(|v| v.as_number().ok_or_else(|| TascError::type_error("Number", v.type_name())))
                .collect()
        };
        Ok(Self { load: numbers("load")?, displacement: numbers("displacement")? })
    }
}

/// On the line through `a` and `b` (load, displacement), the displacement at `load`
fn displacement_at(a: (f64, f64), b: (f64, f64), load: f64) -> f64 {
    if a.0 == b.0 {
        return a.1;
    }
    a.1 + (b.1 - a.1) * (load - a.0) / (b.0 - a.0)
}

/// Row positions per cycle, in ascending cycle order
fn cycles(markers: &[i64]) -> BTreeMap<i64, Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, marker) in markers.iter().enumerate() {
        groups.entry(*marker).or_default().push(row);
    }
    groups
}

fn points(load: &[Option<f64>], displacement: &[Option<f64>], rows: &[usize]) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|&i| Some((load[i]?, displacement[i]?)))
        .collect()
}

/// Position of the first maximum of `key`
fn first_max(points: &[(f64, f64)], key: impl Fn(&(f64, f64)) -> f64) -> usize {
    let mut best = 0;
    for (i, p) in points.iter().enumerate() {
        if key(p) > key(&points[best]) {
            best = i;
        }
    }
    best
}

/// How the part after the peak load cycle enters a skeleton curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrease {
    /// The point of maximum displacement of each cycle
    Envelope,
    /// Every point between the load peak and the displacement peak
    ContinuousOnly,
    /// Envelope when both peaks coincide, the continuous run otherwise
    Both,
}

impl Decrease {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "envelope" => Some(Self::Envelope),
            "continuous_only" => Some(Self::ContinuousOnly),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Envelope through each new load maximum, cycle by cycle up to the cycle
/// holding the peak load.
///
/// The first new maximum of a cycle shifts that cycle's displacements so
/// the curve continues the line through its last two points.
pub fn skeleton_curve(
    load: &[Option<f64>],
    displacement: &[Option<f64>],
    markers: &[i64],
    decrease: Option<Decrease>,
) -> Curve {
    let mut curve = Curve::default();
    let Some(peak_row) = load
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
        .map(|(i, _)| i)
    else {
        return curve;
    };
    let peak_cycle = markers[peak_row];
    let groups = cycles(markers);

    let mut peak = 0.0;
    let mut offset = 0.0;
    for rows in groups.range(..=peak_cycle).map(|(_, rows)| rows) {
        offset = 0.0;
        for (p, d) in points(load, displacement, rows) {
            if p <= peak {
                continue;
            }
            peak = p;
            if offset == 0.0 {
                if let Some(x) = curve.extend_to(p) {
                    offset = x - d;
                }
            }
            curve.push(p, d + offset);
        }
    }

    let Some(decrease) = decrease else {
        return curve;
    };
    for rows in groups.range(peak_cycle..).map(|(_, rows)| rows) {
        let valid = points(load, displacement, rows);
        if valid.is_empty() {
            continue;
        }
        let load_peak = first_max(&valid, |p| p.0);
        let disp_peak = first_max(&valid, |p| p.1);
        let run = load_peak.min(disp_peak)..=load_peak.max(disp_peak);
        match decrease {
            Decrease::Envelope => {
                let (p, d) = valid[disp_peak];
                curve.push(p, d + offset);
            }
            Decrease::Both if load_peak == disp_peak => {
                let (p, d) = valid[disp_peak];
                curve.push(p, d + offset);
            }
            Decrease::ContinuousOnly if load_peak == disp_peak => {}
            Decrease::ContinuousOnly | Decrease::Both => {
                for &(p, d) in &valid[run] {
                    if curve.last() == Some((p, d + offset)) {
                        continue;
                    }
                    curve.push(p, d + offset);
                }
            }
        }
    }
    curve
}

/// Positive-load branches of every cycle laid end to end.
///
/// Each branch is closed at zero load on both ends and shifted so it
/// starts where the previous one ended.
pub fn cumulative_curve(load: &[Option<f64>], displacement: &[Option<f64>], markers: &[i64]) -> Curve {
    let mut curve = Curve::default();
    for rows in cycles(markers).values() {
        let positive: Vec<(f64, f64)> = points(load, displacement, rows)
            .into_iter()
            .filter(|(p, _)| *p >= 0.0)
            .collect();
        let n = positive.len();
        if n == 0 {
            continue;
        }
        let (start, end) = if n >= 2 {
            (
                displacement_at(positive[0], positive[1], 0.0),
                displacement_at(positive[n - 2], positive[n - 1], 0.0),
            )
        } else {
            (positive[0].1, positive[0].1)
        };
        let offset = curve.displacement.last().map_or(0.0, |last| last - start);

        curve.push(0.0, start + offset);
        for (p, d) in &positive {
            curve.push(*p, d + offset);
        }
        curve.push(0.0, end + offset);
    }
    curve
}

/// Store `curve` under `curves.<name>`, replacing a curve of the same name
pub fn store_curve(collection: &mut Collection, name: &str, curve: &Curve) {
    let view = LoadDisplacement::of(collection);
    let entry = Value::object([
        ("load", Value::list(curve.load.iter().copied())),
        ("displacement", Value::list(curve.displacement.iter().copied())),
        ("load_column", Value::from(view.load_column())),
        ("displacement_column", Value::from(view.displacement_column())),
    ]);
    let curves = collection
        .metadata_mut()
        .entry(keys::CURVES.to_string())
        .or_insert_with(|| Value::Object(BTreeMap::new()));
    if curves.as_object().is_none() {
        *curves = Value::Object(BTreeMap::new());
    }
    if let Some(map) = curves.as_object_mut() {
        map.insert(name.to_string(), entry);
    }
}

/// The curve stored under `curves.<name>`
pub fn curve(collection: &Collection, name: &str) -> Result<Curve, TascError> {
    let hint = "create it with create_skeleton_curve or create_cumulative_curve";
    let curves = collection
        .metadata()
        .get(keys::CURVES)
        .ok_or_else(|| TascError::missing_key(keys::CURVES).with_suggestion(hint))?;
    let entry = curves.get(name).ok_or_else(|| {
        TascError::missing_key(&format!("{}.{}", keys::CURVES, name)).with_suggestion(hint)
    })?;
    Curve::from_value(name, entry)
}

fn curve_columns(collection: &Collection, op: &str) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), TascError> {
    let view = LoadDisplacement::of(collection);
    let load = numbers_of(collection, view.load_column(), op)?;
    if load.iter().all(Option::is_none) {
        return Err(TascError::empty_input(format!("column '{}' has no values", view.load_column()))
            .in_operation(op));
    }
    Ok((load, numbers_of(collection, view.displacement_column(), op)?))
}

// ============ Skeleton Curve ============

pub struct CreateSkeletonCurve;

static SKELETON_ARGS: [ArgMeta; 4] = [
    ArgMeta::optional("has_decrease", "Bool", "Include the part after the peak load", "false"),
    ArgMeta::optional(
        "decrease_type",
        "Text",
        "envelope | continuous_only | both",
        "\"envelope\"",
    ),
    ArgMeta::optional("cycle_column", "Text", "Column of cycle numbers (found by name or counted when omitted)", "None"),
    ArgMeta::optional("curve_name", "Text", "Key under metadata curves", "\"skeleton_curve\""),
];

static SKELETON_EXAMPLES: [&str; 2] = [
    "create_skeleton_curve() → metadata curves.skeleton_curve",
    "create_skeleton_curve(true, \"both\")",
];

impl Operation for CreateSkeletonCurve {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "create_skeleton_curve",
            description: "Envelope of the load-displacement record across cycles, stored in metadata",
            args: &SKELETON_ARGS,
            returns: ReturnShape::Collection,
            examples: &SKELETON_EXAMPLES,
            category: "curves",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let decrease_name = bound.text_or("decrease_type", "envelope")?;
        let decrease = Decrease::parse(decrease_name).ok_or_else(|| {
            TascError::invalid_argument(format!("decrease_type '{}'", decrease_name))
                .with_suggestion("use envelope, continuous_only or both")
                .in_operation("create_skeleton_curve")
        })?;
        let decrease = bound.bool_or("has_decrease", false)?.then_some(decrease);
        let name = bound.text_or("curve_name", SKELETON_CURVE)?;

        let (mut out, markers) =
            cycle_markers(collection, bound.opt_text("cycle_column")?, "create_skeleton_curve")?;
        let (load, displacement) = curve_columns(&out, "create_skeleton_curve")?;
        let curve = skeleton_curve(&load, &displacement, &markers, decrease);
        store_curve(&mut out, name, &curve);
        Ok(out.into())
    }
}

// ============ Cumulative Curve ============

pub struct CreateCumulativeCurve;

static CUMULATIVE_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("cycle_column", "Text", "Column of cycle numbers (found by name or counted when omitted)", "None"),
    ArgMeta::optional("curve_name", "Text", "Key under metadata curves", "\"cumulative_curve\""),
];

impl Operation for CreateCumulativeCurve {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "create_cumulative_curve",
            description: "Positive-load branches of every cycle laid end to end, stored in metadata",
            args: &CUMULATIVE_ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "curves",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let name = bound.text_or("curve_name", CUMULATIVE_CURVE)?;
        let (mut out, markers) =
            cycle_markers(collection, bound.opt_text("cycle_column")?, "create_cumulative_curve")?;
        let (load, displacement) = curve_columns(&out, "create_cumulative_curve")?;
        let curve = cumulative_curve(&load, &displacement, &markers);
        store_curve(&mut out, name, &curve);
        Ok(out.into())
    }
}

// ============ Get Curve ============

pub struct GetCurve;

static GET_CURVE_ARGS: [ArgMeta; 1] = [ArgMeta::required("curve_name", "Text", "Key under metadata curves")];

impl Operation for GetCurve {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "get_curve",
            description: "A stored curve as {load, displacement}",
            args: &GET_CURVE_ARGS,
            returns: ReturnShape::Scalar("Object"),
            examples: &[],
            category: "curves",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let name = bound.text("curve_name")?;
        let curve = curve(collection, name).map_err(|e| e.in_operation("get_curve"))?;
        Ok(Value::object([
            ("load", Value::list(curve.load)),
            ("displacement", Value::list(curve.displacement)),
        ])
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::construct;
    use tasc_ops::{args, DomainParams};

    fn numbers(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    fn record(load: &[f64], displacement: &[f64]) -> Collection {
        let values = |xs: &[f64]| xs.iter().copied().map(Value::from).collect::<Vec<_>>();
        let c = Collection::from_columns([("load", values(load)), ("displacement", values(displacement))])
            .unwrap();
        construct(DomainParams::from_collection(c)).unwrap()
    }

    #[test]
    fn test_skeleton_follows_new_maxima() {
        let load = numbers(&[0.0, 5.0, -5.0, 10.0, -10.0, 15.0]);
        let disp = numbers(&[0.0, 0.5, -0.5, 1.0, -1.0, 1.2]);
        let curve = skeleton_curve(&load, &disp, &[1, 1, 1, 2, 2, 3], None);
        assert_eq!(curve.load, vec![5.0, 10.0, 15.0]);
        // Cycle 3 is shifted onto the line through the previous two points
        assert_eq!(curve.displacement.len(), 3);
        assert!((curve.displacement[2] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_skeleton_decrease_modes() {
        let load = numbers(&[0.0, 5.0, -5.0, 10.0, -10.0, 15.0, 12.0]);
        let disp = numbers(&[0.0, 0.5, -0.5, 1.0, -1.0, 1.5, 2.0]);
        let markers = [1, 1, 1, 2, 2, 3, 3];

        let envelope = skeleton_curve(&load, &disp, &markers, Some(Decrease::Envelope));
        assert_eq!(envelope.load, vec![5.0, 10.0, 15.0, 12.0]);
        assert_eq!(envelope.displacement.last(), Some(&2.0));

        let continuous = skeleton_curve(&load, &disp, &markers, Some(Decrease::ContinuousOnly));
        assert_eq!(continuous.load, vec![5.0, 10.0, 15.0, 12.0]);
        assert_eq!(skeleton_curve(&load, &disp, &markers, Some(Decrease::Both)), continuous);
        assert_eq!(Decrease::parse("sideways"), None);
    }

    #[test]
    fn test_cumulative_joins_branches() {
        let load = numbers(&[0.0, 4.0, 8.0, -2.0, 0.0, 6.0, 12.0, -3.0]);
        let disp = numbers(&[0.0, 1.0, 2.0, 1.5, 1.5, 2.5, 3.5, 3.0]);
        let curve = cumulative_curve(&load, &disp, &[1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(curve.load, vec![0.0, 0.0, 4.0, 8.0, 0.0, 0.0, 0.0, 6.0, 12.0, 0.0]);
        assert_eq!(curve.displacement, vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_skeleton_stored_in_metadata() {
        let c = record(&[0.0, 5.0, -5.0, 10.0, -10.0, 15.0], &[0.0, 0.5, -0.5, 1.0, -1.0, 1.5]);
        let out = CreateSkeletonCurve.call(&c, &Args::new()).unwrap().into_collection().unwrap();
        assert!(out.has_column("load_cycle"));
        let stored = out.metadata()[keys::CURVES].get(SKELETON_CURVE).unwrap();
        assert_eq!(stored.get("load_column"), Some(&Value::from("load")));

        let curve = curve(&out, SKELETON_CURVE).unwrap();
        assert_eq!(curve.load, vec![5.0, 10.0, 15.0]);

        let Outcome::Value(value) = GetCurve.call(&out, &args!["skeleton_curve"]).unwrap() else {
            panic!("expected a value");
        };
        assert_eq!(value.get("load"), Some(&Value::list([5.0, 10.0, 15.0])));
    }

    #[test]
    fn test_missing_curve_is_missing_key() {
        let c = record(&[1.0, -1.0], &[0.1, -0.1]);
        let err = curve(&c, SKELETON_CURVE).unwrap_err();
        assert_eq!(err.code, codes::MISSING_KEY);
        assert!(err.message.contains("curves"));

        let with_cumulative = CreateCumulativeCurve.call(&c, &Args::new()).unwrap().into_collection().unwrap();
        assert!(curve(&with_cumulative, CUMULATIVE_CURVE).is_ok());
        let err = GetCurve.call(&with_cumulative, &args!["skeleton_curve"]).unwrap_err();
        assert_eq!(err.code, codes::MISSING_KEY);
        assert!(err.message.contains("curves.skeleton_curve"));
        assert_eq!(err.context.unwrap().operation.as_deref(), Some("get_curve"));
    }

    #[test]
    fn test_bad_decrease_type() {
        let c = record(&[1.0, -1.0], &[0.1, -0.1]);
        let err = CreateSkeletonCurve
            .call(&c, &args![; has_decrease = true, decrease_type = "sideways"])
            .unwrap_err();
        assert_eq!(err.code, codes::INVALID_ARGUMENT);
    }
}
