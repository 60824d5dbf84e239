//! Cycle counting and per-cycle splitting

use crate::domain::LoadDisplacement;
use crate::helpers::{cycle_markers, numbers_of};
use tasc_ops::prelude::*;
use tasc_std::split_rows;

/// Cycle number per row: starts at 1 and advances by `step` at each sign
/// change between consecutive present values, truncated to an integer
pub fn count_cycles(values: &[Option<f64>], step: f64) -> Vec<i64> {
    let mut cycle = 1.0_f64;
    let mut markers = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            if let (Some(prev), Some(cur)) = (values[i - 1], *value) {
                if prev * cur < 0.0 {
                    cycle += step;
                }
            }
        }
        markers.push(cycle.trunc() as i64);
    }
    markers
}

// ============ Cycle Count ============

pub struct CycleCount;

static CYCLE_COUNT_ARGS: [ArgMeta; 3] = [
    ArgMeta::optional("column", "Text", "Column whose sign changes mark cycles (load column when omitted)", "None"),
    ArgMeta::optional("step", "Number", "Increment per sign change", "0.5"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
];

static CYCLE_COUNT_EXAMPLES: [&str; 2] = [
    "cycle_count() → column \"load_cycle\"",
    "cycle_count(\"force\", 1.0, \"cycle\")",
];

impl Operation for CycleCount {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "cycle_count",
            description: "Count loading cycles from sign reversals of a column",
            args: &CYCLE_COUNT_ARGS,
            returns: ReturnShape::Collection,
            examples: &CYCLE_COUNT_EXAMPLES,
            category: "cycles",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let column = match bound.opt_text("column")? {
            Some(name) => name,
            None => LoadDisplacement::of(collection).load_column(),
        };
        let step = bound.number_or("step", 0.5)?;
        let name = match bound.opt_text("result_column")? {
            Some(name) => name.to_string(),
            None => format!("{}_cycle", column),
        };

        let markers = count_cycles(&numbers_of(collection, column, "cycle_count")?, step);
        let result = Column::new(name, markers.into_iter().map(Value::from).collect())
            .with_metadata("description", format!("Cycle count based on {}", column));
        let mut out = collection.clone();
        out.set_column(result)?;
        Ok(out.into())
    }
}

// ============ Split By Cycles ============

pub struct SplitByCycles;

static SPLIT_BY_CYCLES_ARGS: [ArgMeta; 1] = [ArgMeta::optional(
    "cycle_column",
    "Text",
    "Column of cycle numbers (found by name or counted when omitted)",
    "None",
)];

static SPLIT_BY_CYCLES_EXAMPLES: [&str; 1] = ["split_by_cycles() → one collection per cycle"];

impl Operation for SplitByCycles {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "split_by_cycles",
            description: "Split into one collection per cycle number",
            args: &SPLIT_BY_CYCLES_ARGS,
            returns: ReturnShape::Collections,
            examples: &SPLIT_BY_CYCLES_EXAMPLES,
            category: "cycles",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let (source, markers) = cycle_markers(collection, bound.opt_text("cycle_column")?, "split_by_cycles")?;
        split_rows(&source, &markers).map(Outcome::Collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_ops::args;

    fn sample() -> Collection {
        Collection::from_columns([
            (
                "load",
                vec![
                    Value::from(1.0),
                    Value::from(-1.0),
                    Value::Null,
                    Value::from(2.0),
                    Value::from(-2.0),
                    Value::from(3.0),
                ],
            ),
            ("displacement", (0..6).map(|i| Value::from(i as f64)).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_count_cycles() {
        let values = [Some(1.0), Some(-1.0), None, Some(2.0), Some(-2.0), Some(3.0)];
        // The null row breaks the pair on both sides
        assert_eq!(count_cycles(&values, 0.5), vec![1, 1, 1, 1, 2, 2]);
        assert_eq!(count_cycles(&values, 1.0), vec![1, 2, 2, 2, 3, 4]);
        assert!(count_cycles(&[], 0.5).is_empty());
    }

    #[test]
    fn test_cycle_count_op() {
        let out = CycleCount.call(&sample(), &Args::new()).unwrap().into_collection().unwrap();
        let cycles = out.column("load_cycle").unwrap();
        assert_eq!(cycles.values[4], Value::from(2i64));
        assert_eq!(
            cycles.metadata.get("description"),
            Some(&Value::from("Cycle count based on load"))
        );

        let out = CycleCount
            .call(&sample(), &args!["load", 1.0, "c"])
            .unwrap()
            .into_collection()
            .unwrap();
        assert!(out.has_column("c"));
    }

    #[test]
    fn test_cycle_count_rejects_text() {
        let c = Collection::from_columns([("load", vec![Value::from("x")])]).unwrap();
        let err = CycleCount.call(&c, &Args::new()).unwrap_err();
        assert_eq!(err.code, codes::TYPE_ERROR);
        let err = CycleCount.call(&c, &args!["missing"]).unwrap_err();
        assert_eq!(err.code, codes::UNKNOWN_COLUMN);
    }

    #[test]
    fn test_split_by_cycles_counts_when_needed() {
        let Outcome::Collections(groups) = SplitByCycles.call(&sample(), &Args::new()).unwrap() else {
            panic!("expected collections");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].row_count(), 4);
        assert_eq!(groups[1].column("load").unwrap().numbers(), vec![Some(-2.0), Some(3.0)]);
    }

    #[test]
    fn test_split_by_existing_cycle_column() {
        let mut c = sample();
        c.add_column(Column::new("Cycle", [3, 3, 1, 1, 1, 2].map(Value::from).to_vec()))
            .unwrap();
        let Outcome::Collections(groups) = SplitByCycles.call(&c, &Args::new()).unwrap() else {
            panic!("expected collections");
        };
        assert_eq!(groups.iter().map(Collection::row_count).collect::<Vec<_>>(), vec![3, 1, 2]);
    }
}
