//! Column and row selection

use tasc_ops::prelude::*;
use crate::helpers::record_operation;
use tracing::debug;

/// Columns named in `columns` (all when `None`) restricted to `rows`
/// (all when `None`). Metadata is copied.
fn project(
    c: &Collection,
    columns: Option<&[String]>,
    rows: Option<&[usize]>,
) -> Result<Collection, TascError> {
    let picked: Vec<&Column> = match columns {
        Some(names) => names.iter().map(|n| c.column(n)).collect::<Result<_, _>>()?,
        None => c.columns().iter().collect(),
    };

    let (index, picked): (Indices, Vec<Column>) = match rows {
        Some(rows) => {
            if let Some(&bad) = rows.iter().find(|&&r| r >= c.row_count()) {
                return Err(TascError::index_out_of_range(bad, c.row_count()));
            }
            (c.index().take(rows), picked.into_iter().map(|col| col.take(rows)).collect())
        }
        None => (c.index().clone(), picked.into_iter().cloned().collect()),
    };
    Ok(Collection::new(index, picked, c.metadata().clone())?)
}

fn source_columns(c: &Collection) -> Vec<String> {
    c.column_names().into_iter().map(str::to_string).collect()
}

// ============ Select ============

pub struct Select;

static SELECT_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("columns", "List<Text>", "Columns to keep (all when omitted)", "None"),
    ArgMeta::optional("indices", "List<Integer>", "Row positions to keep (all when omitted)", "None"),
];

static SELECT_EXAMPLES: [&str; 2] = [
    "select(columns=[\"load\"]) → only the load column",
    "select(indices=[0, 2]) → first and third rows",
];

impl Operation for Select {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "select",
            description: "Keep the given columns and row positions",
            args: &SELECT_ARGS,
            returns: ReturnShape::Collection,
            examples: &SELECT_EXAMPLES,
            category: "select",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let columns = bound.opt_text_list("columns")?;
        let rows = match bound.opt_integer_list("indices")? {
            Some(indices) => Some(
                indices
                    .into_iter()
                    .map(|i| {
                        usize::try_from(i)
                            .map_err(|_| TascError::invalid_argument(format!("negative row index {}", i)))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        let mut out = project(collection, columns.as_deref(), rows.as_deref())?;
        record_operation(&mut out, "select", source_columns(collection));
        Ok(out.into())
    }
}

// ============ Select by step ============

pub struct SelectStep;

static SELECT_STEP_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("steps", "List<Number>", "Index labels to keep"),
    ArgMeta::optional("columns", "List<Text>", "Columns to keep (all when omitted)", "None"),
];

static SELECT_STEP_EXAMPLES: [&str; 1] =
    ["select_step([1, 3, 99]) → rows labelled 1 and 3; 99 recorded under missing_steps"];

impl Operation for SelectStep {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "select_step",
            description: "Keep rows by index label; unknown labels are recorded, not errors",
            args: &SELECT_STEP_ARGS,
            returns: ReturnShape::Collection,
            examples: &SELECT_STEP_EXAMPLES,
            category: "select",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let steps = bound
            .opt_value_list("steps")
            .ok_or_else(|| TascError::missing_arg("select_step", "steps"))?;
        let columns = bound.opt_text_list("columns")?;

        let mut rows = Vec::new();
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for step in steps {
            match collection.index().position(&step) {
                Some(row) => {
                    rows.push(row);
                    found.push(step);
                }
                None => missing.push(step),
            }
        }

        if !missing.is_empty() {
            debug!(missing = missing.len(), found = found.len(), "select_step skipped unknown steps");
        }
        let mut out = project(collection, columns.as_deref(), Some(rows.as_slice()))?;
        record_operation(&mut out, "select_step", source_columns(collection));
        let metadata = out.metadata_mut();
        metadata.insert("selected_steps".to_string(), Value::List(found));
        metadata.insert("missing_steps".to_string(), Value::List(missing));
        Ok(out.into())
    }
}
