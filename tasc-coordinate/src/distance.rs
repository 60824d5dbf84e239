//! Distances between positioned columns

use crate::domain::CoordinateView;
use tasc_ops::prelude::*;

// ============ Distance ============

pub struct CalculateDistance;

static DISTANCE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("column1", "Text", "First column"),
    ArgMeta::required("column2", "Text", "Second column"),
];

static DISTANCE_EXAMPLES: [&str; 1] = ["calculate_distance(\"gauge1\", \"gauge2\") → 150.0"];

impl Operation for CalculateDistance {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "calculate_distance",
            description: "Euclidean distance between two column positions (planar when a z is unknown)",
            args: &DISTANCE_ARGS,
            returns: ReturnShape::Scalar("Number"),
            examples: &DISTANCE_EXAMPLES,
            category: "distance",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let distance = CoordinateView::of(collection).distance(bound.text("column1")?, bound.text("column2")?)?;
        Ok(Value::from(distance).into())
    }
}

// ============ Distance Matrix ============

pub struct CalculateDistanceMatrix;

static MATRIX_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("columns", "List<Text>", "Columns to compare (all positioned columns when omitted)", "None"),
    ArgMeta::optional("result_column_prefix", "Text", "Prefix of the pairwise distance columns", "\"distance_\""),
];

static MATRIX_EXAMPLES: [&str; 1] =
    ["calculate_distance_matrix([\"g1\", \"g2\"]) → column \"distance_g1_to_g2\""];

impl Operation for CalculateDistanceMatrix {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "calculate_distance_matrix",
            description: "Pairwise distances as constant columns plus a matrix under analysis.distance_matrix",
            args: &MATRIX_ARGS,
            returns: ReturnShape::Collection,
            examples: &MATRIX_EXAMPLES,
            category: "distance",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let view = CoordinateView::of(collection);
        let columns = match bound.opt_text_list("columns")? {
            Some(columns) => columns,
            None => view.columns_with_coordinates().into_iter().map(str::to_string).collect(),
        };
        if columns.len() < 2 {
            return Err(TascError::empty_input("a distance matrix needs at least two columns")
                .in_operation("calculate_distance_matrix"));
        }
        let prefix = bound.text_or("result_column_prefix", "distance_")?;

        // Pairs without enough coordinates are left unknown
        let n = columns.len();
        let mut matrix = vec![vec![Value::from(0.0); n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = match view.distance(&columns[i], &columns[j]) {
                    Ok(d) => Value::from(d),
                    Err(e) if e.is(codes::INVALID_ARGUMENT) => Value::Null,
                    Err(e) => return Err(e),
                };
                matrix[i][j] = d.clone();
                matrix[j][i] = d;
            }
        }

        let rows = collection.row_count();
        let mut out = collection.clone();
        for i in 0..n {
            for j in i + 1..n {
                let name = format!("{}{}_to_{}", prefix, columns[i], columns[j]);
                let column = Column::new(name, vec![matrix[i][j].clone(); rows])
                    .with_unit("m")
                    .with_metadata("description", format!("Distance between {} and {}", columns[i], columns[j]))
                    .with_metadata("type", "coordinate_distance")
                    .with_metadata("source_columns", Value::list([columns[i].as_str(), columns[j].as_str()]));
                out.set_column(column)?;
            }
        }

        let record = Value::object([
            ("columns", Value::list(columns.iter().map(String::as_str))),
            ("matrix", Value::list(matrix.into_iter().map(Value::List))),
        ]);
        let analysis = out
            .metadata_mut()
            .entry(keys::ANALYSIS.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        match analysis.as_object_mut() {
            Some(map) => {
                map.insert("distance_matrix".to_string(), record);
            }
            None => *analysis = Value::object([("distance_matrix", record)]),
        }
        Ok(out.into())
    }
}
