//! Reading and writing column positions

use crate::domain::{set_coordinates, CoordinateView, Coordinates};
use tasc_ops::prelude::*;

// ============ Set ============

pub struct SetColumnCoordinates;

static SET_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("column_name", "Text", "Column to position"),
    ArgMeta::optional("x", "Number", "X coordinate (unchanged when omitted)", "None"),
    ArgMeta::optional("y", "Number", "Y coordinate (unchanged when omitted)", "None"),
    ArgMeta::optional("z", "Number", "Z coordinate (unchanged when omitted)", "None"),
];

static SET_EXAMPLES: [&str; 1] = ["set_column_coordinates(\"gauge1\", 0.0, 150.0)"];

impl Operation for SetColumnCoordinates {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "set_column_coordinates",
            description: "Set the position of a column; omitted axes keep their value",
            args: &SET_ARGS,
            returns: ReturnShape::Collection,
            examples: &SET_EXAMPLES,
            category: "coordinates",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let column = bound.text("column_name")?;
        let position = Coordinates::new(bound.opt_number("x")?, bound.opt_number("y")?, bound.opt_number("z")?);
        let mut out = collection.clone();
        set_coordinates(&mut out, column, position)?;
        Ok(out.into())
    }
}

// ============ Get ============

pub struct GetColumnCoordinates;

static GET_ARGS: [ArgMeta; 1] = [ArgMeta::required("column_name", "Text", "Column to look up")];

static GET_EXAMPLES: [&str; 1] = ["get_column_coordinates(\"gauge1\") → {x: 0.0, y: 150.0, z: null}"];

impl Operation for GetColumnCoordinates {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "get_column_coordinates",
            description: "Position of a column as {x, y, z}",
            args: &GET_ARGS,
            returns: ReturnShape::Scalar("Object"),
            examples: &GET_EXAMPLES,
            category: "coordinates",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let bound = args.bind(&self.meta())?;
        let position = CoordinateView::of(collection).coordinates(bound.text("column_name")?)?;
        Ok(position.to_value().into())
    }
}

// ============ List ============

pub struct GetColumnsWithCoordinates;

static LIST_EXAMPLES: [&str; 1] = ["get_columns_with_coordinates() → [\"gauge1\", \"gauge2\"]"];

impl Operation for GetColumnsWithCoordinates {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "get_columns_with_coordinates",
            description: "Names of columns with at least one known axis",
            args: &[],
            returns: ReturnShape::Scalar("List<Text>"),
            examples: &LIST_EXAMPLES,
            category: "coordinates",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        args.bind(&self.meta())?;
        let names = CoordinateView::of(collection).columns_with_coordinates();
        Ok(Value::list(names).into())
    }
}

// ============ Extract ============

pub struct ExtractCoordinates;

static EXTRACT_ARGS: [ArgMeta; 1] =
    [ArgMeta::optional("result_prefix", "Text", "Prefix of the generated columns", "\"coord_\"")];

static EXTRACT_EXAMPLES: [&str; 1] =
    ["extract_coordinates() → columns \"coord_gauge1_x\", \"coord_gauge1_y\""];

impl Operation for ExtractCoordinates {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "extract_coordinates",
            description: "Add a constant column per known axis of every positioned column",
            args: &EXTRACT_ARGS,
            returns: ReturnShape::Collection,
            examples: &EXTRACT_EXAMPLES,
            category: "coordinates",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let prefix = args.bind(&self.meta())?.text_or("result_prefix", "coord_")?.to_string();
        let view = CoordinateView::of(collection);
        let rows = collection.row_count();

        let mut out = collection.clone();
        for name in view.columns_with_coordinates() {
            let position = view.coordinates(name)?;
            for (axis, value) in [("x", position.x), ("y", position.y), ("z", position.z)] {
                let Some(value) = value else { continue };
                let column = Column::new(format!("{}{}_{}", prefix, name, axis), vec![Value::from(value); rows])
                    .with_unit("m")
                    .with_metadata("description", format!("{} coordinate of {}", axis.to_uppercase(), name))
                    .with_metadata("type", "coordinate")
                    .with_metadata("component", axis);
                out.set_column(column)?;
            }
        }
        Ok(out.into())
    }
}
