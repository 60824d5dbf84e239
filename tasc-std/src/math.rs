//! Arithmetic between columns or between a column and a constant

use tasc_ops::prelude::*;
use crate::helpers::{numeric_column, with_result};

/// Right-hand side of a binary operation
enum Operand {
    Column(String, Vec<Option<f64>>),
    Constant(f64),
}

impl Operand {
    fn bind(c: &Collection, bound: &BoundArgs) -> Result<Self, TascError> {
        match bound.value("column2_or_value")? {
            Value::Text(name) => Ok(Operand::Column(name.clone(), numeric_column(c, name, bound.op())?)),
            Value::Number(n) => Ok(Operand::Constant(*n)),
            other => Err(TascError::arg_type(
                bound.op(),
                "column2_or_value",
                "Text | Number",
                other.type_name(),
            )),
        }
    }

    fn label(&self) -> String {
        match self {
            Operand::Column(name, _) => name.clone(),
            Operand::Constant(n) => Value::Number(*n).to_string(),
        }
    }

    fn at(&self, row: usize) -> Option<f64> {
        match self {
            Operand::Column(_, values) => values[row],
            Operand::Constant(n) => Some(*n),
        }
    }
}

/// Shared body of the four arithmetic operations.
///
/// `f` receives both present operands; returning `Err` aborts the call.
fn binary<F>(
    c: &Collection,
    args: &Args,
    meta: &OperationMeta,
    symbol: &str,
    f: F,
) -> Result<Outcome, TascError>
where
    F: Fn(f64, f64) -> Result<Option<f64>, TascError>,
{
    let bound = args.bind(meta)?;
    let column1 = bound.text("column1")?;
    let left = numeric_column(c, column1, meta.name)?;
    let right = Operand::bind(c, &bound)?;

    let name = match bound.opt_text("result_column")? {
        Some(name) => name.to_string(),
        None => format!("{}{}{}", column1, symbol, right.label()),
    };

    let mut values = Vec::with_capacity(left.len());
    for (row, l) in left.iter().enumerate() {
        let value = match (l, right.at(row)) {
            (Some(a), Some(b)) => f(*a, b)?,
            _ => None,
        };
        values.push(value);
    }

    Ok(with_result(c, column1, &name, values)?.into())
}

static BINARY_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("column1", "Text", "Left-hand column"),
    ArgMeta::required("column2_or_value", "Text | Number", "Right-hand column name or constant"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
];

// ============ Add ============

pub struct Add;

static ADD_EXAMPLES: [&str; 2] = [
    "add(\"load1\", \"load2\") → column \"load1+load2\"",
    "add(\"load1\", 10) → column \"load1+10\"",
];

impl Operation for Add {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "add",
            description: "Add a column or a constant to a column",
            args: &BINARY_ARGS,
            returns: ReturnShape::Collection,
            examples: &ADD_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        binary(collection, args, &self.meta(), "+", |a, b| Ok(Some(a + b)))
    }
}

// ============ Subtract ============

pub struct Subtract;

static SUBTRACT_EXAMPLES: [&str; 1] = ["subtract(\"load1\", \"load2\") → column \"load1-load2\""];

impl Operation for Subtract {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "subtract",
            description: "Subtract a column or a constant from a column",
            args: &BINARY_ARGS,
            returns: ReturnShape::Collection,
            examples: &SUBTRACT_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        binary(collection, args, &self.meta(), "-", |a, b| Ok(Some(a - b)))
    }
}

// ============ Multiply ============

pub struct Multiply;

static MULTIPLY_EXAMPLES: [&str; 1] = ["multiply(\"load1\", 2) → column \"load1*2\""];

impl Operation for Multiply {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "multiply",
            description: "Multiply a column by a column or a constant",
            args: &BINARY_ARGS,
            returns: ReturnShape::Collection,
            examples: &MULTIPLY_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        binary(collection, args, &self.meta(), "*", |a, b| Ok(Some(a * b)))
    }
}

// ============ Divide ============

pub struct Divide;

static DIVIDE_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("column1", "Text", "Numerator column"),
    ArgMeta::required("column2_or_value", "Text | Number", "Denominator column name or constant"),
    ArgMeta::optional("result_column", "Text", "Output column name", "None"),
    ArgMeta::optional(
        "handle_zero_division",
        "Text",
        "On zero denominator: \"error\", \"none\" (missing) or \"inf\"",
        "\"error\"",
    ),
];

static DIVIDE_EXAMPLES: [&str; 2] = [
    "divide(\"stress\", \"area\") → column \"stress/area\"",
    "divide(\"load\", 0, handle_zero_division=\"none\") → missing values",
];

#[derive(Clone, Copy)]
enum ZeroDivision {
    Error,
    Missing,
    Infinite,
}

impl ZeroDivision {
    fn parse(s: &str) -> Result<Self, TascError> {
        match s {
            "error" => Ok(ZeroDivision::Error),
            "none" => Ok(ZeroDivision::Missing),
            "inf" => Ok(ZeroDivision::Infinite),
            other => Err(TascError::invalid_argument(format!(
                "handle_zero_division must be one of error, none, inf (got '{}')",
                other
            ))),
        }
    }
}

impl Operation for Divide {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "divide",
            description: "Divide a column by a column or a constant",
            args: &DIVIDE_ARGS,
            returns: ReturnShape::Collection,
            examples: &DIVIDE_EXAMPLES,
            category: "math",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let meta = self.meta();
        let mode = ZeroDivision::parse(args.bind(&meta)?.text_or("handle_zero_division", "error")?)?;
        binary(collection, args, &meta, "/", move |a, b| {
            if b != 0.0 {
                return Ok(Some(a / b));
            }
            match mode {
                ZeroDivision::Error => Err(TascError::div_zero()),
                ZeroDivision::Missing => Ok(None),
                ZeroDivision::Infinite if a == 0.0 => Ok(None),
                ZeroDivision::Infinite => Ok(Some(f64::INFINITY.copysign(a))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasc_ops::args;

    fn sample() -> Collection {
        Collection::from_columns([
            ("a", vec![Value::from(1.0), Value::from(4.0), Value::Null]),
            ("b", vec![Value::from(2.0), Value::from(0.0), Value::from(1.0)]),
        ])
        .unwrap()
    }

    fn run(op: &dyn Operation, args: Args) -> Result<Collection, TascError> {
        op.call(&sample(), &args)?.into_collection()
    }

    #[test]
    fn test_add_columns() {
        let out = run(&Add, args!["a", "b"]).unwrap();
        assert_eq!(out.column("a+b").unwrap().numbers(), vec![Some(3.0), Some(4.0), None]);
    }

    #[test]
    fn test_subtract_constant_name() {
        let out = run(&Subtract, args!["a", 1.5]).unwrap();
        assert_eq!(out.column("a-1.5").unwrap().numbers(), vec![Some(-0.5), Some(2.5), None]);
        let out = run(&Multiply, args!["a", 2.0]).unwrap();
        assert!(out.has_column("a*2"));
    }

    #[test]
    fn test_result_column_overwrites() {
        let out = run(&Multiply, args!["a", 10.0; result_column = "a"]).unwrap();
        assert_eq!(out.column_names(), vec!["a", "b"]);
        assert_eq!(out.column("a").unwrap().numbers(), vec![Some(10.0), Some(40.0), None]);
    }

    #[test]
    fn test_divide_zero_modes() {
        let err = run(&Divide, args!["a", "b"]).unwrap_err();
        assert_eq!(err.code, codes::DIV_ZERO);

        let out = run(&Divide, args!["a", "b"; handle_zero_division = "none"]).unwrap();
        assert_eq!(out.column("a/b").unwrap().numbers(), vec![Some(0.5), None, None]);

        let out = run(&Divide, args!["a", "b"; handle_zero_division = "inf"]).unwrap();
        assert_eq!(out.column("a/b").unwrap().numbers()[1], Some(f64::INFINITY));

        let err = run(&Divide, args!["a", "b"; handle_zero_division = "nan"]).unwrap_err();
        assert_eq!(err.code, codes::INVALID_ARGUMENT);
    }

    #[test]
    fn test_unknown_columns() {
        assert_eq!(run(&Add, args!["zz", 1.0]).unwrap_err().code, codes::UNKNOWN_COLUMN);
        assert_eq!(run(&Add, args!["a", "zz"]).unwrap_err().code, codes::UNKNOWN_COLUMN);
        assert_eq!(run(&Add, args!["a", true]).unwrap_err().code, codes::ARG_TYPE);
    }
}
