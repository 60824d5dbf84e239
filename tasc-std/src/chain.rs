//! Typed chaining for the core operations
//!
//! `CoreOps` gives every core operation a method on [`Proxy`], so chains
//! read `proxy.add("a", "b".into(), None)?.moving_average("a+b", Some(5), None, None)?`
//! instead of spelling operation names. Signatures follow the generated
//! `CoreOperations` interface: required parameters by value, optional ones
//! as `Option`.

use tasc_ops::prelude::*;

fn texts(values: Option<&[&str]>) -> Value {
    values.map_or(Value::Null, |xs| Value::list(xs.iter().copied()))
}

fn integers(values: Option<&[i64]>) -> Value {
    values.map_or(Value::Null, |xs| Value::list(xs.iter().copied()))
}

/// Core operations as methods
pub trait CoreOps {
    fn add(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn subtract(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn multiply(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn divide(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>, handle_zero_division: Option<&str>) -> Result<Proxy, TascError>;

    fn sin(&self, column: &str, result_column: Option<&str>, degrees: Option<bool>) -> Result<Proxy, TascError>;
    fn cos(&self, column: &str, result_column: Option<&str>, degrees: Option<bool>) -> Result<Proxy, TascError>;
    fn abs_values(&self, column: &str, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn round_values(&self, column: &str, decimals: Option<i64>, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn normalize(&self, column: &str, result_column: Option<&str>, method: Option<&str>) -> Result<Proxy, TascError>;

    fn select(&self, columns: Option<&[&str]>, indices: Option<&[i64]>) -> Result<Proxy, TascError>;
    fn select_step(&self, steps: &[f64], columns: Option<&[&str]>) -> Result<Proxy, TascError>;
    fn filter_by_value(&self, column_name: &str, value: Value, tolerance: Option<f64>) -> Result<Proxy, TascError>;
    fn filter_out_none(&self, columns: Option<&[&str]>, mode: Option<&str>) -> Result<Proxy, TascError>;
    fn search_by_range(&self, column_name: &str, min_value: Value, max_value: Value, inclusive: Option<bool>) -> Result<Proxy, TascError>;
    fn split_by_integers(&self, markers: &[i64]) -> Result<ListProxy, TascError>;

    fn moving_average(&self, column: &str, window_size: Option<i64>, result_column: Option<&str>, edge_handling: Option<&str>) -> Result<Proxy, TascError>;
    fn describe(&self, columns: Option<&[&str]>) -> Result<Value, TascError>;
    fn sum_columns(&self, columns: Option<&[&str]>, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn average_columns(&self, columns: Option<&[&str]>, result_column: Option<&str>) -> Result<Proxy, TascError>;
}

impl CoreOps for Proxy {
    fn add(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("add", args![column1, column2_or_value, result_column])
    }

    fn subtract(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("subtract", args![column1, column2_or_value, result_column])
    }

    fn multiply(&self, column1: &str, column2_or_value: Value, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("multiply", args![column1, column2_or_value, result_column])
    }

    fn divide(
        &self,
        column1: &str,
        column2_or_value: Value,
        result_column: Option<&str>,
        handle_zero_division: Option<&str>,
    ) -> Result<Proxy, TascError> {
        self.call("divide", args![column1, column2_or_value, result_column, handle_zero_division])
    }

    fn sin(&self, column: &str, result_column: Option<&str>, degrees: Option<bool>) -> Result<Proxy, TascError> {
        self.call("sin", args![column, result_column, degrees])
    }

    fn cos(&self, column: &str, result_column: Option<&str>, degrees: Option<bool>) -> Result<Proxy, TascError> {
        self.call("cos", args![column, result_column, degrees])
    }

    fn abs_values(&self, column: &str, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("abs_values", args![column, result_column])
    }

    fn round_values(&self, column: &str, decimals: Option<i64>, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("round_values", args![column, decimals, result_column])
    }

    fn normalize(&self, column: &str, result_column: Option<&str>, method: Option<&str>) -> Result<Proxy, TascError> {
        self.call("normalize", args![column, result_column, method])
    }

    fn select(&self, columns: Option<&[&str]>, indices: Option<&[i64]>) -> Result<Proxy, TascError> {
        self.call("select", args![texts(columns), integers(indices)])
    }

    fn select_step(&self, steps: &[f64], columns: Option<&[&str]>) -> Result<Proxy, TascError> {
        self.call("select_step", args![Value::list(steps.iter().copied()), texts(columns)])
    }

    fn filter_by_value(&self, column_name: &str, value: Value, tolerance: Option<f64>) -> Result<Proxy, TascError> {
        self.call("filter_by_value", args![column_name, value, tolerance])
    }

    fn filter_out_none(&self, columns: Option<&[&str]>, mode: Option<&str>) -> Result<Proxy, TascError> {
        self.call("filter_out_none", args![texts(columns), mode])
    }

    fn search_by_range(
        &self,
        column_name: &str,
        min_value: Value,
        max_value: Value,
        inclusive: Option<bool>,
    ) -> Result<Proxy, TascError> {
        self.call("search_by_range", args![column_name, min_value, max_value, inclusive])
    }

    fn split_by_integers(&self, markers: &[i64]) -> Result<ListProxy, TascError> {
        self.split("split_by_integers", args![integers(Some(markers))])
    }

    fn moving_average(
        &self,
        column: &str,
        window_size: Option<i64>,
        result_column: Option<&str>,
        edge_handling: Option<&str>,
    ) -> Result<Proxy, TascError> {
        self.call("moving_average", args![column, window_size, result_column, edge_handling])
    }

    fn describe(&self, columns: Option<&[&str]>) -> Result<Value, TascError> {
        self.value("describe", args![texts(columns)])
    }

    fn sum_columns(&self, columns: Option<&[&str]>, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("sum_columns", args![texts(columns), result_column])
    }

    fn average_columns(&self, columns: Option<&[&str]>, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("average_columns", args![texts(columns), result_column])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> Proxy {
        let toolkit = Toolkit::builder()
            .with_config(tasc_ops::ToolkitConfig::default().with_stub_generation(false))
            .with_package(crate::package())
            .init();
        let collection = Collection::from_columns([
            ("load", vec![Value::from(1.0), Value::from(2.0), Value::from(3.0), Value::from(4.0)]),
            ("disp", vec![Value::from(0.5), Value::Null, Value::from(1.5), Value::from(2.0)]),
        ])
        .unwrap();
        Proxy::new(collection, toolkit)
    }

    #[test]
    fn test_typed_chain() {
        let result = proxy()
            .multiply("load", Value::from(2.0), Some("twice"))
            .unwrap()
            .filter_out_none(Some(&["disp"]), None)
            .unwrap()
            .end();
        assert_eq!(result.column("twice").unwrap().numbers(), vec![Some(2.0), Some(6.0), Some(8.0)]);
    }

    #[test]
    fn test_split_and_describe() {
        let p = proxy();
        let groups = p.split_by_integers(&[1, 1, 2, 2]).unwrap();
        assert_eq!(groups.len(), 2);
        let summary = p.describe(Some(&["load"])).unwrap();
        assert_eq!(summary.get("load").and_then(|s| s.get("max")), Some(&Value::from(4.0)));
    }

    #[test]
    fn test_select_step_typed() {
        let selected = proxy().select_step(&[2.0, 4.0], None).unwrap().end();
        assert_eq!(selected.column("load").unwrap().numbers(), vec![Some(2.0), Some(4.0)]);
    }
}
