//! Typed chaining for the coordinate operations

use tasc_ops::prelude::*;
use tasc_std::CoreOps;

fn texts(values: Option<&[&str]>) -> Value {
    values.map_or(Value::Null, |xs| Value::list(xs.iter().copied()))
}

/// Coordinate operations as methods
pub trait CoordinateOps: CoreOps {
    fn set_column_coordinates(&self, column_name: &str, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Result<Proxy, TascError>;
    fn get_column_coordinates(&self, column_name: &str) -> Result<Value, TascError>;
    fn get_columns_with_coordinates(&self) -> Result<Value, TascError>;
    fn extract_coordinates(&self, result_prefix: Option<&str>) -> Result<Proxy, TascError>;

    fn calculate_distance(&self, column1: &str, column2: &str) -> Result<Value, TascError>;
    fn calculate_distance_matrix(&self, columns: Option<&[&str]>, result_column_prefix: Option<&str>) -> Result<Proxy, TascError>;
}

impl CoordinateOps for Proxy {
    fn set_column_coordinates(
        &self,
        column_name: &str,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    ) -> Result<Proxy, TascError> {
        self.call("set_column_coordinates", args![column_name, x, y, z])
    }

    fn get_column_coordinates(&self, column_name: &str) -> Result<Value, TascError> {
        self.value("get_column_coordinates", args![column_name])
    }

    fn get_columns_with_coordinates(&self) -> Result<Value, TascError> {
        self.value("get_columns_with_coordinates", args![])
    }

    fn extract_coordinates(&self, result_prefix: Option<&str>) -> Result<Proxy, TascError> {
        self.call("extract_coordinates", args![result_prefix])
    }

    fn calculate_distance(&self, column1: &str, column2: &str) -> Result<Value, TascError> {
        self.value("calculate_distance", args![column1, column2])
    }

    fn calculate_distance_matrix(
        &self,
        columns: Option<&[&str]>,
        result_column_prefix: Option<&str>,
    ) -> Result<Proxy, TascError> {
        self.call("calculate_distance_matrix", args![texts(columns), result_column_prefix])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DOMAIN;

    fn proxy() -> Proxy {
        let toolkit = Toolkit::builder()
            .with_config(tasc_ops::ToolkitConfig::default().with_stub_generation(false))
            .with_package(tasc_std::package())
            .with_package(crate::package())
            .init();
        let collection = Collection::from_columns([
            ("g1", vec![Value::from(1.0), Value::from(2.0)]),
            ("g2", vec![Value::from(3.0), Value::from(4.0)]),
        ])
        .unwrap();
        let collection = crate::construct(tasc_ops::DomainParams::from_collection(collection)).unwrap();
        Proxy::with_domain(collection, DOMAIN, toolkit)
    }

    #[test]
    fn test_typed_coordinate_chain() {
        let placed = proxy()
            .set_column_coordinates("g1", Some(0.0), Some(0.0), None)
            .unwrap()
            .set_column_coordinates("g2", Some(3.0), Some(4.0), None)
            .unwrap();
        assert_eq!(placed.calculate_distance("g1", "g2").unwrap(), Value::from(5.0));
        assert_eq!(placed.get_columns_with_coordinates().unwrap(), Value::list(["g1", "g2"]));
        assert_eq!(
            placed.get_column_coordinates("g2").unwrap().get("y"),
            Some(&Value::from(4.0))
        );

        let matrix = placed.calculate_distance_matrix(Some(&["g1", "g2"]), None).unwrap().end();
        assert_eq!(matrix.column_names().len(), 3);
    }
}
