//! Typed chaining for the load-displacement operations
//!
//! Signatures follow the generated `LoadDisplacementOperations` interface.

use tasc_ops::prelude::*;
use tasc_std::CoreOps;

/// Load-displacement operations as methods
pub trait LoadDisplacementOps: CoreOps {
    fn cycle_count(&self, column: Option<&str>, step: Option<f64>, result_column: Option<&str>) -> Result<Proxy, TascError>;
    fn split_by_cycles(&self, cycle_column: Option<&str>) -> Result<ListProxy, TascError>;

    fn calculate_slopes(&self, result_column: Option<&str>, x_column: Option<&str>, y_column: Option<&str>) -> Result<Proxy, TascError>;
    fn max_load(&self, absolute: Option<bool>) -> Result<Value, TascError>;
    fn calculate_stiffness(&self, range_start: Option<f64>, range_end: Option<f64>, method: Option<&str>) -> Result<Value, TascError>;

    fn create_skeleton_curve(&self, has_decrease: Option<bool>, decrease_type: Option<&str>, cycle_column: Option<&str>, curve_name: Option<&str>) -> Result<Proxy, TascError>;
    fn create_cumulative_curve(&self, cycle_column: Option<&str>, curve_name: Option<&str>) -> Result<Proxy, TascError>;
    fn get_curve(&self, curve_name: &str) -> Result<Value, TascError>;
}

impl LoadDisplacementOps for Proxy {
    fn cycle_count(&self, column: Option<&str>, step: Option<f64>, result_column: Option<&str>) -> Result<Proxy, TascError> {
        self.call("cycle_count", args![column, step, result_column])
    }

    fn split_by_cycles(&self, cycle_column: Option<&str>) -> Result<ListProxy, TascError> {
        self.split("split_by_cycles", args![cycle_column])
    }

    fn calculate_slopes(
        &self,
        result_column: Option<&str>,
        x_column: Option<&str>,
        y_column: Option<&str>,
    ) -> Result<Proxy, TascError> {
        self.call("calculate_slopes", args![result_column, x_column, y_column])
    }

    fn max_load(&self, absolute: Option<bool>) -> Result<Value, TascError> {
        self.value("max_load", args![absolute])
    }

    fn calculate_stiffness(
        &self,
        range_start: Option<f64>,
        range_end: Option<f64>,
        method: Option<&str>,
    ) -> Result<Value, TascError> {
        self.value("calculate_stiffness", args![range_start, range_end, method])
    }

    fn create_skeleton_curve(
        &self,
        has_decrease: Option<bool>,
        decrease_type: Option<&str>,
        cycle_column: Option<&str>,
        curve_name: Option<&str>,
    ) -> Result<Proxy, TascError> {
        self.call("create_skeleton_curve", args![has_decrease, decrease_type, cycle_column, curve_name])
    }

    fn create_cumulative_curve(&self, cycle_column: Option<&str>, curve_name: Option<&str>) -> Result<Proxy, TascError> {
        self.call("create_cumulative_curve", args![cycle_column, curve_name])
    }

    fn get_curve(&self, curve_name: &str) -> Result<Value, TascError> {
        self.value("get_curve", args![curve_name])
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
        let values = |xs: [f64; 6]| xs.map(Value::from).to_vec();
        let collection = Collection::from_columns([
            ("load", values([0.0, 5.0, -5.0, 10.0, -10.0, 15.0])),
            ("displacement", values([0.0, 0.5, -0.5, 1.0, -1.0, 1.5])),
        ])
        .unwrap();
        let collection = crate::construct(tasc_ops::DomainParams::from_collection(collection)).unwrap();
        Proxy::with_domain(collection, DOMAIN, toolkit)
    }

    #[test]
    fn test_typed_domain_chain() {
        let p = proxy();
        assert_eq!(p.max_load(None).unwrap(), Value::from(15.0));
        let groups = p.cycle_count(None, None, Some("cycle")).unwrap().split_by_cycles(Some("cycle")).unwrap();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_typed_curve_chain() {
        let p = proxy();
        let curve = p
            .create_skeleton_curve(None, None, None, Some("envelope"))
            .unwrap()
            .get_curve("envelope")
            .unwrap();
        assert_eq!(curve.get("load"), Some(&Value::list([5.0, 10.0, 15.0])));
        assert_eq!(p.get_curve("envelope").unwrap_err().code, codes::MISSING_KEY);
    }

    #[test]
    fn test_core_methods_still_available() {
        let doubled = proxy().multiply("load", Value::from(2.0), Some("twice")).unwrap();
        assert_eq!(doubled.max_load(None).unwrap(), Value::from(15.0));
        assert!(doubled.end().has_column("twice"));
    }
}
