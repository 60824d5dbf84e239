//! Registry, factory and proxy dispatch across the bundled toolkit

use proptest::prelude::*;
use std::sync::Arc;
use tasc::prelude::*;
use tasc::{standard_builder, CollectionExt, ToolkitConfig};

fn quiet_toolkit() -> Arc<Toolkit> {
    standard_builder()
        .with_config(ToolkitConfig::default().with_stub_generation(false))
        .init()
}

fn sample() -> Collection {
    Collection::from_columns([
        ("x", vec![Value::from(1.0), Value::from(-2.5), Value::Null, Value::from(4.0)]),
        ("y", vec![Value::from(0.5), Value::from(1.0), Value::from(1.5), Value::from(2.0)]),
    ])
    .unwrap()
}

// ============ Double ============

struct Double;

static DOUBLE_ARGS: [ArgMeta; 1] = [ArgMeta::required("column", "Text", "Column to double")];

impl Operation for Double {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "double",
            description: "Add <column>*2",
            args: &DOUBLE_ARGS,
            returns: ReturnShape::Collection,
            examples: &[],
            category: "test",
        }
    }

    fn call(&self, collection: &Collection, args: &Args) -> Result<Outcome, TascError> {
        let column = args.bind(&self.meta())?.text("column")?.to_string();
        let doubled = collection
            .column(&column)?
            .values
            .iter()
            .map(|v| v.as_number().map(|n| n * 2.0).into())
            .collect();
        let mut out = collection.clone();
        out.set_column(Column::new(format!("{}*2", column), doubled))?;
        Ok(out.into())
    }
}

#[test]
fn test_registered_operation_is_dispatched() {
    let toolkit = quiet_toolkit();
    let registered = toolkit.registry().register(Double, CORE_DOMAIN, &[]);

    let table = toolkit.registry().get_operations(CORE_DOMAIN);
    assert!(Arc::ptr_eq(&table["double"], &registered));

    let c = sample();
    let result = c.ops_with(&toolkit).call("double", args!["x"]).unwrap().end();
    let expected: Vec<Value> = c.column("x").unwrap().values.iter().map(|v| v.as_number().map(|n| 2.0 * n).into()).collect();
    assert_eq!(result.column("x*2").unwrap().values, expected);
}

#[test]
fn test_proxy_matches_direct_call() {
    let toolkit = quiet_toolkit();
    let c = sample();
    for (name, args) in [
        ("add", args!["x", "y"]),
        ("multiply", args!["y", 3.0; result_column = "y3"]),
        ("moving_average", args!["y"; window_size = 3]),
        ("filter_out_none", args![]),
    ] {
        let op = toolkit.registry().get_operation(CORE_DOMAIN, name).unwrap();
        let direct = op.call(&c, &args).unwrap().into_collection().unwrap();
        let chained = c.ops_with(&toolkit).call(name, args).unwrap().end();
        assert_eq!(chained, direct, "{}", name);
    }
}

#[test]
fn test_domain_operations_include_core() {
    let toolkit = quiet_toolkit();
    let ld = toolkit
        .create(
            "load_displacement",
            DomainParams::from_collection(sample())
                .with("load_column", "x")
                .with("displacement_column", "y"),
        )
        .unwrap();
    let proxy = ld.ops_with(&toolkit);
    assert_eq!(proxy.domain(), "load_displacement");
    assert!(proxy.has_operation("cycle_count"));
    assert!(proxy.has_operation("add"));
    assert!(!proxy.has_operation("calculate_distance"));
}

#[test]
fn test_unknown_operation_suggests_similar() {
    let err = sample().ops_with(&quiet_toolkit()).call("ad", args!["x", 1.0]).unwrap_err();
    assert_eq!(err.code, codes::UNKNOWN_OPERATION);
    assert!(err.suggestion.as_deref().unwrap_or("").contains("add"));
}

#[test]
fn test_errors_carry_operation_and_domain() {
    let err = sample().ops_with(&quiet_toolkit()).call("add", args!["missing", 1.0]).unwrap_err();
    assert_eq!(err.code, codes::UNKNOWN_COLUMN);
    let context = err.context.unwrap();
    assert_eq!(context.operation.as_deref(), Some("add"));
    assert_eq!(context.domain.as_deref(), Some(CORE_DOMAIN));
}

#[test]
fn test_widget_domain_is_empty_not_an_error() {
    let toolkit = quiet_toolkit();
    assert!(toolkit.registry().get_operations("widget").is_empty());
    assert!(toolkit.registry().is_initialized("widget"));
    assert!(!toolkit.registry().catalog_domains().contains(&"widget".to_string()));
}

#[test]
fn test_nonexistent_domain_is_a_naming_error() {
    let err = quiet_toolkit().create("nonexistent_domain", DomainParams::new()).unwrap_err();
    assert_eq!(err.code, codes::UNKNOWN_DOMAIN);
    assert!(err.to_string().contains("nonexistent_domain"));

    let err = sample().ops_with(&quiet_toolkit()).as_domain("nonexistent_domain", Params::new()).unwrap_err();
    assert_eq!(err.code, codes::UNKNOWN_DOMAIN);
}

#[test]
fn test_discovery_is_idempotent() {
    let toolkit = quiet_toolkit();
    let first = toolkit.registry().discover_domains();
    let before = toolkit.registry().get_all_operations();
    let second = toolkit.registry().discover_domains();
    let after = toolkit.registry().get_all_operations();

    assert_eq!(first, second);
    assert_eq!(first, vec!["coordinate", "core", "load_displacement"]);
    assert_eq!(before.len(), after.len());
    for (name, op) in &before {
        assert!(Arc::ptr_eq(op, &after[name]), "{} was rebound", name);
    }
}

proptest! {
    #[test]
    fn prop_repeated_lookup_keeps_bindings(domains in prop::collection::vec(
        prop::sample::select(vec!["core", "load_displacement", "coordinate", "widget"]), 1..12)
    ) {
        let toolkit = quiet_toolkit();
        let snapshot: Vec<_> = ["core", "load_displacement", "coordinate"]
            .iter()
            .map(|d| toolkit.registry().get_operations(d))
            .collect();
        for d in &domains {
            toolkit.registry().get_operations(d);
        }
        for (d, table) in ["core", "load_displacement", "coordinate"].iter().zip(&snapshot) {
            let now = toolkit.registry().get_operations(d);
            prop_assert_eq!(now.len(), table.len());
            for (name, op) in table {
                prop_assert!(Arc::ptr_eq(op, &now[name]));
            }
        }
    }
}

#[test]
fn test_typed_chain_on_shared_toolkit() {
    let result = sample()
        .ops()
        .add("x", Value::from("y"), Some("sum"))
        .unwrap()
        .round_values("sum", Some(1), None)
        .unwrap()
        .end();
    assert_eq!(
        result.column("round(sum, 1)").unwrap().numbers(),
        vec![Some(1.5), Some(-1.5), None, Some(6.0)]
    );
}

#[test]
fn test_operation_info() {
    let toolkit = quiet_toolkit();
    let info = toolkit.registry().get_operation_info("divide", None).unwrap();
    assert_eq!(info.domain, CORE_DOMAIN);
    assert!(info.parameters.iter().any(|p| p.name == "handle_zero_division" && !p.required));

    let info = toolkit.registry().get_operation_info("max_load", Some("load_displacement")).unwrap();
    assert_eq!(info.returns, "Number");
    assert_eq!(
        toolkit.registry().get_operation_info("max_load", Some("coordinate")).unwrap_err().code,
        codes::UNKNOWN_OPERATION
    );
}
