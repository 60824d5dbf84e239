//! Generated interfaces agree with the hand-written chaining trait

use std::sync::Arc;
use tasc::prelude::*;
use tasc::{standard_builder, ToolkitConfig};
use tasc_ops::{write_stubs, DomainStub};

const CHAIN_SOURCE: &str = include_str!("../../tasc-std/src/chain.rs");
const LOAD_DISPLACEMENT_CHAIN: &str = include_str!("../../tasc-load-displacement/src/chain.rs");
const COORDINATE_CHAIN: &str = include_str!("../../tasc-coordinate/src/chain.rs");

fn quiet_toolkit() -> Arc<Toolkit> {
    standard_builder()
        .with_config(ToolkitConfig::default().with_stub_generation(false))
        .init()
}

fn stub_for<'a>(stubs: &'a [DomainStub], domain: &str) -> &'a DomainStub {
    stubs.iter().find(|s| s.domain == domain).unwrap()
}

fn assert_trait_matches_stub(stub: &DomainStub, source: &str, trait_name: &str) {
    let rendered = stub.to_rust();
    let methods: Vec<&str> = rendered
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("fn "))
        .collect();
    assert_eq!(methods.len(), stub.operations.len());
    for method in methods {
        assert!(source.contains(method), "{} is missing `{}`", trait_name, method);
    }
}

#[test]
fn test_core_stub_matches_core_ops_trait() {
    let stubs = quiet_toolkit().generate_stubs().unwrap();
    let core = stub_for(&stubs, CORE_DOMAIN);
    assert_eq!(core.trait_name, "CoreOperations");
    assert_trait_matches_stub(core, CHAIN_SOURCE, "CoreOps");
}

#[test]
fn test_domain_stubs_match_domain_ops_traits() {
    let stubs = quiet_toolkit().generate_stubs().unwrap();
    assert_trait_matches_stub(
        stub_for(&stubs, "load_displacement"),
        LOAD_DISPLACEMENT_CHAIN,
        "LoadDisplacementOps",
    );
    assert_trait_matches_stub(stub_for(&stubs, "coordinate"), COORDINATE_CHAIN, "CoordinateOps");
}

#[test]
fn test_domain_traits_on_converted_proxy() {
    let collection = Collection::from_columns([
        ("load", vec![Value::from(1.0), Value::from(-1.0), Value::from(2.0)]),
        ("displacement", vec![Value::from(0.1), Value::from(-0.1), Value::from(0.2)]),
    ])
    .unwrap();
    let ld = Proxy::new(collection, quiet_toolkit())
        .as_domain("load_displacement", Params::new())
        .unwrap();
    assert_eq!(ld.max_load(None).unwrap(), Value::from(2.0));
    assert_eq!(ld.split_by_cycles(None).unwrap().len(), 2);
}

#[test]
fn test_domain_stubs_extend_core() {
    let stubs = quiet_toolkit().generate_stubs().unwrap();
    let domains: Vec<&str> = stubs.iter().map(|s| s.domain.as_str()).collect();
    assert_eq!(domains, vec!["coordinate", "core", "load_displacement"]);

    let ld = stub_for(&stubs, "load_displacement");
    assert!(ld.constructible);
    let rendered = ld.to_rust();
    assert!(rendered.contains("pub trait LoadDisplacementOperations: CoreOperations {"));
    assert!(rendered.contains("fn max_load(&self, absolute: Option<bool>) -> Result<Value, TascError>;"));
    assert!(rendered.contains("fn split_by_cycles("));
    assert!(!rendered.contains("fn add("));
}

#[test]
fn test_stub_json_describes_operations() {
    let stubs = quiet_toolkit().generate_stubs().unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&stub_for(&stubs, "coordinate").to_json().unwrap()).unwrap();
    assert_eq!(json["trait_name"], "CoordinateOperations");
    let names: Vec<&str> = json["operations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|op| op["name"].as_str())
        .collect();
    assert!(names.contains(&"calculate_distance"));
    assert!(names.contains(&"set_column_coordinates"));
}

#[test]
fn test_write_stubs_to_directory() {
    let dir = std::env::temp_dir().join(format!("tasc-stubs-{}", std::process::id()));
    let stubs = quiet_toolkit().generate_stubs().unwrap();
    let written = write_stubs(&stubs, &dir).unwrap();
    assert_eq!(written.len(), stubs.len() * 2);
    assert!(dir.join("core.rs").exists());
    assert!(std::fs::read_to_string(dir.join("load_displacement.json"))
        .unwrap()
        .contains("cycle_count"));
    std::fs::remove_dir_all(&dir).unwrap();
}
