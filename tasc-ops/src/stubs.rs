//! Interface descriptions generated from registered operations
//!
//! Each domain becomes one `<Domain>Operations` trait listing its
//! operations as typed methods, plus a JSON description for tooling.
//! Generation only reads the registry and factory.

use crate::factory::DomainFactory;
use crate::registry::{OperationInfo, OperationRegistry};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tasc_core::{TascError, CORE_DOMAIN};

/// Description of one domain's interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStub {
    pub domain: String,
    pub trait_name: String,
    /// Whether the factory can construct this domain
    pub constructible: bool,
    pub operations: Vec<OperationInfo>,
}

impl DomainStub {
    pub fn to_json(&self) -> Result<String, TascError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rust trait source for this domain
    pub fn to_rust(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "//! Operations of the `{}` domain (generated)", self.domain);
        out.push('\n');
        out.push_str("use tasc_core::{TascError, Value};\n");
        out.push_str("use tasc_ops::{ListProxy, Proxy};\n");
        if self.domain != CORE_DOMAIN {
            let _ = writeln!(out, "use super::{}::{};", CORE_DOMAIN, trait_name(CORE_DOMAIN));
        }
        out.push('\n');

        if self.domain == CORE_DOMAIN {
            let _ = writeln!(out, "pub trait {} {{", self.trait_name);
        } else {
            let _ = writeln!(out, "pub trait {}: {} {{", self.trait_name, trait_name(CORE_DOMAIN));
        }
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_method(&mut out, op);
        }
        out.push_str("}\n");
        out
    }
}

fn render_method(out: &mut String, op: &OperationInfo) {
    for line in op.docstring.lines() {
        if line.is_empty() {
            out.push_str("    ///\n");
        } else {
            let _ = writeln!(out, "    /// {}", line);
        }
    }
    let defaults: Vec<String> = op
        .parameters
        .iter()
        .filter_map(|p| p.default.as_ref().map(|d| format!("`{}` = {}", p.name, d)))
        .collect();
    if !defaults.is_empty() {
        out.push_str("    ///\n");
        let _ = writeln!(out, "    /// Defaults: {}", defaults.join(", "));
    }

    let mut params = vec!["&self".to_string()];
    for p in &op.parameters {
        let typ = rust_type(&p.typ);
        let typ = if p.required { typ.to_string() } else { format!("Option<{}>", typ) };
        params.push(format!("{}: {}", rust_ident(&p.name), typ));
    }
    let _ = writeln!(
        out,
        "    fn {}({}) -> {};",
        rust_ident(&op.name),
        params.join(", "),
        rust_return(&op.returns)
    );
}

fn rust_type(typ: &str) -> &'static str {
    match typ {
        "Text" => "&str",
        "Number" => "f64",
        "Integer" => "i64",
        "Bool" => "bool",
        "List<Text>" => "&[&str]",
        "List<Number>" => "&[f64]",
        "List<Integer>" => "&[i64]",
        _ => "Value",
    }
}

fn rust_return(returns: &str) -> &'static str {
    match returns {
        "Collection" => "Result<Proxy, TascError>",
        "List<Collection>" => "Result<ListProxy, TascError>",
        _ => "Result<Value, TascError>",
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "const", "crate", "dyn", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while",
];

fn rust_ident(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// `load_displacement` → `LoadDisplacementOperations`
pub fn trait_name(domain: &str) -> String {
    let mut name: String = domain
        .split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    name.push_str("Operations");
    name
}

/// Reads a registry and factory to describe domains
pub struct StubGenerator<'a> {
    registry: &'a OperationRegistry,
    factory: &'a DomainFactory,
}

impl<'a> StubGenerator<'a> {
    pub fn new(registry: &'a OperationRegistry, factory: &'a DomainFactory) -> Self {
        Self { registry, factory }
    }

    /// Discovered and constructible domains, sorted
    pub fn domains(&self) -> Vec<String> {
        let mut domains: BTreeSet<String> = self.registry.domains().into_iter().collect();
        domains.extend(self.factory.available_domains());
        domains.into_iter().collect()
    }

    pub fn domain_stub(&self, domain: &str) -> Result<DomainStub, TascError> {
        let operations = self.registry.peek_operations(domain);
        let constructible = self.factory.contains(domain);
        if operations.is_none() && !constructible {
            return Err(TascError::stub_error(format!("unknown domain '{}'", domain)));
        }
        let operations = operations
            .unwrap_or_default()
            .values()
            .map(|op| OperationInfo::from_meta(&op.meta(), domain))
            .collect();
        Ok(DomainStub {
            domain: domain.to_string(),
            trait_name: trait_name(domain),
            constructible,
            operations,
        })
    }

    pub fn generate(&self) -> Result<Vec<DomainStub>, TascError> {
        self.domains().iter().map(|d| self.domain_stub(d)).collect()
    }
}

/// Write `<domain>.rs` and `<domain>.json` for every stub into `dir`
pub fn write_stubs(stubs: &[DomainStub], dir: &Path) -> Result<Vec<PathBuf>, TascError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| TascError::stub_error(format!("cannot create {}: {}", dir.display(), e)))?;
    let mut written = Vec::with_capacity(stubs.len() * 2);
    for stub in stubs {
        let rust_path = dir.join(format!("{}.rs", stub.domain));
        std::fs::write(&rust_path, stub.to_rust())?;
        written.push(rust_path);

        let json_path = dir.join(format!("{}.json", stub.domain));
        std::fs::write(&json_path, stub.to_json()?)?;
        written.push(json_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Args, ArgMeta, Operation, OperationMeta, Outcome, ReturnShape};
    use tasc_core::Collection;

    struct Scale;

    static SCALE_ARGS: [ArgMeta; 3] = [
        ArgMeta::required("column", "Text", "Column to scale"),
        ArgMeta::optional("factor", "Number", "Multiplier", "2.0"),
        ArgMeta::optional("columns", "List<Text>", "Extra columns", "None"),
    ];

    impl Operation for Scale {
        fn meta(&self) -> OperationMeta {
            OperationMeta {
                name: "scale",
                description: "Scale a column",
                args: &SCALE_ARGS,
                returns: ReturnShape::Collection,
                examples: &[],
                category: "test",
            }
        }

        fn call(&self, collection: &Collection, _args: &Args) -> Result<Outcome, TascError> {
            Ok(Outcome::Collection(collection.clone()))
        }
    }

    #[test]
    fn test_trait_name() {
        assert_eq!(trait_name("core"), "CoreOperations");
        assert_eq!(trait_name("load_displacement"), "LoadDisplacementOperations");
    }

    #[test]
    fn test_rust_rendering() {
        let registry = OperationRegistry::new();
        let factory = DomainFactory::new();
        registry.register(Scale, "lab", &[]);
        let stub = StubGenerator::new(&registry, &factory).domain_stub("lab").unwrap();
        let text = stub.to_rust();
        assert!(text.contains("pub trait LabOperations: CoreOperations {"));
        assert!(text.contains(
            "fn scale(&self, column: &str, factor: Option<f64>, columns: Option<&[&str]>) -> Result<Proxy, TascError>;"
        ));
        assert!(text.contains("/// Defaults: `factor` = 2.0, `columns` = None"));
        assert!(!stub.constructible);
    }

    #[test]
    fn test_generation_is_deterministic_and_read_only() {
        let registry = OperationRegistry::new();
        let factory = DomainFactory::new();
        registry.register(Scale, "core", &[]);
        let generator = StubGenerator::new(&registry, &factory);
        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert!(!registry.is_initialized("core"));
    }

    #[test]
    fn test_unknown_domain_is_an_error() {
        let registry = OperationRegistry::new();
        let factory = DomainFactory::new();
        let err = StubGenerator::new(&registry, &factory).domain_stub("ghost").unwrap_err();
        assert_eq!(err.code, tasc_core::codes::STUB_ERROR);
    }

    #[test]
    fn test_json_lists_parameters() {
        let registry = OperationRegistry::new();
        let factory = DomainFactory::new();
        registry.register(Scale, "core", &[]);
        let stub = StubGenerator::new(&registry, &factory).domain_stub("core").unwrap();
        let json: serde_json::Value = serde_json::from_str(&stub.to_json().unwrap()).unwrap();
        assert_eq!(json["trait_name"], "CoreOperations");
        assert_eq!(json["operations"][0]["parameters"][1]["default"], "2.0");
        assert_eq!(json["operations"][0]["parameters"][0]["required"], true);
    }

    #[test]
    fn test_write_stubs() {
        let registry = OperationRegistry::new();
        let factory = DomainFactory::new();
        registry.register(Scale, "core", &[]);
        let stubs = StubGenerator::new(&registry, &factory).generate().unwrap();
        let dir = std::env::temp_dir().join(format!("tasc-stubs-test-{}", std::process::id()));
        let written = write_stubs(&stubs, &dir).unwrap();
        assert_eq!(written.len(), 2);
        let text = std::fs::read_to_string(dir.join("core.rs")).unwrap();
        assert!(text.contains("pub trait CoreOperations {"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
