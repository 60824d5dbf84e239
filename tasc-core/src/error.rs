//! Structured errors
//!
//! Every failure carries a machine-readable code, a human-readable message
//! and, where one exists, a suggestion for fixing the call. Operation chains
//! stop at the first error.

use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";
    pub const UNKNOWN_DOMAIN: &str = "UNKNOWN_DOMAIN";
    pub const UNKNOWN_COLUMN: &str = "UNKNOWN_COLUMN";
    pub const MISSING_KEY: &str = "MISSING_KEY";
    pub const DUPLICATE_COLUMN: &str = "DUPLICATE_COLUMN";
    pub const LENGTH_MISMATCH: &str = "LENGTH_MISMATCH";
    pub const INDEX_OUT_OF_RANGE: &str = "INDEX_OUT_OF_RANGE";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const MISSING_ARG: &str = "MISSING_ARG";
    pub const UNKNOWN_ARG: &str = "UNKNOWN_ARG";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const EMPTY_INPUT: &str = "EMPTY_INPUT";
    pub const INFERENCE_FAILED: &str = "INFERENCE_FAILED";
    pub const DISCOVERY_FAILED: &str = "DISCOVERY_FAILED";
    pub const STUB_ERROR: &str = "STUB_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Broad class of an error, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// A name (operation, domain, column, key) was not found
    Lookup,
    /// Inputs violate an operation's or container's requirements
    Precondition,
    /// A module failed while loading; its siblings were still registered
    Recoverable,
    /// Interface generation or filesystem failure outside the data path
    Tooling,
}

impl ErrorCategory {
    fn for_code(code: &str) -> Self {
        match code {
            codes::UNKNOWN_OPERATION
            | codes::UNKNOWN_DOMAIN
            | codes::UNKNOWN_COLUMN
            | codes::MISSING_KEY
            | codes::INDEX_OUT_OF_RANGE => ErrorCategory::Lookup,
            codes::DISCOVERY_FAILED => ErrorCategory::Recoverable,
            codes::STUB_ERROR | codes::IO_ERROR | codes::INTERNAL => ErrorCategory::Tooling,
            _ => ErrorCategory::Precondition,
        }
    }
}

/// Where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Operation that was running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Domain the operation was dispatched in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured toolkit error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TascError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    pub category: ErrorCategory,
}

impl TascError {
    /// Create a new error; the category follows from the code
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let category = ErrorCategory::for_code(&code);
        Self {
            code,
            message: message.into(),
            suggestion: None,
            context: None,
            category,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: record the operation that failed (first one wins)
    pub fn in_operation(mut self, operation: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        if ctx.operation.is_none() {
            ctx.operation = Some(operation.into());
        }
        self
    }

    /// Builder: record the domain of the failing call
    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        if ctx.domain.is_none() {
            ctx.domain = Some(domain.into());
        }
        self
    }

    /// Builder: override the category
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    // ========== Common Error Constructors ==========

    pub fn unknown_operation(name: &str, domain: &str) -> Self {
        Self::new(
            codes::UNKNOWN_OPERATION,
            format!("Unknown operation '{}' in domain '{}'", name, domain),
        )
        .with_suggestion("Use list_available_operations() to see what the domain provides")
    }

    pub fn unknown_domain(domain: &str) -> Self {
        Self::new(codes::UNKNOWN_DOMAIN, format!("Unknown domain: '{}'", domain))
            .with_suggestion("Register a constructor for the domain or check spelling")
    }

    pub fn unknown_column(name: &str) -> Self {
        Self::new(codes::UNKNOWN_COLUMN, format!("Column '{}' does not exist", name))
            .with_suggestion("Check column_names() for the available columns")
    }

    pub fn missing_key(key: &str) -> Self {
        Self::new(codes::MISSING_KEY, format!("Missing key: '{}'", key))
    }

    pub fn duplicate_column(name: &str) -> Self {
        Self::new(codes::DUPLICATE_COLUMN, format!("Column '{}' already exists", name))
            .with_suggestion("Remove the existing column first or choose another name")
    }

    pub fn length_mismatch(what: &str, expected: usize, got: usize) -> Self {
        Self::new(
            codes::LENGTH_MISMATCH,
            format!("{}: expected length {}, got {}", what, expected, got),
        )
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::new(
            codes::INDEX_OUT_OF_RANGE,
            format!("Index {} out of range for length {}", index, len),
        )
    }

    pub fn arg_count(op: &str, max: usize, got: usize) -> Self {
        Self::new(
            codes::ARG_COUNT,
            format!("{}() takes at most {} arguments, got {}", op, max, got),
        )
        .with_suggestion(format!("Use get_operation_info('{}') for usage", op))
    }

    pub fn arg_type(op: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(
            codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", op, arg, expected, got),
        )
    }

    pub fn missing_arg(op: &str, arg: &str) -> Self {
        Self::new(
            codes::MISSING_ARG,
            format!("{}() missing required argument '{}'", op, arg),
        )
    }

    pub fn unknown_arg(op: &str, arg: &str) -> Self {
        Self::new(
            codes::UNKNOWN_ARG,
            format!("{}() got an unexpected argument '{}'", op, arg),
        )
        .with_suggestion(format!("Use get_operation_info('{}') for usage", op))
    }

    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_ARGUMENT, format!("Invalid argument: {}", details.into()))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn div_zero() -> Self {
        Self::new(codes::DIV_ZERO, "Division by zero")
            .with_suggestion("Pass handle_zero_division='none' or 'inf' to keep going")
    }

    pub fn empty_input(details: impl Into<String>) -> Self {
        Self::new(codes::EMPTY_INPUT, details.into())
    }

    pub fn inference_failed(details: impl Into<String>) -> Self {
        Self::new(codes::INFERENCE_FAILED, details.into())
    }

    pub fn discovery_failed(domain: &str, module: &str, details: impl Into<String>) -> Self {
        Self::new(
            codes::DISCOVERY_FAILED,
            format!("Module '{}' of domain '{}' failed to load: {}", module, domain, details.into()),
        )
    }

    pub fn stub_error(details: impl Into<String>) -> Self {
        Self::new(codes::STUB_ERROR, format!("Stub generation failed: {}", details.into()))
    }

    pub fn io(details: impl Into<String>) -> Self {
        Self::new(codes::IO_ERROR, format!("I/O error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
    }
}

impl std::fmt::Display for TascError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TascError {}

impl From<std::io::Error> for TascError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for TascError {
    fn from(err: serde_json::Error) -> Self {
        Self::stub_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_follows_code() {
        assert_eq!(TascError::unknown_domain("x").category, ErrorCategory::Lookup);
        assert_eq!(TascError::missing_arg("add", "column1").category, ErrorCategory::Precondition);
        assert_eq!(
            TascError::discovery_failed("core", "math", "boom").category,
            ErrorCategory::Recoverable
        );
        assert_eq!(TascError::stub_error("disk full").category, ErrorCategory::Tooling);
    }

    #[test]
    fn test_display_includes_code_and_suggestion() {
        let err = TascError::unknown_domain("nonexistent_domain");
        let text = err.to_string();
        assert!(text.starts_with("[UNKNOWN_DOMAIN]"));
        assert!(text.contains("nonexistent_domain"));
        assert!(text.contains("suggestion"));
    }

    #[test]
    fn test_first_operation_context_wins() {
        let err = TascError::unknown_column("load")
            .in_operation("cycle_count")
            .in_operation("split_by_cycles");
        let ctx = err.context.unwrap();
        assert_eq!(ctx.operation.as_deref(), Some("cycle_count"));
    }

    #[test]
    fn test_serializes_lowercase_category() {
        let json = serde_json::to_value(TascError::internal("x")).unwrap();
        assert_eq!(json["category"], "tooling");
        assert_eq!(json["code"], "INTERNAL");
    }
}
