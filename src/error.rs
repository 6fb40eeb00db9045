use crate::query::ValueKind;
use std::path::PathBuf;
use thiserror::Error;

/// Structural failures that abort evaluation of a whole predicate tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("cannot compare {lhs} with {rhs} using {operator}")]
    UnsupportedComparison {
        lhs: ValueKind,
        rhs: ValueKind,
        operator: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("model {model} has no field {field}")]
    UnknownField { model: String, field: String },

    #[error("field {field} expects {expected}, got {found}")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },

    #[error("{case} is not a case of enum field {field}")]
    UnknownEnumCase { field: String, case: String },

    #[error("operator {operator} is not supported on {kind} field {field}")]
    UnsupportedOperator {
        field: String,
        kind: ValueKind,
        operator: &'static str,
    },

    #[error("record document in {path} must be a mapping or a sequence of mappings")]
    NotAMapping { path: PathBuf },
}
