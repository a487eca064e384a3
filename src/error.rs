//! Error types for spec loading, normalization and validation calls.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading a spec document or payload from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while normalizing a raw Swagger document.
///
/// All of them are fatal for the document: normalization never yields a partial result.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("malformed spec at {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("unknown model '{name}' referenced at {path}")]
    UnknownModel { name: String, path: String },

    #[error("cyclic schema: {}", chain.join(" -> "))]
    CyclicSchema { chain: Vec<String> },
}

impl SpecError {
    pub(crate) fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        SpecError::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Caller misuse of a validation entry point.
///
/// These indicate a programming error in the caller, not bad user data: invalid
/// payloads are reported through [`crate::Verdict`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IllegalArgumentError {
    #[error("the operation id must be a non-empty string")]
    EmptyOperationId,

    #[error("the {argument} parameter must be a mapping, got {actual}")]
    NotAMapping {
        argument: &'static str,
        actual: &'static str,
    },

    #[error("{operation} operation is not supported")]
    UnknownOperation { operation: String },

    #[error("{operation} operation has no payload model to validate against")]
    NoPayloadModel { operation: String },
}

impl IllegalArgumentError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("spec.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(LoadError::InvalidJson { source }.exit_code(), 2);
    }

    #[test]
    fn cyclic_schema_display() {
        let err = SpecError::CyclicSchema {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "cyclic schema: A -> B -> A");
    }

    #[test]
    fn illegal_argument_display() {
        let err = IllegalArgumentError::UnknownOperation {
            operation: "getFoo".into(),
        };
        assert_eq!(err.to_string(), "getFoo operation is not supported");

        let err = IllegalArgumentError::NotAMapping {
            argument: "data",
            actual: "array",
        };
        assert_eq!(
            err.to_string(),
            "the data parameter must be a mapping, got array"
        );
    }
}
