//! Reading spec documents and payloads from disk.
//!
//! Specs may be JSON or YAML (by file extension); payloads are always JSON.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;

/// Load a spec document from a file.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or
/// `LoadError::InvalidJson` / `LoadError::InvalidYaml` if it doesn't parse.
pub fn load_spec(path: &Path) -> Result<Value, LoadError> {
    let content = read(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|source| LoadError::InvalidYaml { source })
    } else {
        load_spec_str(&content)
    }
}

/// Load a spec document from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_spec_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a JSON payload (request body or parameter mapping) from a file.
pub fn load_value(path: &Path) -> Result<Value, LoadError> {
    let content = read(path)?;
    load_spec_str(&content)
}

fn read(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_json_spec() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.json");
        fs::write(&path, r#"{"basePath":"/api","paths":{},"definitions":{}}"#).unwrap();

        let spec = load_spec(&path).unwrap();
        assert_eq!(spec["basePath"], json!("/api"));
    }

    #[test]
    fn load_yaml_spec() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.yaml");
        fs::write(
            &path,
            "basePath: /api\npaths: {}\ndefinitions:\n  Color:\n    type: string\n    enum: [RED]\n",
        )
        .unwrap();

        let spec = load_spec(&path).unwrap();
        assert_eq!(spec["definitions"]["Color"]["enum"], json!(["RED"]));
    }

    #[test]
    fn missing_file() {
        let result = load_spec(Path::new("/nonexistent/spec.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            load_spec_str("{ not json"),
            Err(LoadError::InvalidJson { .. })
        ));
    }

    #[test]
    fn yaml_extension_detection() {
        assert!(is_yaml(Path::new("spec.yml")));
        assert!(is_yaml(Path::new("spec.YAML")));
        assert!(!is_yaml(Path::new("spec.json")));
        assert!(!is_yaml(Path::new("spec")));
    }
}
