//! Core vocabularies shared by the normalizer and the validator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pseudo model name for operations that return a file instead of JSON.
pub const FILE_MODEL_NAME: &str = "_File";

/// Response code whose schema describes an operation's model.
pub const SUCCESS_RESPONSE_CODE: &str = "200";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract the model name from a `$ref` (its trailing path segment).
///
/// `#/definitions/NetworkObject` yields `NetworkObject`.
pub fn model_name_from_ref(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse a path-item key. Returns `None` for keys that are not operations
    /// (`parameters`, `x-*` extensions).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "head" => Some(HttpMethod::Head),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a URL parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Boolean,
    Integer,
    Number,
    Object,
    Array,
    File,
}

impl DataType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(DataType::String),
            "boolean" => Some(DataType::Boolean),
            "integer" => Some(DataType::Integer),
            "number" => Some(DataType::Number),
            "object" => Some(DataType::Object),
            "array" => Some(DataType::Array),
            "file" => Some(DataType::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::Object => "object",
            DataType::Array => "array",
            DataType::File => "file",
        }
    }

    /// Strict type check without coercion.
    ///
    /// Booleans never satisfy `integer` or `number`, and floats never satisfy
    /// `integer`.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            DataType::String | DataType::File => value.is_string(),
            DataType::Boolean => value.is_boolean(),
            DataType::Integer => value.is_i64() || value.is_u64(),
            DataType::Number => value.is_number(),
            DataType::Object => value.is_object(),
            DataType::Array => value.is_array(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf type of a model property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Boolean,
    Integer,
    Number,
    File,
}

impl ScalarType {
    pub fn matches(&self, value: &Value) -> bool {
        DataType::from(*self).matches(value)
    }
}

impl From<ScalarType> for DataType {
    fn from(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::String => DataType::String,
            ScalarType::Boolean => DataType::Boolean,
            ScalarType::Integer => DataType::Integer,
            ScalarType::Number => DataType::Number,
            ScalarType::File => DataType::File,
        }
    }
}

/// Type reported in an `invalid_type` finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedType {
    String,
    Boolean,
    Integer,
    Number,
    Object,
    Array,
    File,
    Enum,
}

impl ExpectedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedType::Enum => "enum",
            ExpectedType::String => "string",
            ExpectedType::Boolean => "boolean",
            ExpectedType::Integer => "integer",
            ExpectedType::Number => "number",
            ExpectedType::Object => "object",
            ExpectedType::Array => "array",
            ExpectedType::File => "file",
        }
    }
}

impl From<DataType> for ExpectedType {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::String => ExpectedType::String,
            DataType::Boolean => ExpectedType::Boolean,
            DataType::Integer => ExpectedType::Integer,
            DataType::Number => ExpectedType::Number,
            DataType::Object => ExpectedType::Object,
            DataType::Array => ExpectedType::Array,
            DataType::File => ExpectedType::File,
        }
    }
}

impl From<ScalarType> for ExpectedType {
    fn from(scalar: ScalarType) -> Self {
        DataType::from(scalar).into()
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a URL parameter lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
}

impl ParamLocation {
    /// Parse an `in` discriminator. Body, header and form parameters are not
    /// URL parameters and yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_name_is_trailing_segment() {
        assert_eq!(model_name_from_ref("#/definitions/Network"), "Network");
        assert_eq!(model_name_from_ref("Network"), "Network");
    }

    #[test]
    fn http_method_parse() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("delete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("parameters"), None);
        assert_eq!(HttpMethod::parse("x-internal"), None);
    }

    #[test]
    fn integer_rejects_booleans_and_floats() {
        assert!(DataType::Integer.matches(&json!(1)));
        assert!(DataType::Integer.matches(&json!(-7)));
        assert!(!DataType::Integer.matches(&json!(true)));
        assert!(!DataType::Integer.matches(&json!(1.5)));
        assert!(!DataType::Integer.matches(&json!("1")));
    }

    #[test]
    fn number_accepts_ints_and_floats_only() {
        assert!(DataType::Number.matches(&json!(2)));
        assert!(DataType::Number.matches(&json!(2.3)));
        assert!(!DataType::Number.matches(&json!(false)));
        assert!(!DataType::Number.matches(&json!(null)));
    }

    #[test]
    fn string_and_boolean() {
        assert!(DataType::String.matches(&json!("a")));
        assert!(!DataType::String.matches(&json!(123)));
        assert!(DataType::Boolean.matches(&json!(false)));
        assert!(!DataType::Boolean.matches(&json!(0)));
    }

    #[test]
    fn expected_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ExpectedType::Enum).unwrap(), json!("enum"));
        assert_eq!(
            ExpectedType::from(ScalarType::Integer),
            ExpectedType::Integer
        );
    }

    #[test]
    fn param_location_parse() {
        assert_eq!(ParamLocation::parse("path"), Some(ParamLocation::Path));
        assert_eq!(ParamLocation::parse("query"), Some(ParamLocation::Query));
        assert_eq!(ParamLocation::parse("body"), None);
    }
}
