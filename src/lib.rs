//! Swagger Guard
//!
//! Normalizes Swagger 2.0 documents and validates request payloads and URL
//! parameters against them before a request is sent.
//!
//! Normalization resolves, for every operation, its HTTP method, full URL
//! template, effective model and URL parameter declarations. Validation walks a
//! payload against the operation's model and reports every missing required
//! field and every type mismatch with a path such as `parent.list[2].field`.
//!
//! # Example
//!
//! ```
//! use swagger_guard::{normalize, validate_data, validate_path_params};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "basePath": "/api/v2",
//!     "definitions": {
//!         "Network": {
//!             "type": "object",
//!             "required": ["name"],
//!             "properties": {
//!                 "name": { "type": "string" },
//!                 "port": { "type": "integer" }
//!             }
//!         }
//!     },
//!     "paths": {
//!         "/networks/{objId}": {
//!             "put": {
//!                 "operationId": "editNetwork",
//!                 "parameters": [
//!                     { "name": "objId", "in": "path", "type": "string", "required": true },
//!                     { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Network" } }
//!                 ],
//!                 "responses": {}
//!             }
//!         }
//!     }
//! });
//!
//! let spec = normalize(&raw).unwrap();
//! assert_eq!(spec.operation("editNetwork").unwrap().url, "/api/v2/networks/{objId}");
//!
//! let verdict = validate_data(&spec, "editNetwork", Some(&json!({ "port": true }))).unwrap();
//! let report = verdict.report().unwrap();
//! assert_eq!(report.required, vec!["name"]);
//! assert_eq!(report.invalid_type[0].path, "port");
//!
//! let verdict = validate_path_params(&spec, "editNetwork", Some(&json!({ "objId": "1" }))).unwrap();
//! assert!(verdict.is_valid());
//! ```
//!
//! # Findings
//!
//! | Category | Entry | Raised when |
//! |----------|-------|-------------|
//! | `required` | field path | a required field is absent |
//! | `invalid_type` | `{path, expected_type, actually_value}` | a value has the wrong JSON type or is not an enum member |

mod error;
mod loader;
mod normalizer;
mod operation;
mod report;
mod schema;
mod types;
mod validator;

pub use error::{IllegalArgumentError, LoadError, SpecError};
pub use loader::{load_spec, load_spec_str, load_value};
pub use normalizer::{normalize, NormalizedSpec};
pub use operation::{Operation, OperationParams, ParamSpec};
pub use report::{InvalidType, ValidationReport, Verdict};
pub use schema::{Model, ModelKind, Models, ObjectModel, ObjectTarget, PropertyDef};
pub use types::{
    json_type_name, model_name_from_ref, DataType, ExpectedType, HttpMethod, ParamLocation,
    ScalarType, FILE_MODEL_NAME, SUCCESS_RESPONSE_CODE,
};
pub use validator::{validate_data, validate_path_params, validate_query_params};
