//! Payload and URL parameter validation against a normalized spec.

use serde_json::{Map, Value};
use tracing::{error, trace};

use crate::error::IllegalArgumentError;
use crate::normalizer::NormalizedSpec;
use crate::operation::Operation;
use crate::report::{ValidationReport, Verdict};
use crate::schema::{ModelKind, Models, ObjectModel, ObjectTarget, PropertyDef};
use crate::types::{json_type_name, ExpectedType, ParamLocation, FILE_MODEL_NAME};

/// Validate a request body against the model of `operation_id`.
///
/// A missing `data` is treated as an empty object. Validation failures are
/// reported through the returned [`Verdict`], not as errors.
///
/// # Errors
///
/// Returns `IllegalArgumentError` if `operation_id` is empty or unknown, if
/// `data` is not an object, or if the operation has no payload model.
pub fn validate_data(
    spec: &NormalizedSpec,
    operation_id: &str,
    data: Option<&Value>,
) -> Result<Verdict, IllegalArgumentError> {
    ensure_operation_id(operation_id)?;
    let empty = Value::Object(Map::new());
    as_mapping(data, "data")?;
    let data = match data {
        Some(value) if value.is_object() => value,
        _ => &empty,
    };
    let operation = find_operation(spec, operation_id)?;
    trace!(operation_id, "validating data");

    let no_model = || IllegalArgumentError::NoPayloadModel {
        operation: operation_id.to_string(),
    };
    let model_name = operation
        .model_name
        .as_deref()
        .filter(|name| *name != FILE_MODEL_NAME)
        .ok_or_else(no_model)?;
    let model = spec.model(model_name).ok_or_else(no_model)?;

    let report = check_model(spec.models(), model.kind(), data, "");
    Ok(Verdict::from_report(report))
}

/// Validate the path part of a URL against the operation's path parameters.
///
/// # Errors
///
/// Returns `IllegalArgumentError` if `operation_id` is empty or unknown, or if
/// `params` is not an object.
pub fn validate_path_params(
    spec: &NormalizedSpec,
    operation_id: &str,
    params: Option<&Value>,
) -> Result<Verdict, IllegalArgumentError> {
    validate_url_params(spec, operation_id, params, ParamLocation::Path)
}

/// Validate the query part of a URL against the operation's query parameters.
///
/// # Errors
///
/// Returns `IllegalArgumentError` if `operation_id` is empty or unknown, or if
/// `params` is not an object.
pub fn validate_query_params(
    spec: &NormalizedSpec,
    operation_id: &str,
    params: Option<&Value>,
) -> Result<Verdict, IllegalArgumentError> {
    validate_url_params(spec, operation_id, params, ParamLocation::Query)
}

fn validate_url_params(
    spec: &NormalizedSpec,
    operation_id: &str,
    params: Option<&Value>,
    location: ParamLocation,
) -> Result<Verdict, IllegalArgumentError> {
    ensure_operation_id(operation_id)?;
    let empty = Map::new();
    let params = as_mapping(params, "params")?.unwrap_or(&empty);
    let operation = find_operation(spec, operation_id)?;
    trace!(operation_id, location = location.as_str(), "validating params");

    let Some(declared) = &operation.parameters else {
        return Ok(Verdict::Valid);
    };

    // Undeclared keys in `params` are ignored.
    let report = declared
        .get(location)
        .iter()
        .map(|(name, param)| match params.get(name) {
            None if param.required => ValidationReport::missing(name.as_str()),
            None => ValidationReport::default(),
            Some(value) if param.data_type.matches(value) => ValidationReport::default(),
            Some(value) => ValidationReport::invalid(name.as_str(), param.data_type, value),
        })
        .collect();

    Ok(Verdict::from_report(report))
}

fn ensure_operation_id(operation_id: &str) -> Result<(), IllegalArgumentError> {
    if operation_id.is_empty() {
        Err(IllegalArgumentError::EmptyOperationId)
    } else {
        Ok(())
    }
}

fn find_operation<'a>(
    spec: &'a NormalizedSpec,
    operation_id: &str,
) -> Result<&'a Operation, IllegalArgumentError> {
    spec.operation(operation_id)
        .ok_or_else(|| IllegalArgumentError::UnknownOperation {
            operation: operation_id.to_string(),
        })
}

fn as_mapping<'a>(
    value: Option<&'a Value>,
    argument: &'static str,
) -> Result<Option<&'a Map<String, Value>>, IllegalArgumentError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(IllegalArgumentError::NotAMapping {
            argument,
            actual: json_type_name(other),
        }),
    }
}

/// Join a parent path and a field name with a dot, skipping empty parts.
fn field_path(path: &str, field: &str) -> String {
    match (path.is_empty(), field.is_empty()) {
        (true, _) => field.to_string(),
        (false, true) => path.to_string(),
        (false, false) => format!("{}.{}", path, field),
    }
}

fn check_model(models: &Models, kind: &ModelKind, value: &Value, path: &str) -> ValidationReport {
    match kind {
        ModelKind::Enum(members) => {
            if value.is_string() && members.contains(value) {
                ValidationReport::default()
            } else {
                ValidationReport::invalid(path, ExpectedType::Enum, value)
            }
        }
        ModelKind::Object(object) => check_object(models, object, value, path),
        ModelKind::Array(items) => check_array(models, items, value, path),
        ModelKind::Composed { parent } => match models.resolve_base(parent) {
            Ok((_, base)) => check_model(models, base.kind(), value, path),
            // `normalize` rejects composition loops and dangling bases.
            Err(err) => {
                debug_assert!(false, "unresolved base of {}: {}", parent, err);
                error!(model = %parent, error = %err, "composed model has no base");
                ValidationReport::default()
            }
        },
        ModelKind::Opaque => ValidationReport::default(),
    }
}

fn check_object(
    models: &Models,
    object: &ObjectModel,
    value: &Value,
    path: &str,
) -> ValidationReport {
    let Value::Object(data) = value else {
        return ValidationReport::invalid(path, ExpectedType::Object, value);
    };

    let missing = object
        .required
        .iter()
        .filter(|field| !data.contains_key(field.as_str()))
        .map(|field| ValidationReport::missing(field_path(path, field)));

    let properties = object
        .properties
        .iter()
        .filter_map(|(field, prop)| {
            data.get(field)
                .map(|value| check_property(models, prop, value, &field_path(path, field)))
        });

    missing.chain(properties).collect()
}

fn check_array(models: &Models, items: &PropertyDef, value: &Value, path: &str) -> ValidationReport {
    let Value::Array(elements) = value else {
        return ValidationReport::invalid(path, ExpectedType::Array, value);
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            check_property(models, items, element, &format!("{}[{}]", path, index))
        })
        .collect()
}

/// Check one value against a property definition; `path` already names the
/// value itself.
fn check_property(models: &Models, prop: &PropertyDef, value: &Value, path: &str) -> ValidationReport {
    match prop {
        PropertyDef::Scalar(scalar) => {
            if scalar.matches(value) {
                ValidationReport::default()
            } else {
                ValidationReport::invalid(path, *scalar, value)
            }
        }
        PropertyDef::Object(ObjectTarget::Ref(name)) => match models.get(name) {
            Some(model) => check_model(models, model.kind(), value, path),
            // `normalize` rejects dangling references.
            None => {
                debug_assert!(false, "dangling reference to {}", name);
                error!(model = %name, path, "property references an unknown model");
                ValidationReport::default()
            }
        },
        PropertyDef::Object(ObjectTarget::Inline(object)) => {
            check_object(models, object, value, path)
        }
        PropertyDef::Object(ObjectTarget::Any) => {
            if value.is_object() {
                ValidationReport::default()
            } else {
                ValidationReport::invalid(path, ExpectedType::Object, value)
            }
        }
        PropertyDef::Array(items) => check_array(models, items, value, path),
        PropertyDef::Any => ValidationReport::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use serde_json::json;

    fn spec() -> NormalizedSpec {
        normalize(&json!({
            "basePath": "/api",
            "definitions": {
                "Item": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "count": { "type": "integer" }
                    }
                }
            },
            "paths": {
                "/items": {
                    "post": {
                        "operationId": "addItem",
                        "parameters": [
                            { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Item" } }
                        ],
                        "responses": {}
                    }
                },
                "/items/{objId}": {
                    "delete": {
                        "operationId": "deleteItem",
                        "parameters": [
                            { "name": "objId", "in": "path", "type": "string", "required": true }
                        ],
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn field_path_joins() {
        assert_eq!(field_path("", "name"), "name");
        assert_eq!(field_path("parent", "name"), "parent.name");
        assert_eq!(field_path("list[2]", ""), "list[2]");
        assert_eq!(field_path("", ""), "");
    }

    #[test]
    fn absent_data_is_an_empty_mapping() {
        let verdict = validate_data(&spec(), "addItem", None).unwrap();
        assert_eq!(verdict.report().unwrap().required, vec!["name"]);
    }

    #[test]
    fn non_mapping_data_is_illegal() {
        let err = validate_data(&spec(), "addItem", Some(&json!([1, 2]))).unwrap_err();
        assert_eq!(
            err,
            IllegalArgumentError::NotAMapping {
                argument: "data",
                actual: "array"
            }
        );
    }

    #[test]
    fn delete_has_no_payload_model() {
        let err = validate_data(&spec(), "deleteItem", Some(&json!({}))).unwrap_err();
        assert!(matches!(err, IllegalArgumentError::NoPayloadModel { .. }));
    }

    #[test]
    fn scalar_mismatch_is_path_qualified() {
        let verdict =
            validate_data(&spec(), "addItem", Some(&json!({ "name": "a", "count": "3" }))).unwrap();
        let report = verdict.into_report().unwrap();
        assert!(report.required.is_empty());
        assert_eq!(report.invalid_type[0].path, "count");
        assert_eq!(report.invalid_type[0].expected_type, ExpectedType::Integer);
        assert_eq!(report.invalid_type[0].actually_value, json!("3"));
    }

    #[test]
    fn params_ignore_undeclared_keys() {
        let verdict = validate_path_params(
            &spec(),
            "deleteItem",
            Some(&json!({ "objId": "42", "extra": 1 })),
        )
        .unwrap();
        assert!(verdict.is_valid());
    }

    #[test]
    fn params_without_declarations_succeed() {
        let verdict = validate_query_params(&spec(), "addItem", Some(&json!({ "q": 1 }))).unwrap();
        assert!(verdict.is_valid());
    }

    #[test]
    fn non_mapping_params_are_illegal() {
        let err = validate_path_params(&spec(), "deleteItem", Some(&json!("42"))).unwrap_err();
        assert_eq!(
            err,
            IllegalArgumentError::NotAMapping {
                argument: "params",
                actual: "string"
            }
        );
    }

    fn upload_spec() -> NormalizedSpec {
        normalize(&json!({
            "basePath": "/api",
            "definitions": {
                "Upload": {
                    "type": "object",
                    "properties": {
                        "content": { "type": "file" },
                        "meta": { "properties": { "size": { "type": "integer" } } }
                    }
                }
            },
            "paths": {
                "/uploads": {
                    "put": {
                        "operationId": "putUpload",
                        "parameters": [
                            { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/Upload" } },
                            { "name": "archive", "in": "query", "type": "file" }
                        ],
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn file_property_accepts_only_strings() {
        let spec = upload_spec();
        let verdict =
            validate_data(&spec, "putUpload", Some(&json!({ "content": "backup.tgz" }))).unwrap();
        assert!(verdict.is_valid());

        let report = validate_data(&spec, "putUpload", Some(&json!({ "content": 7 })))
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.invalid_type[0].path, "content");
        assert_eq!(report.invalid_type[0].expected_type, ExpectedType::File);
    }

    #[test]
    fn file_param_accepts_only_strings() {
        let spec = upload_spec();
        let verdict =
            validate_query_params(&spec, "putUpload", Some(&json!({ "archive": "a.tgz" }))).unwrap();
        assert!(verdict.is_valid());

        let report = validate_query_params(&spec, "putUpload", Some(&json!({ "archive": true })))
            .unwrap()
            .into_report()
            .unwrap();
        assert_eq!(report.invalid_type[0].path, "archive");
        assert_eq!(report.invalid_type[0].expected_type, ExpectedType::File);
    }

    #[test]
    fn untyped_inline_object_is_checked() {
        let report = validate_data(
            &upload_spec(),
            "putUpload",
            Some(&json!({ "meta": { "size": "big" } })),
        )
        .unwrap()
        .into_report()
        .unwrap();
        assert_eq!(report.invalid_type[0].path, "meta.size");
        assert_eq!(report.invalid_type[0].expected_type, ExpectedType::Integer);
    }
}
