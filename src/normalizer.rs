//! Spec normalization - turns a raw Swagger 2.0 document into a lookup-friendly
//! [`NormalizedSpec`] with a resolved model name per operation.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SpecError;
use crate::operation::{Operation, OperationParams, ParamSpec};
use crate::schema::{Model, Models};
use crate::types::{
    json_type_name, model_name_from_ref, DataType, HttpMethod, ParamLocation, FILE_MODEL_NAME,
    SUCCESS_RESPONSE_CODE,
};

/// Models and operations of one API spec.
///
/// Built once by [`normalize`] and read-only afterwards, so it can be shared
/// across threads and validation calls.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSpec {
    models: Models,
    operations: IndexMap<String, Operation>,
}

impl NormalizedSpec {
    /// Models keyed by name, serialized exactly as the document's `definitions`.
    pub fn models(&self) -> &Models {
        &self.models
    }

    /// Operations keyed by operation id, in document order.
    pub fn operations(&self) -> &IndexMap<String, Operation> {
        &self.operations
    }

    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations.get(operation_id)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }
}

/// Normalize a raw Swagger document.
///
/// # Errors
///
/// Returns `SpecError::Malformed` if `definitions`, `basePath` or `paths` is
/// missing or has the wrong type, or if an operation or parameter lacks required
/// fields. Dangling `$ref`s and `allOf` loops fail as `UnknownModel` and
/// `CyclicSchema`.
pub fn normalize(raw: &Value) -> Result<NormalizedSpec, SpecError> {
    let document = raw.as_object().ok_or_else(|| {
        SpecError::malformed(
            "$",
            format!("expected a document object, got {}", json_type_name(raw)),
        )
    })?;

    let definitions = section_object(document, "definitions")?;
    let base_path = match document.get("basePath") {
        Some(Value::String(base_path)) => base_path.as_str(),
        Some(other) => {
            return Err(SpecError::malformed(
                "basePath",
                format!("expected string, got {}", json_type_name(other)),
            ))
        }
        None => return Err(SpecError::malformed("basePath", "missing section")),
    };
    let paths = section_object(document, "paths")?;
    let shared_parameters = match document.get("parameters") {
        None => None,
        Some(Value::Object(parameters)) => Some(parameters),
        Some(other) => {
            return Err(SpecError::malformed(
                "parameters",
                format!("expected object, got {}", json_type_name(other)),
            ))
        }
    };

    let models = Models::from_definitions(definitions)?;
    let operations = {
        let normalizer = Normalizer {
            models: &models,
            shared_parameters,
        };
        normalizer.operations(base_path, paths)?
    };

    debug!(
        models = models.len(),
        operations = operations.len(),
        "normalized spec"
    );
    Ok(NormalizedSpec { models, operations })
}

fn section_object<'a>(
    document: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Map<String, Value>, SpecError> {
    match document.get(name) {
        Some(Value::Object(section)) => Ok(section),
        Some(other) => Err(SpecError::malformed(
            name,
            format!("expected object, got {}", json_type_name(other)),
        )),
        None => Err(SpecError::malformed(name, "missing section")),
    }
}

struct Normalizer<'a> {
    models: &'a Models,
    shared_parameters: Option<&'a Map<String, Value>>,
}

impl<'a> Normalizer<'a> {
    fn operations(
        &self,
        base_path: &str,
        paths: &'a Map<String, Value>,
    ) -> Result<IndexMap<String, Operation>, SpecError> {
        let mut operations = IndexMap::new();

        for (template, item) in paths {
            let item_path = format!("paths.{}", template);
            let Value::Object(item) = item else {
                return Err(SpecError::malformed(
                    item_path,
                    format!("expected path item object, got {}", json_type_name(item)),
                ));
            };
            let path_level = item.get("parameters");

            for (key, raw_operation) in item {
                let Some(method) = HttpMethod::parse(key) else {
                    if key != "parameters" && !key.starts_with("x-") {
                        warn!(path = %template, key = %key, "skipping unknown path item key");
                    }
                    continue;
                };

                let operation_path = format!("{}.{}", item_path, method);
                let Value::Object(raw_operation) = raw_operation else {
                    return Err(SpecError::malformed(
                        operation_path,
                        format!(
                            "expected operation object, got {}",
                            json_type_name(raw_operation)
                        ),
                    ));
                };
                let operation_id = raw_operation
                    .get("operationId")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SpecError::malformed(&operation_path, "missing operationId"))?;

                let parameters = self.merged_parameters(
                    path_level,
                    raw_operation.get("parameters"),
                    &operation_path,
                )?;
                let model_name =
                    self.model_name(method, raw_operation, parameters.as_deref(), &operation_path)?;
                let parameters = parameters
                    .map(|params| simplify_parameters(&params, &operation_path))
                    .transpose()?;

                let operation = Operation {
                    method,
                    url: format!("{}{}", base_path, template),
                    model_name,
                    parameters,
                };
                debug!(
                    operation_id,
                    method = %operation.method,
                    url = %operation.url,
                    model = ?operation.model_name,
                    "normalized operation"
                );

                if operations
                    .insert(operation_id.to_string(), operation)
                    .is_some()
                {
                    warn!(operation_id, "duplicate operationId, keeping the last definition");
                }
            }
        }

        Ok(operations)
    }

    /// Path-item parameters followed by operation parameters; an operation entry
    /// replaces a path-item entry with the same `name` and `in`.
    ///
    /// `None` when neither level declares parameters.
    fn merged_parameters(
        &self,
        path_level: Option<&'a Value>,
        operation_level: Option<&'a Value>,
        path: &str,
    ) -> Result<Option<Vec<&'a Map<String, Value>>>, SpecError> {
        if path_level.is_none() && operation_level.is_none() {
            return Ok(None);
        }

        let mut merged = self.parameter_list(path_level, path)?;
        for param in self.parameter_list(operation_level, path)? {
            let key = param_key(param);
            match merged.iter().position(|existing| param_key(existing) == key) {
                Some(index) => merged[index] = param,
                None => merged.push(param),
            }
        }
        Ok(Some(merged))
    }

    fn parameter_list(
        &self,
        raw: Option<&'a Value>,
        path: &str,
    ) -> Result<Vec<&'a Map<String, Value>>, SpecError> {
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        let Value::Array(entries) = raw else {
            return Err(SpecError::malformed(
                format!("{}.parameters", path),
                format!("expected array, got {}", json_type_name(raw)),
            ));
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                self.resolve_parameter(entry, &format!("{}.parameters[{}]", path, index))
            })
            .collect()
    }

    /// Dereference `{"$ref": "#/parameters/Name"}` against the document's shared
    /// `parameters` section.
    fn resolve_parameter(
        &self,
        entry: &'a Value,
        path: &str,
    ) -> Result<&'a Map<String, Value>, SpecError> {
        let Value::Object(param) = entry else {
            return Err(SpecError::malformed(
                path,
                format!("expected parameter object, got {}", json_type_name(entry)),
            ));
        };

        match param.get("$ref").and_then(Value::as_str) {
            None => Ok(param),
            Some(reference) => {
                let name = model_name_from_ref(reference);
                self.shared_parameters
                    .and_then(|shared| shared.get(name))
                    .and_then(Value::as_object)
                    .ok_or_else(|| {
                        SpecError::malformed(path, format!("unknown parameter '{}'", reference))
                    })
            }
        }
    }

    fn model_name(
        &self,
        method: HttpMethod,
        operation: &Map<String, Value>,
        parameters: Option<&[&Map<String, Value>]>,
        path: &str,
    ) -> Result<Option<String>, SpecError> {
        match method {
            HttpMethod::Get => self.response_model_name(operation, path),
            HttpMethod::Post | HttpMethod::Put => {
                let body_ref = parameters
                    .unwrap_or_default()
                    .iter()
                    .find(|param| param.get("in").and_then(Value::as_str) == Some("body"))
                    .and_then(|body| body.get("schema"))
                    .and_then(|schema| schema.get("$ref"))
                    .and_then(Value::as_str);

                match body_ref {
                    Some(reference) => self
                        .resolve(reference, &format!("{}.parameters", path))
                        .map(Some),
                    None => self.response_model_name(operation, path),
                }
            }
            _ => Ok(None),
        }
    }

    fn response_model_name(
        &self,
        operation: &Map<String, Value>,
        path: &str,
    ) -> Result<Option<String>, SpecError> {
        let Some(schema) = operation
            .get("responses")
            .and_then(|responses| responses.get(SUCCESS_RESPONSE_CODE))
            .and_then(|response| response.get("schema"))
        else {
            return Ok(None);
        };
        let schema_path = format!("{}.responses.{}.schema", path, SUCCESS_RESPONSE_CODE);

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.resolve(reference, &schema_path).map(Some);
        }

        if let Some(properties) = schema.get("properties") {
            // List responses wrap their elements as `properties.items.items.$ref`.
            let item_ref = properties
                .get("items")
                .and_then(|items| items.get("items"))
                .and_then(|items| items.get("$ref"))
                .and_then(Value::as_str);
            return match item_ref {
                Some(reference) => self.resolve(reference, &schema_path).map(Some),
                None => Ok(None),
            };
        }

        if schema.get("type").and_then(Value::as_str) == Some("file") {
            return Ok(Some(FILE_MODEL_NAME.to_string()));
        }

        Ok(None)
    }

    fn resolve(&self, reference: &str, path: &str) -> Result<String, SpecError> {
        self.models
            .resolve_ref(reference, path)
            .map(str::to_string)
    }
}

fn param_key(param: &Map<String, Value>) -> (Option<&str>, Option<&str>) {
    (
        param.get("name").and_then(Value::as_str),
        param.get("in").and_then(Value::as_str),
    )
}

/// Partition parameters into path and query groups of `{type, required}`.
fn simplify_parameters(
    params: &[&Map<String, Value>],
    path: &str,
) -> Result<OperationParams, SpecError> {
    let mut simplified = OperationParams::default();

    for (index, param) in params.iter().enumerate() {
        let param_path = format!("{}.parameters[{}]", path, index);
        let location = param
            .get("in")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::malformed(&param_path, "parameter without 'in'"))?;
        let Some(location) = ParamLocation::parse(location) else {
            continue;
        };
        let name = param
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::malformed(&param_path, "parameter without 'name'"))?;
        let data_type = param
            .get("type")
            .and_then(Value::as_str)
            .and_then(DataType::parse)
            .ok_or_else(|| {
                SpecError::malformed(
                    &param_path,
                    format!("{} parameter '{}' has no supported type", location.as_str(), name),
                )
            })?;
        let required = param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        simplified.get_mut(location).insert(
            name.to_string(),
            ParamSpec {
                data_type,
                required,
            },
        );
    }

    Ok(simplified)
}
