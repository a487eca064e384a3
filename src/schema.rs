//! Typed model definitions compiled from the Swagger `definitions` section.
//!
//! Each definition is classified once into a [`ModelKind`] so validation never has
//! to sniff raw JSON for `enum`, `properties` or `allOf`. The raw definition is
//! kept alongside and is what gets serialized, so a normalized spec still exposes
//! the document's `definitions` verbatim.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::types::{json_type_name, model_name_from_ref, ScalarType};

/// Shape of a named model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    /// `type: string` with an `enum` list.
    Enum(Vec<Value>),
    /// `type: object` with `required` and `properties`.
    Object(ObjectModel),
    /// `type: array` with `items`.
    Array(PropertyDef),
    /// `allOf` composition, resolved through its first entry.
    Composed { parent: String },
    /// Any other shape. Accepted by validation without checks.
    Opaque,
}

/// Required fields and property definitions of an object model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectModel {
    pub required: Vec<String>,
    pub properties: IndexMap<String, PropertyDef>,
}

/// Declared type of a single property or array element.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDef {
    Scalar(ScalarType),
    Object(ObjectTarget),
    Array(Box<PropertyDef>),
    /// No declared type; any value is accepted.
    Any,
}

/// What an object-typed property points at.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectTarget {
    /// A named model from `definitions`.
    Ref(String),
    /// An anonymous object schema declared in place.
    Inline(ObjectModel),
    /// `type: object` with nothing else; only the JSON type is checked.
    Any,
}

impl ModelKind {
    fn parse(raw: &Value, path: &str) -> Result<Self, SpecError> {
        let Value::Object(def) = raw else {
            return Err(SpecError::malformed(
                path,
                format!("expected a model object, got {}", json_type_name(raw)),
            ));
        };

        if let Some(all_of) = def.get("allOf") {
            let parent = first_all_of_ref(all_of).ok_or_else(|| {
                SpecError::malformed(
                    format!("{}.allOf", path),
                    "expected a $ref as the first entry",
                )
            })?;
            return Ok(ModelKind::Composed {
                parent: model_name_from_ref(parent).to_string(),
            });
        }

        match def.get("type").and_then(Value::as_str) {
            Some("string") if def.contains_key("enum") => match def.get("enum") {
                Some(Value::Array(members)) => Ok(ModelKind::Enum(members.clone())),
                _ => Err(SpecError::malformed(
                    format!("{}.enum", path),
                    "expected an array of members",
                )),
            },
            Some("object") => Ok(ModelKind::Object(ObjectModel::parse(def, path)?)),
            Some("array") => Ok(ModelKind::Array(PropertyDef::parse_items(def, path)?)),
            _ => Ok(ModelKind::Opaque),
        }
    }
}

impl ObjectModel {
    fn parse(def: &Map<String, Value>, path: &str) -> Result<Self, SpecError> {
        let required = match def.get("required") {
            None => Vec::new(),
            Some(Value::Array(fields)) => fields
                .iter()
                .map(|field| {
                    field.as_str().map(str::to_string).ok_or_else(|| {
                        SpecError::malformed(
                            format!("{}.required", path),
                            format!("expected field names, got {}", json_type_name(field)),
                        )
                    })
                })
                .collect::<Result<Vec<String>, SpecError>>()?,
            Some(other) => {
                return Err(SpecError::malformed(
                    format!("{}.required", path),
                    format!("expected array, got {}", json_type_name(other)),
                ))
            }
        };

        let mut properties = IndexMap::new();
        match def.get("properties") {
            None => {}
            Some(Value::Object(props)) => {
                for (name, prop) in props {
                    let prop_path = format!("{}.properties.{}", path, name);
                    properties.insert(name.clone(), PropertyDef::parse(prop, &prop_path)?);
                }
            }
            Some(other) => {
                return Err(SpecError::malformed(
                    format!("{}.properties", path),
                    format!("expected object, got {}", json_type_name(other)),
                ))
            }
        }

        Ok(ObjectModel {
            required,
            properties,
        })
    }
}

impl PropertyDef {
    fn parse(raw: &Value, path: &str) -> Result<Self, SpecError> {
        let Value::Object(def) = raw else {
            return Err(SpecError::malformed(
                path,
                format!("expected a property object, got {}", json_type_name(raw)),
            ));
        };

        let reference = def
            .get("$ref")
            .and_then(Value::as_str)
            .or_else(|| def.get("allOf").and_then(first_all_of_ref))
            .map(|r| model_name_from_ref(r).to_string());

        let type_name = match def.get("type") {
            None => {
                return Ok(match reference {
                    Some(name) => PropertyDef::Object(ObjectTarget::Ref(name)),
                    None if def.contains_key("properties") => {
                        PropertyDef::Object(ObjectTarget::Inline(ObjectModel::parse(def, path)?))
                    }
                    None => PropertyDef::Any,
                })
            }
            Some(Value::String(t)) => t.as_str(),
            Some(other) => {
                return Err(SpecError::malformed(
                    format!("{}.type", path),
                    format!("expected string, got {}", json_type_name(other)),
                ))
            }
        };

        let property = match type_name {
            "object" => PropertyDef::Object(match reference {
                Some(name) => ObjectTarget::Ref(name),
                None if def.contains_key("properties") => {
                    ObjectTarget::Inline(ObjectModel::parse(def, path)?)
                }
                None => ObjectTarget::Any,
            }),
            "array" => PropertyDef::Array(Box::new(Self::parse_items(def, path)?)),
            "string" => PropertyDef::Scalar(ScalarType::String),
            "boolean" => PropertyDef::Scalar(ScalarType::Boolean),
            "integer" => PropertyDef::Scalar(ScalarType::Integer),
            "number" => PropertyDef::Scalar(ScalarType::Number),
            "file" => PropertyDef::Scalar(ScalarType::File),
            other => {
                return Err(SpecError::malformed(
                    format!("{}.type", path),
                    format!("unsupported type '{}'", other),
                ))
            }
        };
        Ok(property)
    }

    fn parse_items(def: &Map<String, Value>, path: &str) -> Result<Self, SpecError> {
        let items = def
            .get("items")
            .ok_or_else(|| SpecError::malformed(path, "array type without items"))?;
        Self::parse(items, &format!("{}.items", path))
    }
}

fn first_all_of_ref(all_of: &Value) -> Option<&str> {
    all_of
        .as_array()?
        .first()?
        .get("$ref")
        .and_then(Value::as_str)
}

/// A named model: the raw definition plus its compiled shape.
#[derive(Debug, Clone)]
pub struct Model {
    raw: Value,
    kind: ModelKind,
}

impl Model {
    /// The definition exactly as it appeared in the document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// All models of a spec, keyed by name in document order.
///
/// Construction guarantees every `$ref` names a defined model and no `allOf`
/// chain loops back on itself.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Models {
    models: IndexMap<String, Model>,
}

impl Models {
    /// Compile the `definitions` section.
    ///
    /// # Errors
    ///
    /// Returns `SpecError::Malformed` for definitions that cannot be classified,
    /// `SpecError::UnknownModel` for dangling references, and
    /// `SpecError::CyclicSchema` for `allOf` loops.
    pub fn from_definitions(definitions: &Map<String, Value>) -> Result<Self, SpecError> {
        let mut models = IndexMap::with_capacity(definitions.len());
        for (name, raw) in definitions {
            let kind = ModelKind::parse(raw, &format!("definitions.{}", name))?;
            models.insert(
                name.clone(),
                Model {
                    raw: raw.clone(),
                    kind,
                },
            );
        }

        let models = Models { models };
        models.check_references()?;
        for name in models.models.keys() {
            models.resolve_base(name)?;
        }
        Ok(models)
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }

    /// Follow `allOf` parents from `name` to the first non-composed model.
    ///
    /// Returns the base model's name and definition. A non-composed model is its
    /// own base.
    pub fn resolve_base(&self, name: &str) -> Result<(&str, &Model), SpecError> {
        let mut chain = vec![name.to_string()];
        let (mut base, mut model) = self.lookup(name, "definitions")?;

        while let ModelKind::Composed { parent } = &model.kind {
            let seen = chain.iter().any(|visited| visited == parent);
            chain.push(parent.clone());
            if seen {
                return Err(SpecError::CyclicSchema { chain });
            }
            let from = format!("definitions.{}.allOf[0]", base);
            (base, model) = self.lookup(parent, &from)?;
        }

        Ok((base, model))
    }

    /// Resolve a `$ref` string to the name of its effective base model.
    ///
    /// `path` locates the reference in the document for error reporting.
    pub fn resolve_ref(&self, reference: &str, path: &str) -> Result<&str, SpecError> {
        let name = model_name_from_ref(reference);
        if !self.contains(name) {
            return Err(SpecError::UnknownModel {
                name: name.to_string(),
                path: path.to_string(),
            });
        }
        self.resolve_base(name).map(|(base, _)| base)
    }

    fn lookup(&self, name: &str, path: &str) -> Result<(&str, &Model), SpecError> {
        self.models
            .get_key_value(name)
            .map(|(key, model)| (key.as_str(), model))
            .ok_or_else(|| SpecError::UnknownModel {
                name: name.to_string(),
                path: path.to_string(),
            })
    }

    fn check_references(&self) -> Result<(), SpecError> {
        for (name, model) in &self.models {
            let path = format!("definitions.{}", name);
            match &model.kind {
                ModelKind::Composed { parent } => {
                    self.require(parent, &format!("{}.allOf[0]", path))?
                }
                ModelKind::Object(object) => self.check_object_refs(object, &path)?,
                ModelKind::Array(items) => {
                    self.check_property_refs(items, &format!("{}.items", path))?
                }
                ModelKind::Enum(_) | ModelKind::Opaque => {}
            }
        }
        Ok(())
    }

    fn check_object_refs(&self, object: &ObjectModel, path: &str) -> Result<(), SpecError> {
        for (field, prop) in &object.properties {
            self.check_property_refs(prop, &format!("{}.properties.{}", path, field))?;
        }
        Ok(())
    }

    fn check_property_refs(&self, prop: &PropertyDef, path: &str) -> Result<(), SpecError> {
        match prop {
            PropertyDef::Object(ObjectTarget::Ref(name)) => self.require(name, path),
            PropertyDef::Object(ObjectTarget::Inline(object)) => {
                self.check_object_refs(object, path)
            }
            PropertyDef::Array(items) => self.check_property_refs(items, &format!("{}.items", path)),
            PropertyDef::Object(ObjectTarget::Any) | PropertyDef::Scalar(_) | PropertyDef::Any => {
                Ok(())
            }
        }
    }

    fn require(&self, name: &str, path: &str) -> Result<(), SpecError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(SpecError::UnknownModel {
                name: name.to_string(),
                path: path.to_string(),
            })
        }
    }
}
