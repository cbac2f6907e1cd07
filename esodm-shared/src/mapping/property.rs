//! Mapped document property.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MappingError;
use crate::mapping::field_type::FieldType;
use crate::mapping::options::FieldOptions;

/// One mapped property of a document.
///
/// `field` is the name of the property on the Rust type. The name used in the
/// index defaults to the snake_cased field name and can be overridden with
/// `name`. The field type is carried by the options variant, so a property
/// can never hold a type outside [`FieldType`].
///
/// # Example
///
/// ```
/// use esodm_shared::mapping::{Property, FieldType};
///
/// let property = Property::new("productTitle", FieldType::String);
/// assert_eq!(property.mapping_name(), "product_title");
/// assert_eq!(property.dump(&[])["type"], "string");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Name of the property on the document type.
    pub field: String,
    /// Index field name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Field type and its options.
    #[serde(flatten)]
    pub options: FieldOptions,
}

impl Property {
    /// Create a property for `field` with the given type or options.
    pub fn new(field: impl Into<String>, options: impl Into<FieldOptions>) -> Self {
        Self {
            field: field.into(),
            name: None,
            options: options.into(),
        }
    }

    /// Create a property from a field type name, validating it.
    pub fn from_type_name(field: impl Into<String>, type_name: &str) -> Result<Self, MappingError> {
        let field_type: FieldType = type_name.parse()?;
        Ok(Self::new(field, field_type))
    }

    /// Override the field name used in the index.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The field type.
    pub fn field_type(&self) -> FieldType {
        self.options.field_type()
    }

    /// The name this property is stored under in the index.
    pub fn mapping_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.field.to_snake_case(),
        }
    }

    /// Dump the property into a field mapping fragment.
    ///
    /// Keys are snake_cased. Falsy values (null, empty string, `"0"`, zero,
    /// empty array or object) are dropped unless they are booleans, so an
    /// explicit `false` option survives. `name` is never part of the
    /// fragment, nor is any key listed in `exclude`.
    pub fn dump(&self, exclude: &[&str]) -> Map<String, Value> {
        let attributes = match serde_json::to_value(&self.options) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let excluded: Vec<String> = std::iter::once("name")
            .chain(exclude.iter().copied())
            .map(ToSnakeCase::to_snake_case)
            .collect();

        attributes
            .into_iter()
            .map(|(key, value)| (key.to_snake_case(), value))
            .filter(|(key, _)| !excluded.contains(key))
            .filter_map(|(key, value)| prune(value).map(|value| (key, value)))
            .collect()
    }
}

/// Drop falsy values, recursing into objects. Booleans are always kept.
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() || s == "0" => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, value)| prune(value).map(|value| (key, value)))
                .collect();
            (!pruned.is_empty()).then_some(Value::Object(pruned))
        }
        other => Some(other),
    }
}
