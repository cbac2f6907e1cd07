//! Conversion between engine hits and documents.

use esodm_shared::Document;
use serde_json::{Map, Value};

use crate::errors::SearchIndexError;

/// Field a document's id is carried in.
pub const ID_FIELD: &str = "_id";

/// Turns search hits into documents and documents into index requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    pub fn new() -> Self {
        Self
    }

    /// The `_source` of a hit with its `_id` injected.
    ///
    /// Works for both search hits and get responses.
    pub fn hit_source(&self, hit: &Value) -> Result<Map<String, Value>, SearchIndexError> {
        let mut source = match hit.get("_source") {
            Some(Value::Object(source)) => source.clone(),
            None | Some(Value::Null) => Map::new(),
            Some(_) => return Err(SearchIndexError::parse("Hit '_source' is not an object")),
        };

        if let Some(id) = hit.get(ID_FIELD) {
            source.insert(ID_FIELD.to_string(), id.clone());
        }
        Ok(source)
    }

    /// Hydrate a document from a hit.
    pub fn convert_to_document<T: Document>(&self, hit: &Value) -> Result<T, SearchIndexError> {
        let source = self.hit_source(hit)?;
        serde_json::from_value(Value::Object(source)).map_err(|e| {
            SearchIndexError::parse(format!("Failed to hydrate {}: {}", T::CLASS_NAME, e))
        })
    }

    /// Split a document into its id (if set) and the source to index.
    pub fn convert_to_source<T: Document>(
        &self,
        document: &T,
    ) -> Result<(Option<String>, Map<String, Value>), SearchIndexError> {
        let value = serde_json::to_value(document).map_err(|e| {
            SearchIndexError::serialization(format!(
                "Failed to serialize {}: {}",
                T::CLASS_NAME,
                e
            ))
        })?;

        let mut source = match value {
            Value::Object(source) => source,
            _ => {
                return Err(SearchIndexError::serialization(format!(
                    "{} does not serialize to an object",
                    T::CLASS_NAME
                )))
            }
        };

        let id = match source.remove(ID_FIELD) {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Ok((id, source))
    }
}
