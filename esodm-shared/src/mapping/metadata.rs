//! Document metadata and the registry that resolves it.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::MappingError;
use crate::mapping::property::Property;

/// A Rust type stored as a search document.
///
/// Implementors declare their metadata statically. Hydration and persisting
/// go through serde; a field serialized as `_id` carries the document id.
///
/// # Example
///
/// ```
/// use esodm_shared::mapping::{Document, DocumentMetadata, FieldType, Property};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Product {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     title: String,
/// }
///
/// impl Document for Product {
///     const CLASS_NAME: &'static str = "AcmeTestBundle:Product";
///
///     fn metadata() -> DocumentMetadata {
///         DocumentMetadata::new(Self::CLASS_NAME, "product")
///             .with_property(Property::new("title", FieldType::String))
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name the document is registered under.
    const CLASS_NAME: &'static str;

    /// Static metadata describing the document type and its properties.
    fn metadata() -> DocumentMetadata;
}

/// Metadata for one document class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Name the document is registered under.
    pub class_name: String,
    /// Document type name in the index.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Mapped properties.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl DocumentMetadata {
    /// Create metadata with no properties.
    pub fn new(class_name: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            doc_type: doc_type.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Type mapping: `{"properties": {<field name>: <fragment>}}`.
    pub fn mapping(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|p| (p.mapping_name(), Value::Object(p.dump(&[]))))
            .collect();

        json!({ "properties": properties })
    }
}

/// Registry of document metadata keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct MetadataCollector {
    documents: BTreeMap<String, DocumentMetadata>,
}

impl MetadataCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load metadata from a JSON array of document descriptors.
    ///
    /// Unknown field types or options that do not belong to a field type
    /// fail the whole load.
    pub fn from_json(source: &str) -> Result<Self, MappingError> {
        let documents: Vec<DocumentMetadata> =
            serde_json::from_str(source).map_err(|e| MappingError::schema(e.to_string()))?;

        let mut collector = Self::new();
        for metadata in documents {
            collector.register(metadata)?;
        }
        Ok(collector)
    }

    /// Register metadata. Class names and document types must be unique.
    pub fn register(&mut self, metadata: DocumentMetadata) -> Result<(), MappingError> {
        if self.documents.contains_key(&metadata.class_name) {
            return Err(MappingError::duplicate_document(format!(
                "class {} is already registered",
                metadata.class_name
            )));
        }
        if self.by_type(&metadata.doc_type).is_some() {
            return Err(MappingError::duplicate_document(format!(
                "type {} is already registered",
                metadata.doc_type
            )));
        }

        self.documents
            .insert(metadata.class_name.clone(), metadata);
        Ok(())
    }

    /// Register a document type from its static metadata.
    pub fn register_document<T: Document>(&mut self) -> Result<(), MappingError> {
        self.register(T::metadata())
    }

    /// Builder form of [`register_document`](Self::register_document).
    pub fn with_document<T: Document>(mut self) -> Result<Self, MappingError> {
        self.register_document::<T>()?;
        Ok(self)
    }

    /// Metadata registered under `class_name`.
    pub fn get(&self, class_name: &str) -> Option<&DocumentMetadata> {
        self.documents.get(class_name)
    }

    /// Metadata for a document type.
    pub fn by_type(&self, doc_type: &str) -> Option<&DocumentMetadata> {
        self.documents.values().find(|m| m.doc_type == doc_type)
    }

    /// Resolve the document type of a class name.
    pub fn get_document_type(&self, class_name: &str) -> Result<&str, MappingError> {
        self.get(class_name)
            .map(|m| m.doc_type.as_str())
            .ok_or_else(|| MappingError::unknown_document(class_name))
    }

    /// Type mapping of a class name.
    pub fn get_mapping(&self, class_name: &str) -> Result<Value, MappingError> {
        self.get(class_name)
            .map(DocumentMetadata::mapping)
            .ok_or_else(|| MappingError::unknown_document(class_name))
    }

    /// All registered document types.
    pub fn document_types(&self) -> Vec<&str> {
        self.documents.values().map(|m| m.doc_type.as_str()).collect()
    }

    /// Iterate over all registered metadata.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentMetadata> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
