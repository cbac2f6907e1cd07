//! Declaration-time errors raised while building document metadata.

use thiserror::Error;

/// Errors raised while declaring or loading document metadata.
///
/// These surface at registration time, before any request reaches the
/// search engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A field type outside the supported set.
    #[error("Invalid field type: {0}")]
    InvalidFieldType(String),

    /// A result kind outside the supported set.
    #[error("Invalid result kind: {0}")]
    InvalidResultKind(String),

    /// A sort direction other than asc/desc.
    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    /// Two documents registered under the same class name or type.
    #[error("Duplicate document: {0}")]
    DuplicateDocument(String),

    /// Lookup of a class name that was never registered.
    #[error("Unknown document class: {0}")]
    UnknownDocument(String),

    /// Schema source could not be parsed.
    #[error("Schema error: {0}")]
    SchemaError(String),
}

impl MappingError {
    /// Create an unknown document error.
    pub fn unknown_document(class_name: impl Into<String>) -> Self {
        Self::UnknownDocument(class_name.into())
    }

    /// Create a duplicate document error.
    pub fn duplicate_document(msg: impl Into<String>) -> Self {
        Self::DuplicateDocument(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaError(msg.into())
    }
}
