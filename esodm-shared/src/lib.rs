//! # esodm shared
//!
//! Types shared across the esodm crates: document metadata and the index
//! mapping it produces, the search request builder, and the result kinds a
//! search can be materialized as.

pub mod errors;
pub mod mapping;
pub mod result_kind;
pub mod search;

pub use errors::MappingError;
pub use mapping::{
    Document, DocumentMetadata, FieldOptions, FieldType, MetadataCollector, Property,
};
pub use result_kind::ResultKind;
pub use search::{Aggregation, FieldSort, Query, Search, SortOrder};
