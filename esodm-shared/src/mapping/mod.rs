//! Document metadata: field types, per-type options, properties and the
//! registry that turns them into index mappings.

pub mod field_type;
pub mod metadata;
pub mod options;
pub mod property;

pub use field_type::FieldType;
pub use metadata::{Document, DocumentMetadata, MetadataCollector};
pub use options::{
    BinaryOptions, BooleanOptions, DateOptions, FieldOptions, GeoPointOptions, GeoShapeOptions,
    IndexMode, IpOptions, NumericOptions, StringOptions, TokenCountOptions,
};
pub use property::Property;
