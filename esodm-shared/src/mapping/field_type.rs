//! Supported field types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MappingError;

/// Field type of a mapped property.
///
/// The set is closed: any string outside it is rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    Integer,
    Float,
    Long,
    Short,
    Byte,
    Double,
    Date,
    GeoPoint,
    GeoShape,
    Ip,
    Binary,
    TokenCount,
}

impl FieldType {
    /// All supported field types.
    pub const ALL: [FieldType; 14] = [
        FieldType::String,
        FieldType::Boolean,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Long,
        FieldType::Short,
        FieldType::Byte,
        FieldType::Double,
        FieldType::Date,
        FieldType::GeoPoint,
        FieldType::GeoShape,
        FieldType::Ip,
        FieldType::Binary,
        FieldType::TokenCount,
    ];

    /// The name used in index mappings.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Long => "long",
            FieldType::Short => "short",
            FieldType::Byte => "byte",
            FieldType::Double => "double",
            FieldType::Date => "date",
            FieldType::GeoPoint => "geo_point",
            FieldType::GeoShape => "geo_shape",
            FieldType::Ip => "ip",
            FieldType::Binary => "binary",
            FieldType::TokenCount => "token_count",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MappingError::InvalidFieldType(s.to_string()))
    }
}
