//! Typed option sets for each field type.
//!
//! [`FieldOptions`] is a tagged union keyed by the field type, so each
//! variant only carries the settings that make sense for that type. When a
//! schema is loaded from JSON, the `type` key selects the variant and any
//! option that does not belong to it is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::mapping::field_type::FieldType;

/// How a field is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    Analyzed,
    NotAnalyzed,
    No,
}

/// Options for `string` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StringOptions {
    pub index: Option<IndexMode>,
    pub analyzer: Option<String>,
    #[serde(alias = "indexAnalyzer")]
    pub index_analyzer: Option<String>,
    #[serde(alias = "searchAnalyzer")]
    pub search_analyzer: Option<String>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<String>,
    #[serde(alias = "includeInAll")]
    pub include_in_all: Option<bool>,
    pub store: Option<bool>,
    pub boost: Option<f64>,
    #[serde(alias = "termVector")]
    pub term_vector: Option<String>,
    /// Multi-fields indexed from the same source value.
    pub fields: BTreeMap<String, FieldOptions>,
}

/// Options shared by every numeric field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumericOptions {
    pub index: Option<IndexMode>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<Number>,
    pub coerce: Option<bool>,
    #[serde(alias = "includeInAll")]
    pub include_in_all: Option<bool>,
    #[serde(alias = "precisionStep")]
    pub precision_step: Option<u32>,
    pub store: Option<bool>,
    pub boost: Option<f64>,
}

/// Options for `boolean` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BooleanOptions {
    pub index: Option<IndexMode>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<bool>,
    pub store: Option<bool>,
    pub boost: Option<f64>,
}

/// Options for `date` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateOptions {
    pub format: Option<String>,
    pub index: Option<IndexMode>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<String>,
    #[serde(alias = "includeInAll")]
    pub include_in_all: Option<bool>,
    pub store: Option<bool>,
    pub boost: Option<f64>,
}

/// Options for `geo_point` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoPointOptions {
    #[serde(alias = "latLon")]
    pub lat_lon: Option<bool>,
    pub geohash: Option<bool>,
    #[serde(alias = "geohashPrecision")]
    pub geohash_precision: Option<u32>,
    #[serde(alias = "geohashPrefix")]
    pub geohash_prefix: Option<bool>,
}

/// Options for `geo_shape` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoShapeOptions {
    pub tree: Option<String>,
    pub precision: Option<String>,
    #[serde(alias = "treeLevels")]
    pub tree_levels: Option<u32>,
    #[serde(alias = "distanceErrorPct")]
    pub distance_error_pct: Option<f64>,
}

/// Options for `ip` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IpOptions {
    pub index: Option<IndexMode>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<String>,
    pub store: Option<bool>,
    pub boost: Option<f64>,
}

/// Options for `binary` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinaryOptions {
    pub store: Option<bool>,
    #[serde(alias = "docValues")]
    pub doc_values: Option<bool>,
}

/// Options for `token_count` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenCountOptions {
    pub analyzer: Option<String>,
    pub index: Option<IndexMode>,
    #[serde(alias = "nullValue")]
    pub null_value: Option<Number>,
    pub store: Option<bool>,
}

/// Field type together with its type-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldOptions {
    String(StringOptions),
    Boolean(BooleanOptions),
    Integer(NumericOptions),
    Float(NumericOptions),
    Long(NumericOptions),
    Short(NumericOptions),
    Byte(NumericOptions),
    Double(NumericOptions),
    Date(DateOptions),
    GeoPoint(GeoPointOptions),
    GeoShape(GeoShapeOptions),
    Ip(IpOptions),
    Binary(BinaryOptions),
    TokenCount(TokenCountOptions),
}

impl FieldOptions {
    /// Default options for the given field type.
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => FieldOptions::String(StringOptions::default()),
            FieldType::Boolean => FieldOptions::Boolean(BooleanOptions::default()),
            FieldType::Integer => FieldOptions::Integer(NumericOptions::default()),
            FieldType::Float => FieldOptions::Float(NumericOptions::default()),
            FieldType::Long => FieldOptions::Long(NumericOptions::default()),
            FieldType::Short => FieldOptions::Short(NumericOptions::default()),
            FieldType::Byte => FieldOptions::Byte(NumericOptions::default()),
            FieldType::Double => FieldOptions::Double(NumericOptions::default()),
            FieldType::Date => FieldOptions::Date(DateOptions::default()),
            FieldType::GeoPoint => FieldOptions::GeoPoint(GeoPointOptions::default()),
            FieldType::GeoShape => FieldOptions::GeoShape(GeoShapeOptions::default()),
            FieldType::Ip => FieldOptions::Ip(IpOptions::default()),
            FieldType::Binary => FieldOptions::Binary(BinaryOptions::default()),
            FieldType::TokenCount => FieldOptions::TokenCount(TokenCountOptions::default()),
        }
    }

    /// The field type this option set belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldOptions::String(_) => FieldType::String,
            FieldOptions::Boolean(_) => FieldType::Boolean,
            FieldOptions::Integer(_) => FieldType::Integer,
            FieldOptions::Float(_) => FieldType::Float,
            FieldOptions::Long(_) => FieldType::Long,
            FieldOptions::Short(_) => FieldType::Short,
            FieldOptions::Byte(_) => FieldType::Byte,
            FieldOptions::Double(_) => FieldType::Double,
            FieldOptions::Date(_) => FieldType::Date,
            FieldOptions::GeoPoint(_) => FieldType::GeoPoint,
            FieldOptions::GeoShape(_) => FieldType::GeoShape,
            FieldOptions::Ip(_) => FieldType::Ip,
            FieldOptions::Binary(_) => FieldType::Binary,
            FieldOptions::TokenCount(_) => FieldType::TokenCount,
        }
    }
}

impl From<FieldType> for FieldOptions {
    fn from(field_type: FieldType) -> Self {
        FieldOptions::for_type(field_type)
    }
}

impl From<StringOptions> for FieldOptions {
    fn from(options: StringOptions) -> Self {
        FieldOptions::String(options)
    }
}

impl From<BooleanOptions> for FieldOptions {
    fn from(options: BooleanOptions) -> Self {
        FieldOptions::Boolean(options)
    }
}

impl From<DateOptions> for FieldOptions {
    fn from(options: DateOptions) -> Self {
        FieldOptions::Date(options)
    }
}

impl From<GeoPointOptions> for FieldOptions {
    fn from(options: GeoPointOptions) -> Self {
        FieldOptions::GeoPoint(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_for_type_round_trips_field_type() {
        for field_type in FieldType::ALL {
            assert_eq!(FieldOptions::for_type(field_type).field_type(), field_type);
        }
    }

    #[test]
    fn test_deserialize_selects_variant_by_type() {
        let options: FieldOptions = serde_json::from_value(json!({
            "type": "string",
            "indexAnalyzer": "standard",
            "include_in_all": false
        }))
        .unwrap();

        match options {
            FieldOptions::String(string) => {
                assert_eq!(string.index_analyzer.as_deref(), Some("standard"));
                assert_eq!(string.include_in_all, Some(false));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let result = serde_json::from_value::<FieldOptions>(json!({ "type": "keyword" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_option_of_other_type() {
        // geohash belongs to geo_point, not integer
        let result = serde_json::from_value::<FieldOptions>(json!({
            "type": "integer",
            "geohash": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_fields() {
        let options: FieldOptions = serde_json::from_value(json!({
            "type": "string",
            "fields": {
                "raw": { "type": "string", "index": "not_analyzed" }
            }
        }))
        .unwrap();

        let FieldOptions::String(string) = options else {
            panic!("expected string options");
        };
        let raw = string.fields.get("raw").unwrap();
        assert_eq!(
            raw,
            &FieldOptions::String(StringOptions {
                index: Some(IndexMode::NotAnalyzed),
                ..Default::default()
            })
        );
    }
}
