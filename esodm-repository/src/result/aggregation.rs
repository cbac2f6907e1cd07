//! Aggregation results.
//!
//! The `aggregations` section of a search response is parsed into a typed
//! tree: an [`AggregationSet`] maps names to either a list of buckets or a
//! single value aggregation, and every [`Bucket`] carries its own set of
//! sub-aggregations. [`AggregationSet::find`] walks the tree along an
//! [`AggregationPath`].

use std::collections::BTreeMap;

use esodm_shared::search::AGGREGATION_PREFIX;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::result::path::{AggregationPath, BucketSelector};

/// Errors raised while reading aggregation results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// The response does not have the expected aggregation shape.
    #[error("Malformed aggregation response: {0}")]
    MalformedResponse(String),

    /// The path string could not be parsed.
    #[error("Invalid aggregation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// No aggregation with this name at this level.
    #[error("Unknown aggregation '{name}' in path '{path}'")]
    UnknownAggregation { name: String, path: String },

    /// Bucket index past the end of the bucket list.
    #[error("Bucket index {index} out of range for '{name}' ({len} buckets)")]
    BucketIndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    /// No bucket with this key.
    #[error("Unknown bucket key '{key}' in '{name}'")]
    UnknownBucketKey { name: String, key: String },

    /// A bucket selector or descent was applied to a value aggregation.
    #[error("Aggregation '{name}' has no buckets")]
    NotBucketAggregation { name: String },

    /// The path descends past a bucket list without selecting a bucket.
    #[error("Aggregation '{name}' needs a bucket index or key before descending")]
    MissingBucketSelector { name: String },
}

/// Named aggregation results at one level of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationSet {
    aggregations: BTreeMap<String, AggregationResult>,
}

/// Result of one aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationResult {
    /// Bucketing aggregation (terms, range, ...).
    Buckets(Vec<Bucket>),
    /// Single-value or multi-value metric aggregation.
    Value(ValueAggregation),
}

/// One bucket of a bucketing aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    key: String,
    doc_count: u64,
    data: Map<String, Value>,
    aggregations: AggregationSet,
}

/// Leaf aggregation result.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAggregation {
    data: Map<String, Value>,
}

/// What an [`AggregationPath`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregationMatch<'a> {
    /// Every bucket of a bucketing aggregation.
    Buckets(&'a [Bucket]),
    /// A single selected bucket.
    Bucket(&'a Bucket),
    /// A value aggregation.
    Value(&'a ValueAggregation),
}

impl AggregationSet {
    /// Parse the `aggregations` object of a search response.
    ///
    /// A missing section (`null`) yields an empty set. Names are stripped of
    /// the request prefix.
    pub fn from_response(raw: &Value) -> Result<Self, AggregationError> {
        match raw {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => {
                let mut aggregations = BTreeMap::new();
                for (name, value) in map {
                    aggregations.insert(strip_prefix(name).to_string(), parse_result(name, value)?);
                }
                Ok(Self { aggregations })
            }
            other => Err(AggregationError::MalformedResponse(format!(
                "expected an object of aggregations, got {}",
                other
            ))),
        }
    }

    /// Parse a raw bucket list, as found under `buckets` in a response.
    pub fn buckets_from_raw(raw: &Value) -> Result<Vec<Bucket>, AggregationError> {
        parse_buckets("buckets", raw)
    }

    pub fn get(&self, name: &str) -> Option<&AggregationResult> {
        self.aggregations.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregationResult)> {
        self.aggregations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }

    /// Resolve a dotted path, e.g. `"test_agg.0.test_agg_2"`.
    pub fn find_str(&self, path: &str) -> Result<AggregationMatch<'_>, AggregationError> {
        let path: AggregationPath = path.parse()?;
        self.find(&path)
    }

    /// Resolve a path against this set.
    ///
    /// The first step names an aggregation at this level. A step's bucket
    /// selector picks one bucket, and the next step names a sub-aggregation
    /// of that bucket.
    pub fn find(&self, path: &AggregationPath) -> Result<AggregationMatch<'_>, AggregationError> {
        let steps = path.steps();
        let mut current = self;

        for (position, step) in steps.iter().enumerate() {
            let last = position + 1 == steps.len();
            let result =
                current
                    .get(&step.name)
                    .ok_or_else(|| AggregationError::UnknownAggregation {
                        name: step.name.clone(),
                        path: path.to_string(),
                    })?;

            let bucket = match (result, &step.bucket) {
                (AggregationResult::Value(value), None) if last => {
                    return Ok(AggregationMatch::Value(value));
                }
                (AggregationResult::Value(_), _) => {
                    return Err(AggregationError::NotBucketAggregation {
                        name: step.name.clone(),
                    });
                }
                (AggregationResult::Buckets(buckets), None) if last => {
                    return Ok(AggregationMatch::Buckets(buckets));
                }
                (AggregationResult::Buckets(_), None) => {
                    return Err(AggregationError::MissingBucketSelector {
                        name: step.name.clone(),
                    });
                }
                (AggregationResult::Buckets(buckets), Some(BucketSelector::Index(index))) => buckets
                    .get(*index)
                    .ok_or_else(|| AggregationError::BucketIndexOutOfRange {
                        name: step.name.clone(),
                        index: *index,
                        len: buckets.len(),
                    })?,
                (AggregationResult::Buckets(buckets), Some(BucketSelector::Key(key))) => buckets
                    .iter()
                    .find(|b| b.key == *key)
                    .ok_or_else(|| AggregationError::UnknownBucketKey {
                        name: step.name.clone(),
                        key: key.clone(),
                    })?,
            };

            if last {
                return Ok(AggregationMatch::Bucket(bucket));
            }
            current = &bucket.aggregations;
        }

        Err(AggregationError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        })
    }
}

impl AggregationResult {
    /// Buckets of a bucketing aggregation.
    pub fn buckets(&self) -> Option<&[Bucket]> {
        match self {
            AggregationResult::Buckets(buckets) => Some(buckets),
            AggregationResult::Value(_) => None,
        }
    }

    /// The value aggregation, if this is one.
    pub fn as_value(&self) -> Option<&ValueAggregation> {
        match self {
            AggregationResult::Value(value) => Some(value),
            AggregationResult::Buckets(_) => None,
        }
    }
}

impl Bucket {
    /// Bucket key. Numeric keys are rendered as their JSON text.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Bucket fields (`key`, `doc_count`, `from`, `to`, ...) without sub-aggregations.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The bucket fields as a JSON value.
    pub fn value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// A single bucket field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Sub-aggregations of this bucket.
    pub fn aggregations(&self) -> &AggregationSet {
        &self.aggregations
    }
}

impl ValueAggregation {
    /// The `value` field of a single-value metric.
    pub fn value(&self) -> Option<&Value> {
        self.data.get("value")
    }

    /// Every field of the aggregation result.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

impl<'a> AggregationMatch<'a> {
    /// Matched buckets keyed by bucket key, in response order. A value
    /// aggregation yields nothing.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (&'a str, &'a Bucket)> + 'a> {
        match *self {
            AggregationMatch::Buckets(buckets) => {
                Box::new(buckets.iter().map(|b| (b.key(), b)))
            }
            AggregationMatch::Bucket(bucket) => {
                Box::new(std::iter::once((bucket.key(), bucket)))
            }
            AggregationMatch::Value(_) => Box::new(std::iter::empty()),
        }
    }

    /// Matched bucket with the given key.
    pub fn get(&self, key: &str) -> Option<&'a Bucket> {
        self.iter().find(|(k, _)| *k == key).map(|(_, b)| b)
    }

    pub fn as_value(&self) -> Option<&'a ValueAggregation> {
        match *self {
            AggregationMatch::Value(value) => Some(value),
            _ => None,
        }
    }
}

fn strip_prefix(name: &str) -> &str {
    name.strip_prefix(AGGREGATION_PREFIX).unwrap_or(name)
}

fn parse_result(name: &str, raw: &Value) -> Result<AggregationResult, AggregationError> {
    let object = raw.as_object().ok_or_else(|| {
        AggregationError::MalformedResponse(format!("aggregation '{}' is not an object", name))
    })?;

    match object.get("buckets") {
        Some(buckets) => Ok(AggregationResult::Buckets(parse_buckets(name, buckets)?)),
        None => Ok(AggregationResult::Value(ValueAggregation {
            data: object.clone(),
        })),
    }
}

fn parse_buckets(name: &str, raw: &Value) -> Result<Vec<Bucket>, AggregationError> {
    match raw {
        Value::Array(items) => items.iter().map(|item| parse_bucket(name, item, None)).collect(),
        // keyed range/filters aggregations
        Value::Object(items) => items
            .iter()
            .map(|(key, item)| parse_bucket(name, item, Some(key)))
            .collect(),
        _ => Err(AggregationError::MalformedResponse(format!(
            "buckets of '{}' are neither a list nor an object",
            name
        ))),
    }
}

fn parse_bucket(name: &str, raw: &Value, keyed_as: Option<&str>) -> Result<Bucket, AggregationError> {
    let object = raw.as_object().ok_or_else(|| {
        AggregationError::MalformedResponse(format!("bucket of '{}' is not an object", name))
    })?;

    let key = match (object.get("key"), keyed_as) {
        (Some(Value::String(key)), _) => key.clone(),
        (Some(Value::Number(key)), _) => key.to_string(),
        (_, Some(key)) => key.to_string(),
        _ => {
            return Err(AggregationError::MalformedResponse(format!(
                "bucket of '{}' has no key",
                name
            )))
        }
    };
    let doc_count = match object.get("doc_count") {
        None => 0,
        Some(count) => count.as_u64().ok_or_else(|| {
            AggregationError::MalformedResponse(format!(
                "bucket '{}' of '{}' has a non-integer doc_count: {}",
                key, name, count
            ))
        })?,
    };

    let mut data = Map::new();
    let mut aggregations = BTreeMap::new();
    for (field, value) in object {
        match field.strip_prefix(AGGREGATION_PREFIX) {
            Some(sub_name) if value.is_object() => {
                aggregations.insert(sub_name.to_string(), parse_result(field, value)?);
            }
            _ => {
                data.insert(field.clone(), value.clone());
            }
        }
    }

    Ok(Bucket {
        key,
        doc_count,
        data,
        aggregations: AggregationSet { aggregations },
    })
}
