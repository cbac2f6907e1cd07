//! Aggregation requests.
//!
//! Aggregation names are sent prefixed with [`AGGREGATION_PREFIX`] so that,
//! inside a response bucket, sub-aggregation results can be told apart from
//! bucket fields such as `key` or `doc_count`.

use serde_json::{json, Map, Value};

/// Prefix added to every aggregation name in the request body.
pub const AGGREGATION_PREFIX: &str = "agg_";

/// One range of a range aggregation. Either bound may be open.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRange {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub key: Option<String>,
}

impl AggregationRange {
    fn to_json(&self) -> Value {
        let mut range = Map::new();
        if let Some(key) = &self.key {
            range.insert("key".to_string(), json!(key));
        }
        if let Some(from) = self.from {
            range.insert("from".to_string(), json!(from));
        }
        if let Some(to) = self.to {
            range.insert("to".to_string(), json!(to));
        }
        Value::Object(range)
    }
}

/// The computation an aggregation performs.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationKind {
    Terms {
        field: String,
        size: Option<usize>,
    },
    Range {
        field: String,
        ranges: Vec<AggregationRange>,
        keyed: bool,
    },
    Avg { field: String },
    Sum { field: String },
    Min { field: String },
    Max { field: String },
    ValueCount { field: String },
    Stats { field: String },
}

impl AggregationKind {
    fn to_json(&self) -> (&'static str, Value) {
        match self {
            AggregationKind::Terms { field, size } => {
                let mut body = json!({ "field": field });
                if let Some(size) = size {
                    body["size"] = json!(size);
                }
                ("terms", body)
            }
            AggregationKind::Range {
                field,
                ranges,
                keyed,
            } => {
                let mut body = json!({
                    "field": field,
                    "ranges": ranges.iter().map(AggregationRange::to_json).collect::<Vec<_>>(),
                });
                if *keyed {
                    body["keyed"] = json!(true);
                }
                ("range", body)
            }
            AggregationKind::Avg { field } => ("avg", json!({ "field": field })),
            AggregationKind::Sum { field } => ("sum", json!({ "field": field })),
            AggregationKind::Min { field } => ("min", json!({ "field": field })),
            AggregationKind::Max { field } => ("max", json!({ "field": field })),
            AggregationKind::ValueCount { field } => ("value_count", json!({ "field": field })),
            AggregationKind::Stats { field } => ("stats", json!({ "field": field })),
        }
    }
}

/// A named aggregation with optional sub-aggregations.
///
/// # Example
///
/// ```
/// use esodm_shared::search::Aggregation;
///
/// let mut terms = Aggregation::terms("test_agg", "description");
/// let mut range = Aggregation::range("test_agg_2", "price");
/// range.add_range(None, Some(20.0));
/// range.add_range(Some(20.0), None);
/// terms.add_aggregation(range);
///
/// let (name, _) = terms.to_json();
/// assert_eq!(name, "agg_test_agg");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    name: String,
    kind: AggregationKind,
    aggregations: Vec<Aggregation>,
}

impl Aggregation {
    pub fn new(name: impl Into<String>, kind: AggregationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            aggregations: Vec::new(),
        }
    }

    pub fn terms(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            name,
            AggregationKind::Terms {
                field: field.into(),
                size: None,
            },
        )
    }

    /// Range aggregation with no ranges yet; add them with [`add_range`](Self::add_range).
    pub fn range(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(
            name,
            AggregationKind::Range {
                field: field.into(),
                ranges: Vec::new(),
                keyed: false,
            },
        )
    }

    pub fn avg(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Avg { field: field.into() })
    }

    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Sum { field: field.into() })
    }

    pub fn min(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Min { field: field.into() })
    }

    pub fn max(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Max { field: field.into() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AggregationKind {
        &self.kind
    }

    /// Add a range to a range aggregation. No-op for other kinds.
    pub fn add_range(&mut self, from: Option<f64>, to: Option<f64>) -> &mut Self {
        if let AggregationKind::Range { ranges, .. } = &mut self.kind {
            ranges.push(AggregationRange {
                from,
                to,
                key: None,
            });
        }
        self
    }

    /// Limit the number of buckets of a terms aggregation. No-op for other kinds.
    pub fn set_size(&mut self, bucket_count: usize) -> &mut Self {
        if let AggregationKind::Terms { size, .. } = &mut self.kind {
            *size = Some(bucket_count);
        }
        self
    }

    /// Nest a sub-aggregation.
    pub fn add_aggregation(&mut self, aggregation: Aggregation) -> &mut Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    /// Prefixed name and request body of this aggregation.
    pub fn to_json(&self) -> (String, Value) {
        let (kind, body) = self.kind.to_json();
        let mut aggregation = Map::new();
        aggregation.insert(kind.to_string(), body);

        if !self.aggregations.is_empty() {
            aggregation.insert(
                "aggregations".to_string(),
                Value::Object(aggregations_json(&self.aggregations)),
            );
        }

        (
            format!("{}{}", AGGREGATION_PREFIX, self.name),
            Value::Object(aggregation),
        )
    }
}

/// Request body for a list of sibling aggregations.
pub(crate) fn aggregations_json(aggregations: &[Aggregation]) -> Map<String, Value> {
    aggregations.iter().map(Aggregation::to_json).collect()
}
