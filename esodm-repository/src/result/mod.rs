//! Materialization of search responses.
//!
//! A search response is turned into one of the shapes selected by
//! [`ResultKind`]: hydrated documents, an array of sources, the raw JSON, or
//! the raw hits.

mod aggregation;
mod converter;
mod document_iterator;
mod path;
mod raw_iterator;

pub use aggregation::{
    AggregationError, AggregationMatch, AggregationResult, AggregationSet, Bucket,
    ValueAggregation,
};
pub use converter::{Converter, ID_FIELD};
pub use document_iterator::DocumentIterator;
pub use path::{AggregationPath, BucketSelector, PathStep};
pub use raw_iterator::RawIterator;

use esodm_shared::{Document, ResultKind};
use serde_json::Value;

use crate::errors::SearchIndexError;

/// A search response in the shape requested by a [`ResultKind`].
#[derive(Debug)]
pub enum SearchResults<T> {
    Object(DocumentIterator<T>),
    /// `_source` of every hit with its `_id` injected.
    Array(Vec<Value>),
    Raw(Value),
    RawIterator(RawIterator),
}

impl<T: Document> SearchResults<T> {
    /// Materialize a search response.
    pub fn from_response(
        response: Value,
        kind: ResultKind,
        converter: Converter,
    ) -> Result<Self, SearchIndexError> {
        match kind {
            ResultKind::Raw => Ok(SearchResults::Raw(response)),
            ResultKind::Object => Ok(SearchResults::Object(DocumentIterator::new(
                SearchHits::from_response(response)?,
                converter,
            ))),
            ResultKind::RawIterator => Ok(SearchResults::RawIterator(RawIterator::new(
                SearchHits::from_response(response)?,
            ))),
            ResultKind::Array => {
                let hits = SearchHits::from_response(response)?;
                let sources = hits
                    .hits
                    .iter()
                    .map(|hit| converter.hit_source(hit).map(Value::Object))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SearchResults::Array(sources))
            }
        }
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            SearchResults::Object(_) => ResultKind::Object,
            SearchResults::Array(_) => ResultKind::Array,
            SearchResults::Raw(_) => ResultKind::Raw,
            SearchResults::RawIterator(_) => ResultKind::RawIterator,
        }
    }

    pub fn into_documents(self) -> Option<DocumentIterator<T>> {
        match self {
            SearchResults::Object(documents) => Some(documents),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            SearchResults::Array(sources) => Some(sources),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<Value> {
        match self {
            SearchResults::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn into_raw_iterator(self) -> Option<RawIterator> {
        match self {
            SearchResults::RawIterator(hits) => Some(hits),
            _ => None,
        }
    }
}

/// The hits section of a search response.
#[derive(Debug, Default)]
pub(crate) struct SearchHits {
    pub(crate) hits: Vec<Value>,
    pub(crate) total: u64,
    pub(crate) aggregations: AggregationSet,
}

impl SearchHits {
    pub(crate) fn from_response(mut response: Value) -> Result<Self, SearchIndexError> {
        let aggregations = AggregationSet::from_response(
            response.get("aggregations").unwrap_or(&Value::Null),
        )?;

        let section = match response.get_mut("hits") {
            Some(section) => section.take(),
            None => return Err(SearchIndexError::parse("Search response has no 'hits'")),
        };

        // `total` is a plain number on older engines and `{ "value": n }` on newer ones.
        let total = match section.get("total") {
            Some(Value::Number(total)) => total.as_u64(),
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            _ => None,
        };

        let hits = match section {
            Value::Object(mut section) => match section.remove("hits") {
                Some(Value::Array(hits)) => hits,
                None => Vec::new(),
                Some(_) => return Err(SearchIndexError::parse("'hits.hits' is not an array")),
            },
            _ => return Err(SearchIndexError::parse("'hits' is not an object")),
        };

        Ok(Self {
            total: total.unwrap_or(hits.len() as u64),
            hits,
            aggregations,
        })
    }
}
