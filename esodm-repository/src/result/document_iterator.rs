use std::fmt;
use std::marker::PhantomData;

use esodm_shared::Document;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::result::aggregation::AggregationSet;
use crate::result::converter::Converter;
use crate::result::SearchHits;

/// Iterator of documents hydrated from a search response.
///
/// Hits are converted one at a time as the iterator advances; a hit that
/// fails to hydrate yields an `Err` without stopping the iteration.
pub struct DocumentIterator<T> {
    hits: std::vec::IntoIter<Value>,
    total: u64,
    aggregations: AggregationSet,
    converter: Converter,
    _document: PhantomData<fn() -> T>,
}

impl<T: Document> DocumentIterator<T> {
    pub(crate) fn new(hits: SearchHits, converter: Converter) -> Self {
        Self {
            hits: hits.hits.into_iter(),
            total: hits.total,
            aggregations: hits.aggregations,
            converter,
            _document: PhantomData,
        }
    }

    /// Number of matching documents in the index, not only the returned page.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Hydrate the next hit without advancing.
    pub fn first(&self) -> Option<Result<T, SearchIndexError>> {
        self.hits
            .as_slice()
            .first()
            .map(|hit| self.converter.convert_to_document(hit))
    }

    /// Aggregation results of the response.
    pub fn aggregations(&self) -> &AggregationSet {
        &self.aggregations
    }

    /// Raw hits not yet consumed.
    pub fn raw_hits(&self) -> &[Value] {
        self.hits.as_slice()
    }
}

impl<T: Document> Iterator for DocumentIterator<T> {
    type Item = Result<T, SearchIndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let hit = self.hits.next()?;
        Some(self.converter.convert_to_document(&hit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl<T: Document> ExactSizeIterator for DocumentIterator<T> {}

impl<T> fmt::Debug for DocumentIterator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentIterator")
            .field("remaining", &self.hits.len())
            .field("total", &self.total)
            .field("aggregations", &self.aggregations.len())
            .finish()
    }
}
