use serde_json::Value;

use crate::result::aggregation::AggregationSet;
use crate::result::SearchHits;

/// Iterator over the raw hit objects of a search response.
#[derive(Debug)]
pub struct RawIterator {
    hits: std::vec::IntoIter<Value>,
    total: u64,
    aggregations: AggregationSet,
}

impl RawIterator {
    pub(crate) fn new(hits: SearchHits) -> Self {
        Self {
            hits: hits.hits.into_iter(),
            total: hits.total,
            aggregations: hits.aggregations,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn aggregations(&self) -> &AggregationSet {
        &self.aggregations
    }
}

impl Iterator for RawIterator {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}

impl ExactSizeIterator for RawIterator {}
