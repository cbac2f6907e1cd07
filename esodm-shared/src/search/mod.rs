//! Search request builder.
//!
//! A [`Search`] accumulates query clauses, sorts, paging and aggregations and
//! serializes them into the request body sent to the engine.

mod aggregation;
mod query;
mod sort;

pub use aggregation::{Aggregation, AggregationKind, AggregationRange, AGGREGATION_PREFIX};
pub use query::Query;
pub use sort::{FieldSort, SortOrder};

use serde_json::{json, Map, Value};

/// Search request under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Search {
    queries: Vec<Query>,
    sorts: Vec<FieldSort>,
    size: Option<usize>,
    from: Option<usize>,
    aggregations: Vec<Aggregation>,
}

impl Search {
    /// Empty search: matches everything with the engine's default paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query clause. Multiple clauses must all match.
    pub fn add_query(&mut self, query: Query) -> &mut Self {
        self.queries.push(query);
        self
    }

    pub fn add_sort(&mut self, sort: FieldSort) -> &mut Self {
        self.sorts.push(sort);
        self
    }

    pub fn add_aggregation(&mut self, aggregation: Aggregation) -> &mut Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn set_size(&mut self, size: usize) -> &mut Self {
        self.size = Some(size);
        self
    }

    pub fn set_from(&mut self, from: usize) -> &mut Self {
        self.from = Some(from);
        self
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn sorts(&self) -> &[FieldSort] {
        &self.sorts
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn from(&self) -> Option<usize> {
        self.from
    }

    /// Request body. Empty parts are left out, so an empty search
    /// serializes to `{}`.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();

        match self.queries.as_slice() {
            [] => {}
            [query] => {
                body.insert("query".to_string(), query.to_json());
            }
            queries => {
                let must: Vec<Value> = queries.iter().map(Query::to_json).collect();
                body.insert("query".to_string(), json!({ "bool": { "must": must } }));
            }
        }

        if !self.sorts.is_empty() {
            let sort: Vec<Value> = self.sorts.iter().map(FieldSort::to_json).collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }

        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }

        if !self.aggregations.is_empty() {
            body.insert(
                "aggregations".to_string(),
                Value::Object(aggregation::aggregations_json(&self.aggregations)),
            );
        }

        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_search() {
        assert_eq!(Search::new().to_json(), json!({}));
    }

    #[test]
    fn test_single_query_is_not_wrapped() {
        let mut search = Search::new();
        search.add_query(Query::query_string("medic", "job"));
        assert_eq!(
            search.to_json(),
            json!({ "query": { "query_string": { "query": "medic", "default_field": "job" } } })
        );
    }

    #[test]
    fn test_full_search() {
        let mut search = Search::new();
        search
            .add_query(Query::any_of("group", ["best", "worst"]))
            .add_query(Query::query_string("medic", "job"))
            .add_sort(FieldSort::new("name", SortOrder::Asc))
            .add_sort(FieldSort::new("surname", SortOrder::Desc))
            .set_size(5)
            .set_from(30);

        assert_eq!(
            search.to_json(),
            json!({
                "query": {
                    "bool": {
                        "must": [
                            { "query_string": { "query": "best OR worst", "default_field": "group" } },
                            { "query_string": { "query": "medic", "default_field": "job" } }
                        ]
                    }
                },
                "sort": [
                    { "name": { "order": "asc" } },
                    { "surname": { "order": "desc" } }
                ],
                "size": 5,
                "from": 30
            })
        );
    }

    #[test]
    fn test_aggregations_are_prefixed() {
        let mut search = Search::new();
        search.add_aggregation(Aggregation::max("top_price", "price"));
        assert_eq!(
            search.to_json(),
            json!({ "aggregations": { "agg_top_price": { "max": { "field": "price" } } } })
        );
    }
}
