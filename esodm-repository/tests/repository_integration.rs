//! Repository tests against a recording mock client.
//!
//! The mock answers every request with a canned response and records the
//! parameters it was called with, so the tests can check both the request
//! the repository builds and how the response is materialized.

use std::sync::Arc;

use async_trait::async_trait;
use esodm_repository::{
    ClientParams, CountResponse, Criteria, Manager, OrderBy, Repository, SearchClient,
    SearchIndexError, SearchResults,
};
use esodm_shared::mapping::{IndexMode, StringOptions};
use esodm_shared::{
    Aggregation, Document, DocumentMetadata, FieldType, MetadataCollector, Property, ResultKind,
    SortOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
}

impl Document for Product {
    const CLASS_NAME: &'static str = "AcmeTestBundle:Product";

    fn metadata() -> DocumentMetadata {
        DocumentMetadata::new(Self::CLASS_NAME, "product")
            .with_property(Property::new("title", FieldType::String))
            .with_property(Property::new(
                "description",
                StringOptions {
                    index: Some(IndexMode::NotAnalyzed),
                    ..Default::default()
                },
            ))
            .with_property(Property::new("price", FieldType::Float))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Unregistered {}

impl Document for Unregistered {
    const CLASS_NAME: &'static str = "AcmeTestBundle:Unregistered";

    fn metadata() -> DocumentMetadata {
        DocumentMetadata::new(Self::CLASS_NAME, "unregistered")
    }
}

/// Mock client returning canned responses and recording request parameters.
#[derive(Default)]
struct MockClient {
    get_response: Option<Value>,
    search_response: Option<Value>,
    count_response: Option<Value>,
    write_response: Option<Value>,
    fail_with: Option<SearchIndexError>,
    calls: Mutex<Vec<(&'static str, ClientParams)>>,
}

impl MockClient {
    async fn record(
        &self,
        operation: &'static str,
        params: &ClientParams,
    ) -> Result<(), SearchIndexError> {
        self.calls.lock().await.push((operation, params.clone()));
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn last_call(&self) -> (&'static str, Value) {
        let calls = self.calls.lock().await;
        let (operation, params) = calls.last().expect("no calls recorded");
        (*operation, Value::Object(params.clone()))
    }
}

#[async_trait]
impl SearchClient for MockClient {
    async fn get(&self, params: &ClientParams) -> Result<Option<Value>, SearchIndexError> {
        self.record("get", params).await?;
        Ok(self.get_response.clone())
    }

    async fn search(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        self.record("search", params).await?;
        Ok(self
            .search_response
            .clone()
            .unwrap_or_else(|| json!({ "hits": { "total": 0, "hits": [] } })))
    }

    async fn count(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        self.record("count", params).await?;
        Ok(self.count_response.clone().unwrap_or_else(|| json!({ "count": 0 })))
    }

    async fn delete(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        self.record("delete", params).await?;
        Ok(self.write_response.clone().unwrap_or_else(|| json!({})))
    }

    async fn update(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        self.record("update", params).await?;
        Ok(self.write_response.clone().unwrap_or_else(|| json!({})))
    }

    async fn index(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        self.record("index", params).await?;
        Ok(json!({ "result": "created" }))
    }

    async fn create_index(&self, _index: &str, _body: &Value) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn delete_index(&self, _index: &str) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}

fn repository(client: Arc<MockClient>) -> Repository<Product> {
    let metadata = MetadataCollector::new()
        .with_document::<Product>()
        .expect("register product");
    let manager = Arc::new(Manager::new(client, "shop", metadata));
    manager.repository::<Product>().expect("product repository")
}

fn params(value: Value) -> ClientParams {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn product_hits() -> Value {
    json!({
        "hits": {
            "total": { "value": 3, "relation": "eq" },
            "hits": [
                { "_id": "1", "_source": { "title": "foo", "description": "weak", "price": 10.45 } },
                { "_id": "2", "_source": { "title": "bar", "description": "weak", "price": 32.0 } },
                { "_id": "3", "_source": { "title": "baz", "description": "solid", "price": 15.1 } }
            ]
        }
    })
}

fn price_ranges(low: u64, high: u64) -> Value {
    json!({
        "buckets": [
            { "key": "*-20.0", "to": 20.0, "to_as_string": "20.0", "doc_count": low },
            { "key": "20.0-*", "from": 20.0, "from_as_string": "20.0", "doc_count": high }
        ]
    })
}

#[tokio::test]
async fn test_repository_for_unregistered_document_fails() {
    let metadata = MetadataCollector::new().with_document::<Product>().unwrap();
    let manager = Arc::new(Manager::new(Arc::new(MockClient::default()), "shop", metadata));

    let result = manager.repository::<Unregistered>();
    assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
}

#[tokio::test]
async fn test_repository_resolves_document_type() {
    let repository = repository(Arc::new(MockClient::default()));
    assert_eq!(repository.doc_type(), "product");
    assert_eq!(repository.class_name(), "AcmeTestBundle:Product");
}

#[tokio::test]
async fn test_find_returns_document() {
    let client = Arc::new(MockClient {
        get_response: Some(json!({
            "_index": "shop-product",
            "_id": "1",
            "found": true,
            "_source": { "title": "foo", "price": 10.45 }
        })),
        ..Default::default()
    });
    let repository = repository(client.clone());

    let product = repository.find("1").await.unwrap().unwrap();
    assert_eq!(product.id.as_deref(), Some("1"));
    assert_eq!(product.title, "foo");

    let (operation, params) = client.last_call().await;
    assert_eq!(operation, "get");
    assert_eq!(params, json!({ "index": "shop", "type": "product", "id": "1" }));
}

#[tokio::test]
async fn test_find_missing_document_is_none() {
    let repository = repository(Arc::new(MockClient::default()));
    assert_eq!(repository.find("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_find_by_empty_criteria_is_unfiltered() {
    let client = Arc::new(MockClient {
        search_response: Some(product_hits()),
        ..Default::default()
    });
    let repository = repository(client.clone());

    let documents = repository
        .find_by(&Criteria::new(), &OrderBy::new(), None, None)
        .await
        .unwrap();
    assert_eq!(documents.total(), 3);

    let titles: Vec<String> = documents.map(|d| d.unwrap().title).collect();
    assert_eq!(titles, vec!["foo", "bar", "baz"]);

    let (operation, params) = client.last_call().await;
    assert_eq!(operation, "search");
    assert_eq!(
        params,
        json!({ "index": "shop", "type": ["product"], "body": {} })
    );
}

#[tokio::test]
async fn test_find_by_list_criteria_is_or_query() {
    let client = Arc::new(MockClient::default());
    let repository = repository(client.clone());

    let mut criteria = Criteria::new();
    criteria.insert("group".to_string(), ["best", "worst"].into());
    criteria.insert("title".to_string(), "foo".into());
    let order_by: OrderBy = vec![("price".to_string(), SortOrder::Asc)];

    repository
        .find_by(&criteria, &order_by, Some(5), Some(10))
        .await
        .unwrap();

    let (_, params) = client.last_call().await;
    assert_eq!(
        params["body"],
        json!({
            "query": { "bool": { "must": [
                { "query_string": { "query": "best OR worst", "default_field": "group" } },
                { "query_string": { "query": "foo", "default_field": "title" } }
            ] } },
            "sort": [{ "price": { "order": "asc" } }],
            "size": 5,
            "from": 10
        })
    );
}

#[tokio::test]
async fn test_find_by_does_not_escape_values() {
    let client = Arc::new(MockClient::default());
    let repository = repository(client.clone());

    let mut criteria = Criteria::new();
    criteria.insert("title".to_string(), "foo AND (bar)".into());
    repository
        .find_by(&criteria, &OrderBy::new(), None, None)
        .await
        .unwrap();

    let (_, params) = client.last_call().await;
    assert_eq!(
        params["body"]["query"]["query_string"]["query"],
        json!("foo AND (bar)")
    );
}

#[tokio::test]
async fn test_find_one_by_without_match_is_none() {
    let client = Arc::new(MockClient::default());
    let repository = repository(client.clone());

    let mut criteria = Criteria::new();
    criteria.insert("title".to_string(), "nothing".into());

    let found = repository
        .find_one_by(&criteria, &OrderBy::new())
        .await
        .unwrap();
    assert_eq!(found, None);

    let (_, params) = client.last_call().await;
    assert_eq!(params["body"]["size"], json!(1));
}

#[tokio::test]
async fn test_find_one_by_returns_first() {
    let client = Arc::new(MockClient {
        search_response: Some(product_hits()),
        ..Default::default()
    });
    let repository = repository(client);

    let found = repository
        .find_one_by(&Criteria::new(), &OrderBy::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_execute_result_kinds() {
    let client = Arc::new(MockClient {
        search_response: Some(product_hits()),
        ..Default::default()
    });
    let repository = repository(client);
    let search = repository.create_search();

    let array = repository
        .execute(&search, ResultKind::Array)
        .await
        .unwrap()
        .into_array()
        .unwrap();
    assert_eq!(array[0]["_id"], json!("1"));
    assert_eq!(array[0]["title"], json!("foo"));

    let raw = repository
        .execute(&search, ResultKind::Raw)
        .await
        .unwrap()
        .into_raw()
        .unwrap();
    assert_eq!(raw, product_hits());

    let hits = repository
        .execute(&search, ResultKind::RawIterator)
        .await
        .unwrap()
        .into_raw_iterator()
        .unwrap();
    assert_eq!(hits.len(), 3);

    let results = repository.execute(&search, ResultKind::Object).await.unwrap();
    assert!(matches!(results, SearchResults::Object(_)));
}

#[tokio::test]
async fn test_count() {
    let client = Arc::new(MockClient {
        count_response: Some(json!({ "count": 3, "_shards": { "total": 1, "successful": 1 } })),
        ..Default::default()
    });
    let repository = repository(client.clone());
    let search = repository.create_search();

    let count = repository.count(&search, ClientParams::new(), false).await.unwrap();
    assert_eq!(count, CountResponse::Count(3));

    let (operation, params) = client.last_call().await;
    assert_eq!(operation, "count");
    assert_eq!(params, json!({ "index": "shop", "type": "product", "body": {} }));

    let raw = repository.count(&search, ClientParams::new(), true).await.unwrap();
    assert_eq!(
        raw,
        CountResponse::Raw(json!({ "count": 3, "_shards": { "total": 1, "successful": 1 } }))
    );
    assert_eq!(raw.count(), Some(3));
}

#[tokio::test]
async fn test_count_params_override_defaults() {
    let client = Arc::new(MockClient {
        count_response: Some(json!({ "count": 1 })),
        ..Default::default()
    });
    let repository = repository(client.clone());

    repository
        .count(
            &repository.create_search(),
            params(json!({ "index": "other", "routing": "r1" })),
            false,
        )
        .await
        .unwrap();

    let (_, params) = client.last_call().await;
    assert_eq!(params["index"], json!("other"));
    assert_eq!(params["routing"], json!("r1"));
    assert_eq!(params["type"], json!("product"));
}

#[tokio::test]
async fn test_count_without_count_key_fails() {
    let client = Arc::new(MockClient {
        count_response: Some(json!({ "error": "nope" })),
        ..Default::default()
    });
    let repository = repository(client);

    let result = repository
        .count(&repository.create_search(), ClientParams::new(), false)
        .await;
    assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
}

#[tokio::test]
async fn test_remove_returns_not_found_body() {
    let not_found = json!({ "_index": "shop-product", "_id": "9", "result": "not_found" });
    let client = Arc::new(MockClient {
        write_response: Some(not_found.clone()),
        ..Default::default()
    });
    let repository = repository(client.clone());

    let response = repository.remove("9").await.unwrap();
    assert_eq!(response, not_found);

    let (operation, params) = client.last_call().await;
    assert_eq!(operation, "delete");
    assert_eq!(params, json!({ "index": "shop", "type": "product", "id": "9" }));
}

#[tokio::test]
async fn test_update_body() {
    let client = Arc::new(MockClient {
        write_response: Some(json!({ "result": "updated" })),
        ..Default::default()
    });
    let repository = repository(client.clone());

    let mut fields = Map::new();
    fields.insert("title".to_string(), json!("new title"));
    let response = repository
        .update("1", fields, None, params(json!({ "refresh": true })))
        .await
        .unwrap();
    assert_eq!(response["result"], json!("updated"));

    let (operation, params) = client.last_call().await;
    assert_eq!(operation, "update");
    assert_eq!(
        params,
        json!({
            "index": "shop",
            "type": "product",
            "id": "1",
            "body": { "doc": { "title": "new title" } },
            "refresh": true
        })
    );
}

#[tokio::test]
async fn test_update_with_script_only() {
    let client = Arc::new(MockClient::default());
    let repository = repository(client.clone());

    let script = json!({ "source": "ctx._source.price += params.inc", "params": { "inc": 1 } });
    repository
        .update("1", Map::new(), Some(script.clone()), ClientParams::new())
        .await
        .unwrap();

    let (_, params) = client.last_call().await;
    assert_eq!(params["body"], json!({ "script": script }));
}

#[tokio::test]
async fn test_client_errors_propagate() {
    let client = Arc::new(MockClient {
        fail_with: Some(SearchIndexError::connection("connection refused")),
        ..Default::default()
    });
    let repository = repository(client);

    assert!(matches!(
        repository.find("1").await,
        Err(SearchIndexError::ConnectionError(_))
    ));
    assert!(matches!(
        repository.remove("1").await,
        Err(SearchIndexError::ConnectionError(_))
    ));
    assert!(matches!(
        repository
            .update("1", Map::new(), None, ClientParams::new())
            .await,
        Err(SearchIndexError::ConnectionError(_))
    ));
}

#[tokio::test]
async fn test_aggregation_path_iteration() {
    let client = Arc::new(MockClient {
        search_response: Some(json!({
            "hits": { "total": 3, "hits": [] },
            "aggregations": {
                "agg_test_agg": {
                    "doc_count_error_upper_bound": 0,
                    "sum_other_doc_count": 0,
                    "buckets": [
                        { "key": "weak", "doc_count": 2, "agg_test_agg_2": price_ranges(1, 1) },
                        { "key": "solid", "doc_count": 1, "agg_test_agg_2": price_ranges(1, 0) }
                    ]
                }
            }
        })),
        ..Default::default()
    });
    let repository = repository(client.clone());

    let mut terms = Aggregation::terms("test_agg", "description");
    let mut ranges = Aggregation::range("test_agg_2", "price");
    ranges.add_range(None, Some(20.0)).add_range(Some(20.0), None);
    terms.add_aggregation(ranges);

    let mut search = repository.create_search();
    search.add_aggregation(terms);

    let documents = repository
        .execute(&search, ResultKind::Object)
        .await
        .unwrap()
        .into_documents()
        .unwrap();
    let aggregations = documents.aggregations();

    let top = aggregations.find_str("test_agg").unwrap();
    let top: Vec<(&str, u64)> = top.iter().map(|(k, b)| (k, b.doc_count())).collect();
    assert_eq!(top, vec![("weak", 2), ("solid", 1)]);

    let nested = aggregations.find_str("test_agg.0.test_agg_2").unwrap();
    let nested: Vec<(&str, u64)> = nested.iter().map(|(k, b)| (k, b.doc_count())).collect();
    assert_eq!(nested, vec![("*-20.0", 1), ("20.0-*", 1)]);

    let (_, params) = client.last_call().await;
    assert!(params["body"]["aggregations"]["agg_test_agg"]["aggregations"]
        .get("agg_test_agg_2")
        .is_some());
}

#[tokio::test]
async fn test_bulk_persist_over_limit_fails() {
    let client = Arc::new(MockClient::default());
    let metadata = MetadataCollector::new().with_document::<Product>().unwrap();
    let manager = Manager::with_config(
        client.clone(),
        "shop",
        metadata,
        esodm_repository::ManagerConfig::with_max_batch_size(1),
    );

    let products = vec![
        Product {
            id: None,
            title: "a".to_string(),
            description: None,
            price: None,
        };
        2
    ];
    let result = manager.bulk_persist(&products).await;
    assert!(matches!(
        result,
        Err(SearchIndexError::BatchSizeExceeded { provided: 2, max: 1 })
    ));
    assert!(client.calls.lock().await.is_empty());
}
