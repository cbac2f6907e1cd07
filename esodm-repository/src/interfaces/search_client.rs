//! Search client trait definition.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::SearchIndexError;

/// Request parameters passed to a [`SearchClient`].
///
/// Follows the engine's REST parameter shape: `index`, `type`, `id`, `body`
/// plus optional request settings (`refresh`, `routing`,
/// `retry_on_conflict`). `type` is a string, or an array of strings for
/// multi-type searches.
pub type ClientParams = Map<String, Value>;

/// Abstracts the underlying search engine client (OpenSearch, Elasticsearch, ...).
///
/// Implementations are shared by the [`Manager`](crate::Manager) through an
/// `Arc` and must be usable from any task. Every method is one request to
/// the engine; nothing retries.
///
/// Single-document writes (`delete`, `update`, `index`) return the engine's
/// response body as-is, including the body of a 404, so the caller decides
/// what a missing document means. Other non-success statuses are errors.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Fetch a single document. A missing document is `Ok(None)`.
    async fn get(&self, params: &ClientParams) -> Result<Option<Value>, SearchIndexError>;

    /// Run a search request and return the response body.
    async fn search(&self, params: &ClientParams) -> Result<Value, SearchIndexError>;

    /// Run a count request and return the response body.
    async fn count(&self, params: &ClientParams) -> Result<Value, SearchIndexError>;

    /// Delete a document by id.
    async fn delete(&self, params: &ClientParams) -> Result<Value, SearchIndexError>;

    /// Partially update a document by id.
    async fn update(&self, params: &ClientParams) -> Result<Value, SearchIndexError>;

    /// Index (create or replace) a document.
    async fn index(&self, params: &ClientParams) -> Result<Value, SearchIndexError>;

    /// Create an index with the given settings and mappings body.
    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchIndexError>;

    /// Delete an index.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;
}
