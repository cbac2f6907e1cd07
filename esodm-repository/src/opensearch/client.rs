//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchClient`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::{
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    params::Refresh,
    CountParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::{ClientParams, SearchClient};
use crate::utils;

/// OpenSearch client implementation.
///
/// Resolves the `index`/`type` parameters of each request to the concrete
/// index of the document type (see [`utils::physical_index_name`]) and
/// forwards the request body unchanged.
///
/// # Example
///
/// ```ignore
/// use esodm_repository::OpenSearchClient;
///
/// let client = OpenSearchClient::new("http://localhost:9200")?;
/// let manager = Manager::new(Arc::new(client), "shop", metadata);
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(url = %url, "Created OpenSearch client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Check that the cluster answers a ping.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                status
            )));
        }
        Ok(())
    }

    /// Read the `refresh` request setting.
    fn refresh_param(params: &ClientParams) -> Result<Option<Refresh>, SearchIndexError> {
        match params.get("refresh") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(true)) => Ok(Some(Refresh::True)),
            Some(Value::Bool(false)) => Ok(Some(Refresh::False)),
            Some(Value::String(s)) => match s.as_str() {
                "true" => Ok(Some(Refresh::True)),
                "false" => Ok(Some(Refresh::False)),
                "wait_for" => Ok(Some(Refresh::WaitFor)),
                other => Err(SearchIndexError::validation(format!(
                    "Invalid refresh value '{}'",
                    other
                ))),
            },
            Some(other) => Err(SearchIndexError::validation(format!(
                "Invalid refresh value '{}'",
                other
            ))),
        }
    }

    /// Read the `routing` request setting.
    fn routing_param(params: &ClientParams) -> Option<&str> {
        params.get("routing").and_then(Value::as_str)
    }

    /// Request body, `{}` when absent.
    fn body_param(params: &ClientParams) -> Value {
        params.get("body").cloned().unwrap_or_else(|| json!({}))
    }

    /// Parse a response body as JSON.
    async fn read_json(response: Response) -> Result<Value, SearchIndexError> {
        let text = response
            .text()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    /// Return the body of a document-level write. 404 bodies are returned
    /// as-is; other failures become errors built with `make_error`.
    async fn read_write_response(
        response: Response,
        operation: &str,
        make_error: fn(String) -> SearchIndexError,
    ) -> Result<Value, SearchIndexError> {
        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, operation, "Request failed");
            return Err(make_error(format!(
                "{} failed with status {}: {}",
                operation, status, error_body
            )));
        }
        Self::read_json(response).await
    }

    /// Return the body of a search/count request, failing on any non-success status.
    async fn read_search_response(
        response: Response,
        operation: &str,
    ) -> Result<Value, SearchIndexError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, operation, "Request failed");
            return Err(SearchIndexError::search(format!(
                "{} failed with status {}: {}",
                operation, status, error_body
            )));
        }
        Self::read_json(response).await
    }
}

#[async_trait]
impl SearchClient for OpenSearchClient {
    async fn get(&self, params: &ClientParams) -> Result<Option<Value>, SearchIndexError> {
        let index = utils::resolve_single_index(params)?;
        let id = utils::document_id(params)?;

        let mut request = self.client.get(GetParts::IndexId(&index, &id));
        if let Some(routing) = Self::routing_param(params) {
            request = request.routing(routing);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::get(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            debug!(index = %index, id = %id, "Document not found");
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Get request failed");
            return Err(SearchIndexError::get(format!(
                "Get failed with status {}: {}",
                status, error_body
            )));
        }

        Self::read_json(response).await.map(Some)
    }

    async fn search(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        let indices = utils::resolve_indices(params)?;
        let indices: Vec<&str> = indices.iter().map(String::as_str).collect();
        let routing: Vec<&str> = Self::routing_param(params).into_iter().collect();

        let mut request = self
            .client
            .search(SearchParts::Index(&indices))
            .body(Self::body_param(params));
        if !routing.is_empty() {
            request = request.routing(&routing);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        debug!(indices = ?indices, "Search executed");
        Self::read_search_response(response, "Search").await
    }

    async fn count(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        let indices = utils::resolve_indices(params)?;
        let indices: Vec<&str> = indices.iter().map(String::as_str).collect();

        let response = self
            .client
            .count(CountParts::Index(&indices))
            .body(Self::body_param(params))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        Self::read_search_response(response, "Count").await
    }

    async fn delete(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        let index = utils::resolve_single_index(params)?;
        let id = utils::document_id(params)?;

        let mut request = self.client.delete(DeleteParts::IndexId(&index, &id));
        if let Some(refresh) = Self::refresh_param(params)? {
            request = request.refresh(refresh);
        }
        if let Some(routing) = Self::routing_param(params) {
            request = request.routing(routing);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        debug!(index = %index, id = %id, status = %response.status_code(), "Delete executed");
        Self::read_write_response(response, "Delete", SearchIndexError::DeleteError).await
    }

    async fn update(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        let index = utils::resolve_single_index(params)?;
        let id = utils::document_id(params)?;

        let mut request = self
            .client
            .update(UpdateParts::IndexId(&index, &id))
            .body(Self::body_param(params));
        if let Some(refresh) = Self::refresh_param(params)? {
            request = request.refresh(refresh);
        }
        if let Some(routing) = Self::routing_param(params) {
            request = request.routing(routing);
        }
        if let Some(retries) = params.get("retry_on_conflict").and_then(Value::as_i64) {
            request = request.retry_on_conflict(retries);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::update(e.to_string()))?;

        debug!(index = %index, id = %id, status = %response.status_code(), "Update executed");
        Self::read_write_response(response, "Update", SearchIndexError::UpdateError).await
    }

    async fn index(&self, params: &ClientParams) -> Result<Value, SearchIndexError> {
        let index = utils::resolve_single_index(params)?;
        let id = utils::document_id(params).ok();
        let parts = match &id {
            Some(id) => IndexParts::IndexId(&index, id),
            None => IndexParts::Index(&index),
        };

        let mut request = self.client.index(parts).body(Self::body_param(params));
        if let Some(refresh) = Self::refresh_param(params)? {
            request = request.refresh(refresh);
        }
        if let Some(routing) = Self::routing_param(params) {
            request = request.routing(routing);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, id = ?id, "Document indexed");
        Self::read_json(response).await
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_management(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_management(format!(
                "Creating index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_management(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index deletion failed");
            return Err(SearchIndexError::index_management(format!(
                "Deleting index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Index deleted");
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_management(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::index_management(format!(
                "Checking index {} failed with status {}",
                index, status
            ))),
        }
    }
}
