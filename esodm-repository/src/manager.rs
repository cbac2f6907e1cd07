//! Document manager.
//!
//! The manager owns everything a repository needs to reach the engine: the
//! client, the index name, the metadata registry and the converter. It runs
//! single-document fetches and searches, persists documents and manages the
//! indices of the registered document types.

use std::sync::Arc;

use esodm_shared::{Document, MetadataCollector, ResultKind, Search};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::{ClientParams, SearchClient};
use crate::repository::Repository;
use crate::result::{Converter, SearchResults};
use crate::types::{BatchOperationResult, BatchOperationSummary};
use crate::utils;

/// Connection and metadata context shared by repositories.
///
/// Repositories hold the manager through an `Arc`; the manager itself holds
/// no mutable state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use esodm_repository::{Manager, OpenSearchClient};
/// use esodm_shared::MetadataCollector;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchClient::new("http://localhost:9200")?;
/// let manager = Arc::new(Manager::new(Arc::new(client), "shop", MetadataCollector::new()));
/// # Ok(())
/// # }
/// ```
pub struct Manager {
    client: Arc<dyn SearchClient>,
    index_name: String,
    metadata: MetadataCollector,
    converter: Converter,
    config: ManagerConfig,
}

impl Manager {
    /// Create a manager with the default configuration.
    pub fn new(
        client: Arc<dyn SearchClient>,
        index_name: impl Into<String>,
        metadata: MetadataCollector,
    ) -> Self {
        Self::with_config(client, index_name, metadata, ManagerConfig::default())
    }

    /// Create a manager with a custom configuration.
    pub fn with_config(
        client: Arc<dyn SearchClient>,
        index_name: impl Into<String>,
        metadata: MetadataCollector,
        config: ManagerConfig,
    ) -> Self {
        Self {
            client,
            index_name: index_name.into(),
            metadata,
            converter: Converter::new(),
            config,
        }
    }

    pub fn client(&self) -> &Arc<dyn SearchClient> {
        &self.client
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn metadata_collector(&self) -> &MetadataCollector {
        &self.metadata
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Concrete index a document type is stored in.
    pub fn physical_index(&self, doc_type: &str) -> String {
        utils::physical_index_name(&self.index_name, doc_type)
    }

    /// Repository for a registered document.
    ///
    /// Fails with a validation error when `T` is not registered.
    pub fn repository<T: Document>(self: &Arc<Self>) -> Result<Repository<T>, SearchIndexError> {
        Repository::new(Arc::clone(self))
    }

    /// Base request parameters for a document type.
    pub(crate) fn type_params(&self, doc_type: &str) -> ClientParams {
        let mut params = ClientParams::new();
        params.insert("index".to_string(), json!(self.index_name));
        params.insert("type".to_string(), json!(doc_type));
        params
    }

    /// Fetch a document by type and id. A missing document is `Ok(None)`.
    pub async fn find<T: Document>(
        &self,
        doc_type: &str,
        id: &str,
    ) -> Result<Option<T>, SearchIndexError> {
        let mut params = self.type_params(doc_type);
        params.insert("id".to_string(), json!(id));

        match self.client.get(&params).await? {
            Some(hit) => self.converter.convert_to_document(&hit).map(Some),
            None => {
                debug!(doc_type = %doc_type, id = %id, "Document not found");
                Ok(None)
            }
        }
    }

    /// Run a search over the given document types.
    ///
    /// An empty type list searches every registered type.
    pub async fn execute<T: Document>(
        &self,
        types: &[&str],
        search: &Search,
        kind: ResultKind,
    ) -> Result<SearchResults<T>, SearchIndexError> {
        let types: Vec<&str> = if types.is_empty() {
            self.metadata.document_types()
        } else {
            types.to_vec()
        };

        let mut params = ClientParams::new();
        params.insert("index".to_string(), json!(self.index_name));
        params.insert("type".to_string(), json!(types));
        params.insert("body".to_string(), search.to_json());

        let response = self.client.search(&params).await?;
        debug!(types = ?types, kind = %kind, "Search completed");
        SearchResults::from_response(response, kind, self.converter)
    }

    /// Index one document, creating or replacing it.
    ///
    /// The id is taken from the document's `_id` field; without one the
    /// engine assigns an id. Returns the engine's response.
    pub async fn persist<T: Document>(&self, document: &T) -> Result<Value, SearchIndexError> {
        let params = self.index_params(document)?;
        self.client.index(&params).await
    }

    /// Index many documents, one request each.
    ///
    /// Every document is attempted; failures are reported per document in
    /// the summary. Batches above the configured maximum are rejected
    /// before anything is sent.
    pub async fn bulk_persist<T: Document>(
        &self,
        documents: &[T],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }
        self.validate_batch_size(documents.len())?;

        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            let result = match self.index_params(document) {
                Ok(params) => {
                    let id = utils::document_id(&params).ok();
                    match self.client.index(&params).await {
                        Ok(response) => BatchOperationResult {
                            id: id.or_else(|| {
                                response.get("_id").and_then(Value::as_str).map(String::from)
                            }),
                            success: true,
                            error: None,
                        },
                        Err(e) => BatchOperationResult {
                            id,
                            success: false,
                            error: Some(e),
                        },
                    }
                }
                Err(e) => BatchOperationResult {
                    id: None,
                    success: false,
                    error: Some(e),
                },
            };
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        if failed > 0 {
            warn!(succeeded, failed, class = T::CLASS_NAME, "Bulk persist had failures");
        } else {
            debug!(succeeded, class = T::CLASS_NAME, "Bulk persist completed");
        }

        Ok(BatchOperationSummary {
            total: documents.len(),
            succeeded,
            failed,
            results,
        })
    }

    /// Create the index of every registered document type.
    ///
    /// With `no_mapping` the indices are created with settings only.
    pub async fn create_index(&self, no_mapping: bool) -> Result<(), SearchIndexError> {
        self.require_documents()?;

        for metadata in self.metadata.iter() {
            let index = self.physical_index(&metadata.doc_type);
            let mapping = if no_mapping {
                None
            } else {
                Some(metadata.mapping())
            };
            self.client
                .create_index(&index, &self.config.index_body(mapping))
                .await?;
            info!(index = %index, class = %metadata.class_name, "Created document index");
        }
        Ok(())
    }

    /// Create the indices that do not exist yet, with mappings.
    pub async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        self.require_documents()?;

        for metadata in self.metadata.iter() {
            let index = self.physical_index(&metadata.doc_type);
            if self.client.index_exists(&index).await? {
                debug!(index = %index, "Index already exists");
                continue;
            }
            self.client
                .create_index(&index, &self.config.index_body(Some(metadata.mapping())))
                .await?;
            info!(index = %index, "Created missing index");
        }
        Ok(())
    }

    /// Delete the index of every registered document type. Missing indices
    /// are skipped.
    pub async fn drop_index(&self) -> Result<(), SearchIndexError> {
        for doc_type in self.metadata.document_types() {
            let index = self.physical_index(doc_type);
            if !self.client.index_exists(&index).await? {
                debug!(index = %index, "Index does not exist, nothing to drop");
                continue;
            }
            self.client.delete_index(&index).await?;
        }
        Ok(())
    }

    /// Whether the index of every registered document type exists.
    pub async fn index_exists(&self) -> Result<bool, SearchIndexError> {
        self.require_documents()?;

        for doc_type in self.metadata.document_types() {
            if !self.client.index_exists(&self.physical_index(doc_type)).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn index_params<T: Document>(&self, document: &T) -> Result<ClientParams, SearchIndexError> {
        let doc_type = self.metadata.get_document_type(T::CLASS_NAME)?;
        let (id, source) = self.converter.convert_to_source(document)?;

        let mut params = self.type_params(doc_type);
        if let Some(id) = id {
            params.insert("id".to_string(), json!(id));
        }
        params.insert("body".to_string(), Value::Object(source));
        Ok(params)
    }

    fn require_documents(&self) -> Result<(), SearchIndexError> {
        if self.metadata.is_empty() {
            return Err(SearchIndexError::validation("No document types registered"));
        }
        Ok(())
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }
}
