//! Per-document-type repository.
//!
//! A [`Repository`] is bound to one registered document and offers the
//! usual lookups (`find`, `find_by`, `find_one_by`), search execution,
//! counting and single-document `remove`/`update`.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use esodm_shared::{Document, FieldSort, Query, ResultKind, Search, SortOrder};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::ClientParams;
use crate::manager::Manager;
use crate::result::{DocumentIterator, SearchResults};
use crate::types::CountResponse;
use crate::utils;

/// Field criteria for [`Repository::find_by`], keyed by field name.
pub type Criteria = BTreeMap<String, CriteriaValue>;

/// Sort entries for [`Repository::find_by`], applied in order.
pub type OrderBy = Vec<(String, SortOrder)>;

/// Value a criteria field must match.
///
/// Values are used as query-string text without escaping; callers must
/// escape query-string syntax themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaValue {
    Single(String),
    /// Matches any of the values.
    AnyOf(Vec<String>),
}

impl CriteriaValue {
    fn to_query(&self, field: &str) -> Query {
        match self {
            CriteriaValue::Single(value) => Query::query_string(value.as_str(), field),
            CriteriaValue::AnyOf(values) => Query::any_of(field, values),
        }
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        CriteriaValue::Single(value.to_string())
    }
}

impl From<String> for CriteriaValue {
    fn from(value: String) -> Self {
        CriteriaValue::Single(value)
    }
}

impl From<Vec<String>> for CriteriaValue {
    fn from(values: Vec<String>) -> Self {
        CriteriaValue::AnyOf(values)
    }
}

impl From<Vec<&str>> for CriteriaValue {
    fn from(values: Vec<&str>) -> Self {
        CriteriaValue::AnyOf(values.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CriteriaValue {
    fn from(values: [&str; N]) -> Self {
        CriteriaValue::AnyOf(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Repository for one registered document type.
///
/// The document type is resolved from the manager's metadata when the
/// repository is created and never changes afterwards.
pub struct Repository<T> {
    manager: Arc<Manager>,
    class_name: String,
    doc_type: String,
    _document: PhantomData<fn() -> T>,
}

impl<T: Document> Repository<T> {
    /// Create a repository for `T`.
    ///
    /// # Returns
    ///
    /// * `Ok(Repository)` - If `T` is registered with the manager
    /// * `Err(SearchIndexError::ValidationError)` - If it is not
    pub fn new(manager: Arc<Manager>) -> Result<Self, SearchIndexError> {
        let doc_type = manager
            .metadata_collector()
            .get_document_type(T::CLASS_NAME)
            .map_err(|e| {
                SearchIndexError::validation(format!(
                    "Cannot create repository for {}: {}",
                    T::CLASS_NAME,
                    e
                ))
            })?
            .to_string();

        Ok(Self {
            manager,
            class_name: T::CLASS_NAME.to_string(),
            doc_type,
            _document: PhantomData,
        })
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Document type this repository searches.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Fetch a document by id. A missing document is `Ok(None)`.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, id = %id))]
    pub async fn find(&self, id: &str) -> Result<Option<T>, SearchIndexError> {
        self.manager.find(&self.doc_type, id).await
    }

    /// Find documents matching every criteria entry.
    ///
    /// Each entry becomes a query-string clause on its field; a list of
    /// values matches any of them. Empty criteria match every document.
    /// `limit` and `offset` are only sent when given.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, criteria = criteria.len()))]
    pub async fn find_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<DocumentIterator<T>, SearchIndexError> {
        let search = Self::build_search(criteria, order_by, limit, offset);

        match self.execute(&search, ResultKind::Object).await? {
            SearchResults::Object(documents) => Ok(documents),
            other => Err(SearchIndexError::parse(format!(
                "Expected document results, got {}",
                other.kind()
            ))),
        }
    }

    /// First document matching the criteria, or `None`.
    ///
    /// Only one hit is requested from the engine.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, criteria = criteria.len()))]
    pub async fn find_one_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
    ) -> Result<Option<T>, SearchIndexError> {
        let mut documents = self.find_by(criteria, order_by, Some(1), None).await?;
        documents.next().transpose()
    }

    /// Empty search for use with [`execute`](Self::execute) or [`count`](Self::count).
    pub fn create_search(&self) -> Search {
        Search::new()
    }

    /// Run a search against this repository's document type.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, kind = %kind))]
    pub async fn execute(
        &self,
        search: &Search,
        kind: ResultKind,
    ) -> Result<SearchResults<T>, SearchIndexError> {
        self.manager
            .execute(&[self.doc_type.as_str()], search, kind)
            .await
    }

    /// Count documents matching the search's query.
    ///
    /// Caller `params` override the generated `index`/`type`/`body`. With
    /// `return_raw` the engine's response is returned unchanged.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, return_raw = return_raw))]
    pub async fn count(
        &self,
        search: &Search,
        params: ClientParams,
        return_raw: bool,
    ) -> Result<CountResponse, SearchIndexError> {
        let mut base = self.manager.type_params(&self.doc_type);
        base.insert("body".to_string(), Self::count_body(search));
        let params = utils::merge_params(base, params);

        let response = self.manager.client().count(&params).await?;
        if return_raw {
            return Ok(CountResponse::Raw(response));
        }

        response
            .get("count")
            .and_then(Value::as_u64)
            .map(CountResponse::Count)
            .ok_or_else(|| SearchIndexError::parse("Count response has no 'count'"))
    }

    /// Delete a document by id and return the engine's response.
    ///
    /// A missing document is not an error; the 404 body is returned.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, id = %id))]
    pub async fn remove(&self, id: &str) -> Result<Value, SearchIndexError> {
        let mut params = self.manager.type_params(&self.doc_type);
        params.insert("id".to_string(), json!(id));

        let response = self.manager.client().delete(&params).await?;
        debug!(result = ?response.get("result"), "Remove completed");
        Ok(response)
    }

    /// Partially update a document and return the engine's response.
    ///
    /// The body carries `doc` when `fields` is non-empty and `script` when
    /// one is given. Caller `params` override the generated ones.
    #[instrument(skip_all, fields(doc_type = %self.doc_type, id = %id, fields = fields.len()))]
    pub async fn update(
        &self,
        id: &str,
        fields: Map<String, Value>,
        script: Option<Value>,
        params: ClientParams,
    ) -> Result<Value, SearchIndexError> {
        let mut body = Map::new();
        if !fields.is_empty() {
            body.insert("doc".to_string(), Value::Object(fields));
        }
        if let Some(script) = script {
            body.insert("script".to_string(), script);
        }

        let mut base = self.manager.type_params(&self.doc_type);
        base.insert("id".to_string(), json!(id));
        base.insert("body".to_string(), Value::Object(body));
        let params = utils::merge_params(base, params);

        let response = self.manager.client().update(&params).await?;
        debug!(result = ?response.get("result"), "Update completed");
        Ok(response)
    }

    fn build_search(
        criteria: &Criteria,
        order_by: &OrderBy,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Search {
        let mut search = Search::new();
        if let Some(limit) = limit {
            search.set_size(limit);
        }
        if let Some(offset) = offset {
            search.set_from(offset);
        }
        for (field, value) in criteria {
            search.add_query(value.to_query(field));
        }
        for (field, order) in order_by {
            search.add_sort(FieldSort::new(field.as_str(), *order));
        }
        search
    }

    /// Count requests only accept the query part of a search.
    fn count_body(search: &Search) -> Value {
        match search.to_json().get("query") {
            Some(query) => json!({ "query": query }),
            None => json!({}),
        }
    }
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            class_name: self.class_name.clone(),
            doc_type: self.doc_type.clone(),
            _document: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("class_name", &self.class_name)
            .field("doc_type", &self.doc_type)
            .finish()
    }
}
