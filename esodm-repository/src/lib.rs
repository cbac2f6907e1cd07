//! # esodm repository
//!
//! Document manager, per-type repositories and the OpenSearch client. It
//! includes definitions for errors, the client seam, result
//! materialization and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod manager;
pub mod opensearch;
pub mod repository;
pub mod result;
pub mod types;
pub mod utils;

pub use config::ManagerConfig;
pub use errors::SearchIndexError;
pub use interfaces::{ClientParams, SearchClient};
pub use manager::Manager;
pub use opensearch::OpenSearchClient;
pub use repository::{Criteria, CriteriaValue, OrderBy, Repository};
pub use result::{
    AggregationError, AggregationMatch, AggregationPath, AggregationSet, Bucket, Converter,
    DocumentIterator, RawIterator, SearchResults,
};
pub use types::{BatchOperationResult, BatchOperationSummary, CountResponse};
