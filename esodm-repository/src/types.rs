//! Request and response types for manager and repository operations.

use serde_json::Value;

use crate::errors::SearchIndexError;

/// Result of a count request.
#[derive(Debug, Clone, PartialEq)]
pub enum CountResponse {
    /// The number of matching documents.
    Count(u64),
    /// The response exactly as returned by the engine.
    Raw(Value),
}

impl CountResponse {
    /// The count, whichever form the response is in.
    pub fn count(&self) -> Option<u64> {
        match self {
            CountResponse::Count(count) => Some(*count),
            CountResponse::Raw(raw) => raw.get("count").and_then(Value::as_u64),
        }
    }
}

/// Result of a batch operation for a single document.
///
/// Indicates whether persisting one document succeeded and includes error
/// details if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document id, when the document carried one.
    pub id: Option<String>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// Lets callers handle partial failures: every document is attempted and
/// reported on, whether or not earlier ones failed.
#[derive(Debug, Clone)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of an empty batch.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: vec![],
        }
    }
}
