//! Configuration types for the Manager.

use serde_json::{json, Value};

/// Configuration for the [`Manager`](crate::Manager).
///
/// Controls batch limits for bulk persisting and the settings every index is
/// created with.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum number of documents allowed in a single bulk persist.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,
    /// Primary shards per created index.
    pub number_of_shards: u32,
    /// Replicas per created index.
    pub number_of_replicas: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl ManagerConfig {
    /// Create a config with no batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Removing batch size limits can lead to memory issues
    /// and timeouts when persisting very large batches.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Body of an index creation request.
    ///
    /// # Arguments
    ///
    /// * `mapping` - Type mapping to create the index with, or `None` to let
    ///   the engine infer it
    pub fn index_body(&self, mapping: Option<Value>) -> Value {
        let mut body = json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            }
        });
        if let Some(mapping) = mapping {
            body["mappings"] = mapping;
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = ManagerConfig::default();
        assert_eq!(config.max_batch_size, Some(1000));
        assert_eq!(config.number_of_shards, 1);
        assert_eq!(config.number_of_replicas, 1);
    }

    #[test]
    fn test_limits() {
        assert_eq!(ManagerConfig::unlimited().max_batch_size, None);
        assert_eq!(ManagerConfig::with_max_batch_size(5).max_batch_size, Some(5));
    }

    #[test]
    fn test_index_body() {
        let config = ManagerConfig::default();
        assert_eq!(
            config.index_body(None),
            json!({ "settings": { "number_of_shards": 1, "number_of_replicas": 1 } })
        );

        let body = config.index_body(Some(json!({ "properties": {} })));
        assert_eq!(body["mappings"], json!({ "properties": {} }));
    }
}
