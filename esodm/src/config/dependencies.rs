//! Dependency initialization and wiring for the admin tool.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::AdminError;
use esodm_repository::{Manager, OpenSearchClient};
use esodm_shared::MetadataCollector;

/// Default search engine URL.
const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Default index name.
const DEFAULT_INDEX_NAME: &str = "esodm";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Some(Self::FailFast),
            "retry" => Some(Self::Retry),
            _ => None,
        }
    }

    /// Parse connection mode from environment variable.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive)
    /// Defaults to "retry" if not set or invalid.
    fn from_env() -> Self {
        match env::var("ODM_CONNECTION_MODE") {
            Err(_) => Self::Retry,
            Ok(value) => Self::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "Invalid ODM_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }),
        }
    }
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminConfig {
    pub url: String,
    pub index_name: String,
    pub schema_path: Option<PathBuf>,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
}

impl AdminConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_URL`: Search engine URL (default: http://localhost:9200)
    /// - `ODM_INDEX_NAME`: Index name prefix (default: "esodm")
    /// - `ODM_SCHEMA_PATH`: Path of the JSON document schema
    /// - `ODM_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `ODM_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    pub fn from_env() -> Self {
        let url = env::var("ELASTICSEARCH_URL")
            .unwrap_or_else(|_| DEFAULT_ELASTICSEARCH_URL.to_string());
        let index_name =
            env::var("ODM_INDEX_NAME").unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string());
        let schema_path = env::var("ODM_SCHEMA_PATH").ok().map(PathBuf::from);
        let retry_interval = env::var("ODM_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        Self {
            url,
            index_name,
            schema_path,
            connection_mode: ConnectionMode::from_env(),
            retry_interval: Duration::from_secs(retry_interval),
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Manager over the loaded document types.
    pub manager: Arc<Manager>,
}

impl Dependencies {
    /// Load the schema and connect to the search engine.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AdminError)` - If the schema is missing or invalid, or the
    ///   connection fails (only in fail-fast mode)
    pub async fn new(config: &AdminConfig) -> Result<Self, AdminError> {
        info!(
            url = %config.url,
            index_name = %config.index_name,
            schema_path = ?config.schema_path,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let metadata = Self::load_metadata(config)?;
        let client =
            Self::connect_to_search(&config.url, config.connection_mode, config.retry_interval)
                .await?;

        info!("Search engine connection established");

        let manager = Manager::new(Arc::new(client), config.index_name.clone(), metadata);
        Ok(Self {
            manager: Arc::new(manager),
        })
    }

    /// Load the document schema named by the configuration.
    pub fn load_metadata(config: &AdminConfig) -> Result<MetadataCollector, AdminError> {
        let path = config
            .schema_path
            .as_deref()
            .ok_or_else(|| AdminError::config("ODM_SCHEMA_PATH must be set"))?;
        Self::load_schema(path)
    }

    /// Load a JSON schema file: an array of document metadata.
    pub fn load_schema(path: &Path) -> Result<MetadataCollector, AdminError> {
        let source = fs::read_to_string(path).map_err(|e| {
            AdminError::config(format!("Failed to read schema {}: {}", path.display(), e))
        })?;
        let metadata = MetadataCollector::from_json(&source)?;

        info!(
            path = %path.display(),
            document_count = metadata.len(),
            "Schema loaded"
        );
        Ok(metadata)
    }

    /// Connect to the search engine with retry logic based on connection mode.
    async fn connect_to_search(
        url: &str,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchClient, AdminError> {
        loop {
            match Self::try_connect(url).await {
                Ok(client) => return Ok(client),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(AdminError::config(format!(
                            "Failed to connect to search engine: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to search engine, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect: build the client and ping the cluster.
    async fn try_connect(url: &str) -> Result<OpenSearchClient, AdminError> {
        let client = OpenSearchClient::new(url)?;
        client.ping().await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env_vars() {
        for key in [
            "ELASTICSEARCH_URL",
            "ODM_INDEX_NAME",
            "ODM_SCHEMA_PATH",
            "ODM_CONNECTION_MODE",
            "ODM_RETRY_INTERVAL_SECS",
        ] {
            env::remove_var(key);
        }
    }

    fn config_with_schema(path: Option<PathBuf>) -> AdminConfig {
        AdminConfig {
            url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            schema_path: path,
            connection_mode: ConnectionMode::FailFast,
            retry_interval: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_connection_mode_parse() {
        assert_eq!(ConnectionMode::parse("fail-fast"), Some(ConnectionMode::FailFast));
        assert_eq!(ConnectionMode::parse("FAIL_FAST"), Some(ConnectionMode::FailFast));
        assert_eq!(ConnectionMode::parse("Retry"), Some(ConnectionMode::Retry));
        assert_eq!(ConnectionMode::parse("sometimes"), None);
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env_vars();

        let config = AdminConfig::from_env();
        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.index_name, "esodm");
        assert_eq!(config.schema_path, None);
        assert_eq!(config.connection_mode, ConnectionMode::Retry);
        assert_eq!(config.retry_interval, Duration::from_secs(15));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env_vars();
        env::set_var("ELASTICSEARCH_URL", "http://search:9200");
        env::set_var("ODM_INDEX_NAME", "shop");
        env::set_var("ODM_SCHEMA_PATH", "/etc/esodm/schema.json");
        env::set_var("ODM_CONNECTION_MODE", "fail-fast");
        env::set_var("ODM_RETRY_INTERVAL_SECS", "3");

        let config = AdminConfig::from_env();
        clear_env_vars();

        assert_eq!(config.url, "http://search:9200");
        assert_eq!(config.index_name, "shop");
        assert_eq!(config.schema_path, Some(PathBuf::from("/etc/esodm/schema.json")));
        assert_eq!(config.connection_mode, ConnectionMode::FailFast);
        assert_eq!(config.retry_interval, Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back_to_defaults() {
        clear_env_vars();
        env::set_var("ODM_CONNECTION_MODE", "sometimes");
        env::set_var("ODM_RETRY_INTERVAL_SECS", "soon");

        let config = AdminConfig::from_env();
        clear_env_vars();

        assert_eq!(config.connection_mode, ConnectionMode::Retry);
        assert_eq!(config.retry_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_load_schema() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{
                    "class_name": "AcmeTestBundle:Product",
                    "type": "product",
                    "properties": [
                        {{ "field": "title", "type": "string" }},
                        {{ "field": "price", "type": "float" }}
                    ]
                }}
            ]"#
        )
        .unwrap();

        let metadata =
            Dependencies::load_metadata(&config_with_schema(Some(file.path().to_path_buf())))
                .unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(
            metadata.get_document_type("AcmeTestBundle:Product").unwrap(),
            "product"
        );
    }

    #[test]
    fn test_load_schema_rejects_unknown_field_type() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "class_name": "A:B", "type": "b", "properties": [{{ "field": "x", "type": "text" }}] }}]"#
        )
        .unwrap();

        let result = Dependencies::load_schema(file.path());
        assert!(matches!(result, Err(AdminError::SchemaError(_))));
    }

    #[test]
    fn test_load_metadata_requires_schema_path() {
        let result = Dependencies::load_metadata(&config_with_schema(None));
        assert!(matches!(result, Err(AdminError::ConfigError(_))));

        let missing = config_with_schema(Some(PathBuf::from("/nonexistent/schema.json")));
        assert!(matches!(
            Dependencies::load_metadata(&missing),
            Err(AdminError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_fail_fast_connection_error() {
        let result =
            Dependencies::connect_to_search("not a url", ConnectionMode::FailFast, Duration::ZERO)
                .await;
        assert!(matches!(result, Err(AdminError::ConfigError(_))));
    }
}
