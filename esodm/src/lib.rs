//! # esodm
//!
//! Index administration for esodm document types. Loads a JSON schema of
//! document metadata, connects to the cluster and creates, drops or prints
//! the mappings of every registered document type.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency initialization
//! - [`commands`]: The `create`, `drop` and `mapping` commands

pub mod commands;
pub mod config;

pub use commands::Command;
pub use config::{AdminConfig, ConnectionMode, Dependencies};

use esodm_repository::SearchIndexError;
use esodm_shared::MappingError;
use thiserror::Error;

/// Errors that can occur while configuring or running an admin command.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid command line.
    #[error("Usage error: {0}")]
    UsageError(String),

    /// Invalid document schema.
    #[error("Schema error: {0}")]
    SchemaError(#[from] MappingError),

    /// Search engine error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),
}

impl AdminError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::UsageError(msg.into())
    }
}
