//! Admin commands.
//!
//! `create [--no-mapping]` creates the index of every document type,
//! `drop` deletes them and `mapping` prints the mappings without touching
//! the cluster.

use esodm_repository::Manager;
use esodm_shared::MetadataCollector;
use serde_json::{Map, Value};
use tracing::info;

use crate::AdminError;

pub const USAGE: &str = "usage: esodm <create|drop|mapping> [--no-mapping]";

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create the index of every document type.
    Create { no_mapping: bool },
    /// Delete the index of every document type.
    Drop,
    /// Print the mapping of every document type.
    Mapping,
}

impl Command {
    /// Parse the arguments following the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, AdminError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();

        match args.as_slice() {
            ["create"] => Ok(Command::Create { no_mapping: false }),
            ["create", "--no-mapping"] => Ok(Command::Create { no_mapping: true }),
            ["drop"] => Ok(Command::Drop),
            ["mapping"] => Ok(Command::Mapping),
            [] => Err(AdminError::usage(USAGE)),
            other => Err(AdminError::usage(format!(
                "unrecognized arguments '{}'; {}",
                other.join(" "),
                USAGE
            ))),
        }
    }

    /// Whether the command talks to the cluster.
    pub fn needs_connection(&self) -> bool {
        !matches!(self, Command::Mapping)
    }

    /// Run a cluster command.
    pub async fn run(&self, manager: &Manager) -> Result<(), AdminError> {
        match *self {
            Command::Create { no_mapping } => {
                manager.create_index(no_mapping).await?;
                info!(
                    index_name = %manager.index_name(),
                    document_count = manager.metadata_collector().len(),
                    no_mapping,
                    "Indices created"
                );
            }
            Command::Drop => {
                manager.drop_index().await?;
                info!(index_name = %manager.index_name(), "Indices dropped");
            }
            Command::Mapping => {
                return Err(AdminError::usage(
                    "mapping is printed locally, it does not run against the cluster",
                ));
            }
        }
        Ok(())
    }
}

/// Mappings of every document type, keyed by type.
pub fn mapping_document(metadata: &MetadataCollector) -> Value {
    let mappings: Map<String, Value> = metadata
        .iter()
        .map(|m| (m.doc_type.clone(), m.mapping()))
        .collect();
    Value::Object(mappings)
}
