//! esodm Main Entry Point
//!
//! Creates, drops or prints the indices of the document types described by
//! the schema at `ODM_SCHEMA_PATH`.

use dotenv::dotenv;
use esodm::commands::mapping_document;
use esodm::{AdminConfig, AdminError, Command, Dependencies};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
///
/// `LOG_FORMAT=json` switches to structured JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("esodm=info,esodm_repository=info"));

    let json_format = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();
    }

    info!(
        service_name = "esodm",
        service_version = env!("CARGO_PKG_VERSION"),
        json_format,
        "Tracing initialized"
    );
}

async fn run(command: Command, config: &AdminConfig) -> Result<(), AdminError> {
    if !command.needs_connection() {
        let metadata = Dependencies::load_metadata(config)?;
        let mappings = serde_json::to_string_pretty(&mapping_document(&metadata))
            .map_err(|e| AdminError::config(format!("Failed to render mappings: {}", e)))?;
        println!("{}", mappings);
        return Ok(());
    }

    let deps = Dependencies::new(config).await?;
    info!("Dependencies initialized successfully");
    command.run(&deps.manager).await
}

#[tokio::main]
async fn main() -> Result<(), AdminError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let command = Command::parse(env::args().skip(1))?;
    let config = AdminConfig::from_env();

    info!(command = ?command, "Starting esodm");

    match run(command, &config).await {
        Ok(()) => {
            info!(command = ?command, "Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(command = ?command, error = %e, "Command failed");
            Err(e)
        }
    }
}
