//! Toolkit server entry point.
//!
//! Loads configuration, initializes logging, registers the enabled toolkits,
//! loads their credentials and serves them over the configured transport.

use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use atp_toolkits::Error;
use atp_toolkits::core::{Config, CredentialStore, McpServer, TransportService};
use atp_toolkits::domains::tools::{ReqwestClient, ToolRegistry, register_toolkits};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    for warning in &config.warnings {
        warn!("{}", warning);
    }
    if let Some(secs) = config.client.timeout_secs {
        info!("Outbound HTTP timeout set to {}s", secs);
    }

    let registry = build_registry(&config)?;
    info!("Registered {} tool(s)", registry.len());

    let credentials = CredentialStore::from_env(registry.descriptors());

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config, Arc::new(registry), Arc::new(credentials));
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Register every enabled toolkit. Registration errors are fatal.
fn build_registry(config: &Config) -> atp_toolkits::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    let client = Arc::new(ReqwestClient::new(&config.client));
    register_toolkits(&mut registry, config, client)?;

    if registry.is_empty() {
        return Err(Error::config(
            "no toolkits enabled - set ATP_TOOLKITS to github, hubspot and/or tavily",
        ));
    }
    Ok(registry)
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the STDIO transport keeps stdout for protocol messages.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}
