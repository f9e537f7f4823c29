//! Tool definitions module.
//!
//! One file per external service. Each toolkit owns its HTTP client and base
//! URL and registers its tools through [`register_toolkits`].

pub mod github;
pub mod hubspot;
pub mod tavily;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

pub use github::GithubToolkit;
pub use hubspot::HubspotToolkit;
pub use tavily::TavilyToolkit;

use super::error::{ExternalCallError, ToolError};
use super::handlers::ToolHandler;
use super::outbound::HttpClient;
use super::registry::ToolRegistry;
use super::request::InvocationRequest;
use crate::core::config::{Config, Toolkit};

/// Signature of a toolkit method usable as a handler.
pub type ToolMethod<K> = fn(&K, &InvocationRequest) -> Result<Value, ExternalCallError>;

/// Bind a toolkit method to a shared toolkit instance.
pub(crate) fn bind<K>(toolkit: &Arc<K>, method: ToolMethod<K>) -> impl ToolHandler + 'static
where
    K: Send + Sync + 'static,
{
    let toolkit = Arc::clone(toolkit);
    move |request: &InvocationRequest| -> Result<Value, ExternalCallError> {
        method(&toolkit, request)
    }
}

/// Register every toolkit enabled in `config`.
pub fn register_toolkits(
    registry: &mut ToolRegistry,
    config: &Config,
    client: Arc<dyn HttpClient>,
) -> Result<(), ToolError> {
    for toolkit in &config.toolkits.enabled {
        let before = registry.len();
        match toolkit {
            Toolkit::Github => {
                GithubToolkit::new(client.clone(), &config.endpoints.github).register(registry)?
            }
            Toolkit::Hubspot => {
                HubspotToolkit::new(client.clone(), &config.endpoints.hubspot).register(registry)?
            }
            Toolkit::Tavily => {
                TavilyToolkit::new(client.clone(), &config.endpoints.tavily).register(registry)?
            }
        }
        info!("Toolkit {} registered {} tool(s)", toolkit, registry.len() - before);
    }
    Ok(())
}

/// Join a base URL and a path.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
