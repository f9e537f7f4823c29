//! MCP Server implementation and lifecycle management.
//!
//! The server is the host side of the tool contract: it lists the tools in
//! the registry, holds the credential store, and routes `tools/call` into
//! `ToolRegistry::invoke`.
//!
//! **Adding a new tool does NOT require modifying this file!** The router is
//! built from whatever the registry contains.

use rmcp::{
    ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use super::credentials::CredentialStore;
use crate::domains::tools::{ToolRegistry, build_tool_router, dispatch};

const INSTRUCTIONS: &str = "Toolkits for the GitHub, HubSpot and Tavily REST APIs. \
    Credentials are injected by the server; do not pass tokens as arguments.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools.
    registry: Arc<ToolRegistry>,

    /// Credentials injected into tool calls.
    credentials: Arc<CredentialStore>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server around an already populated registry.
    pub fn new(
        config: Config,
        registry: Arc<ToolRegistry>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(registry.clone(), credentials.clone()),
            config: Arc::new(config),
            registry,
            credentials,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let arguments = match arguments {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => return Err(format!("Tool arguments must be an object, got {}", other)),
        };

        let result = dispatch(
            self.registry.clone(),
            self.credentials.clone(),
            name,
            arguments,
        )
        .await
        .map_err(|e| e.message.to_string())?;

        serde_json::to_value(&result).map_err(|e| e.to_string())
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{AuthRequirement, HttpClient, register_toolkits};
    use crate::domains::tools::outbound::stub::StubClient;

    fn server(stub: StubClient) -> McpServer {
        let config = Config::default();
        let mut registry = ToolRegistry::new();
        let client: Arc<dyn HttpClient> = Arc::new(stub);
        register_toolkits(&mut registry, &config, client).unwrap();
        let credentials = CredentialStore::new().with_token(&AuthRequirement::oauth2("github"), "gho");
        McpServer::new(config, Arc::new(registry), Arc::new(credentials))
    }

    #[test]
    fn test_server_info() {
        let server = server(StubClient::respond(200, "{}"));
        assert_eq!(server.name(), "atp-toolkits");
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
    }

    #[test]
    fn test_list_tools_json() {
        let server = server(StubClient::respond(200, "{}"));
        let tools = server.list_tools();
        assert_eq!(tools.len(), server.registry().len());
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[test]
    fn test_call_tool_json() {
        let server = server(StubClient::respond(204, ""));
        let result = tokio_test::block_on(server.call_tool(
            "delete_github_repo",
            serde_json::json!({ "repo_id": "octo/old" }),
        ))
        .unwrap();

        assert_eq!(result["isError"], false);
        assert_eq!(
            result["structuredContent"],
            serde_json::json!({ "status_code": 204, "message": "Deleted" })
        );
    }

    #[test]
    fn test_call_tool_rejects_non_object_arguments() {
        let server = server(StubClient::respond(200, "{}"));
        let result = tokio_test::block_on(server.call_tool("get_github_repos", serde_json::json!([1])));
        assert!(result.is_err());
    }
}
