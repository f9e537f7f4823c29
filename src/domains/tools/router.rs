//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every registered descriptor becomes one route. A call resolves the
//! tool's credential from the host's [`CredentialStore`], then runs the
//! synchronous handler on the blocking pool via [`dispatch`].

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content, JsonObject, Tool},
};
use tracing::{info, warn};

use super::descriptor::ToolDescriptor;
use super::registry::ToolRegistry;
use super::result::InvocationResult;
use crate::core::credentials::CredentialStore;

/// Create a Tool model (metadata) from a descriptor.
pub fn to_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name.clone().into(),
        description: Some(descriptor.description.clone().into()),
        input_schema: Arc::new(descriptor.input_schema()),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(
    registry: Arc<ToolRegistry>,
    credentials: Arc<CredentialStore>,
) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let mut router = ToolRouter::new();

    for descriptor in registry.descriptors() {
        let name = descriptor.name.clone();
        let registry = registry.clone();
        let credentials = credentials.clone();

        let route = ToolRoute::new_dyn(to_tool(descriptor), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let registry = registry.clone();
            let credentials = credentials.clone();
            let name = name.clone();
            async move { dispatch(registry, credentials, &name, args).await }.boxed()
        });
        router = router.with_route(route);
    }

    router
}

/// Resolve the credential for `name` and invoke it on the blocking pool.
///
/// Unknown tools and missing required parameters are protocol errors.
/// A missing credential or a failed external call is a tool error result.
pub async fn dispatch(
    registry: Arc<ToolRegistry>,
    credentials: Arc<CredentialStore>,
    name: &str,
    arguments: JsonObject,
) -> Result<CallToolResult, McpError> {
    let auth = registry
        .lookup(name)
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?
        .descriptor()
        .auth
        .clone();

    let Some(token) = credentials.resolve(&auth) else {
        warn!("No credential for {} - refusing to call {}", auth.provider, name);
        return Ok(CallToolResult::error(vec![Content::text(format!(
            "No {} credential configured for provider '{}' (set {})",
            auth.auth_type,
            auth.provider,
            CredentialStore::env_var(&auth)
        ))]));
    };

    info!("Dispatching tool call: {}", name);
    let tool_name = name.to_string();
    let outcome = tokio::task::spawn_blocking(move || registry.invoke(&tool_name, arguments, token))
        .await
        .map_err(|e| McpError::internal_error(format!("Tool task failed: {}", e), None))?;

    match outcome {
        Ok(result) => Ok(to_call_result(result)),
        Err(e) => Err(McpError::invalid_params(e.to_string(), None)),
    }
}

/// Convert an invocation result into an MCP tool result.
///
/// The payload is always sent as JSON text; objects are also attached as
/// structured content.
pub fn to_call_result(result: InvocationResult) -> CallToolResult {
    let is_error = result.is_failure();
    let value = result.into_value();

    CallToolResult {
        content: vec![Content::text(value.to_string())],
        structured_content: value.is_object().then_some(value),
        is_error: Some(is_error),
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::tools::definitions::register_toolkits;
    use crate::domains::tools::descriptor::AuthRequirement;
    use crate::domains::tools::outbound::HttpClient;
    use crate::domains::tools::outbound::stub::StubClient;
    use rmcp::model::RawContent;
    use serde_json::json;

    struct TestServer {}

    fn registry(stub: StubClient) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        let client: Arc<dyn HttpClient> = Arc::new(stub);
        register_toolkits(&mut registry, &Config::default(), client).unwrap();
        Arc::new(registry)
    }

    fn credentials() -> Arc<CredentialStore> {
        Arc::new(
            CredentialStore::new()
                .with_token(&AuthRequirement::oauth2("github"), "gho_token")
                .with_token(&AuthRequirement::api_key("tavily"), "tvly-key"),
        )
    }

    fn args(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    fn text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_build_router() {
        let registry = registry(StubClient::respond(200, "{}"));
        let router: ToolRouter<TestServer> = build_tool_router(registry, credentials());
        let tools = router.list_all();
        assert_eq!(tools.len(), 15);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"create_github_repo"));
        assert!(names.contains(&"create_contact"));
        assert!(names.contains(&"tavily_crawl"));
    }

    #[test]
    fn test_registry_matches_router() {
        let registry = registry(StubClient::respond(200, "{}"));
        let registry_names: Vec<String> =
            registry.tool_names().into_iter().map(String::from).collect();

        let router: ToolRouter<TestServer> = build_tool_router(registry, credentials());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.to_string()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }

    #[test]
    fn test_tool_schema_from_descriptor() {
        let registry = registry(StubClient::respond(200, "{}"));
        let tool = to_tool(registry.lookup("tavily_search").unwrap().descriptor());
        assert_eq!(tool.input_schema["required"], json!(["query"]));
        assert!(tool.input_schema["properties"].get("topic").is_some());
    }

    #[test]
    fn test_dispatch_success() {
        let registry = registry(StubClient::respond(201, r#"{"id": 1, "name": "repo1"}"#));
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "create_github_repo",
            args(json!({ "name": "repo1", "description": "test" })),
        ))
        .unwrap();

        assert_eq!(result.is_error, Some(false));
        assert_eq!(
            result.structured_content,
            Some(json!({ "id": 1, "name": "repo1" }))
        );
    }

    #[test]
    fn test_dispatch_list_payload_is_text_only() {
        let registry = registry(StubClient::respond(200, r#"[{"id": 1}]"#));
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "get_private_github_repos",
            JsonObject::new(),
        ))
        .unwrap();

        assert!(result.structured_content.is_none());
        assert_eq!(text(&result), r#"[{"id":1}]"#);
    }

    #[test]
    fn test_dispatch_external_failure_is_tool_error() {
        let registry = registry(StubClient::refuse());
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "tavily_search",
            args(json!({ "query": "q" })),
        ))
        .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.structured_content,
            Some(json!({ "error": "Request failed: connection refused" }))
        );
    }

    #[test]
    fn test_dispatch_missing_credential() {
        let registry = registry(StubClient::respond(200, "{}"));
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "create_company",
            args(json!({ "name": "Acme", "domain": "acme.com", "industry": "RETAIL" })),
        ))
        .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).contains("ATP_HUBSPOT_ACCESS_TOKEN"));
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let registry = registry(StubClient::respond(200, "{}"));
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "get_gitlab_repos",
            JsonObject::new(),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_dispatch_missing_required() {
        let registry = registry(StubClient::respond(200, "{}"));
        let result = tokio_test::block_on(dispatch(
            registry,
            credentials(),
            "get_github_repos",
            JsonObject::new(),
        ));
        let err = result.unwrap_err();
        assert!(err.message.contains("username"));
    }
}
