//! Tavily toolkit: web search, crawl and site map.
//!
//! Tavily authenticates with a static API key sent as a bearer token. Unlike
//! GitHub, a non-2xx answer is a failure.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::info;

use super::{bind, endpoint};
use crate::domains::tools::descriptor::{AuthRequirement, ToolDescriptor};
use crate::domains::tools::error::{ExternalCallError, ToolError};
use crate::domains::tools::outbound::{HttpClient, HttpRequest};
use crate::domains::tools::registry::ToolRegistry;
use crate::domains::tools::request::InvocationRequest;

const DEFAULT_MAX_RESULTS: u64 = 3;
const DEFAULT_TOPIC: &str = "general";
const DEFAULT_CRAWL_DEPTH: u64 = 1;
const DEFAULT_MAP_DEPTH: u64 = 2;
const DEFAULT_MAX_BREADTH: u64 = 20;
const DEFAULT_LIMIT: u64 = 50;

pub struct TavilyToolkit {
    client: Arc<dyn HttpClient>,
    base_url: String,
}

impl TavilyToolkit {
    pub const PROVIDER: &'static str = "tavily";

    pub fn new(client: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn auth() -> AuthRequirement {
        AuthRequirement::api_key(Self::PROVIDER)
    }

    pub fn register(self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        let kit = Arc::new(self);

        registry.register(
            ToolDescriptor::new(
                "tavily_search",
                "Search the web using Tavily. Optional: max_results, topic.",
                Self::auth(),
            )
            .params(["query", "max_results", "topic"])
            .required(["query"]),
            bind(&kit, Self::search),
        )?;
        registry.register(
            ToolDescriptor::new(
                "tavily_crawl",
                "Crawl one or more websites using Tavily's Crawl API. \
                 Provide 'url' for a single site or 'urls' as a list.",
                Self::auth(),
            )
            .params(["url", "urls", "max_depth", "max_breadth", "limit", "instructions"]),
            bind(&kit, Self::crawl),
        )?;
        registry.register(
            ToolDescriptor::new(
                "tavily_map",
                "Map a website's structure using Tavily's Map API.",
                Self::auth(),
            )
            .params(["url", "max_depth", "max_breadth", "limit", "instructions"])
            .required(["url"]),
            bind(&kit, Self::map),
        )?;

        Ok(())
    }

    fn post(
        &self,
        req: &InvocationRequest,
        path: &str,
        body: Value,
    ) -> Result<Value, ExternalCallError> {
        let request = HttpRequest::post(endpoint(&self.base_url, path))
            .bearer(req.auth_token())
            .json(body);
        self.client.send(request)?.error_for_status()?.json()
    }

    /// Shared depth/breadth/limit/instructions fields of crawl and map.
    fn traversal_body(
        req: &InvocationRequest,
        url: &str,
        default_depth: u64,
    ) -> Result<Map<String, Value>, ExternalCallError> {
        let mut body = Map::new();
        body.insert("url".to_string(), url.into());
        body.insert(
            "max_depth".to_string(),
            req.u64_or("max_depth", default_depth)?.into(),
        );
        body.insert(
            "max_breadth".to_string(),
            req.u64_or("max_breadth", DEFAULT_MAX_BREADTH)?.into(),
        );
        body.insert("limit".to_string(), req.u64_or("limit", DEFAULT_LIMIT)?.into());
        if let Some(instructions) = req.get("instructions") {
            body.insert("instructions".to_string(), instructions.clone());
        }
        Ok(body)
    }

    pub fn search(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "query": req.str("query")?,
            "max_results": req.u64_or("max_results", DEFAULT_MAX_RESULTS)?,
            "topic": req.str_or("topic", DEFAULT_TOPIC)?,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": false,
            "include_images": false,
        });
        self.post(req, "search", body)
    }

    fn crawl_one(&self, req: &InvocationRequest, url: &str) -> Result<Value, ExternalCallError> {
        let mut body = Self::traversal_body(req, url, DEFAULT_CRAWL_DEPTH)?;
        body.insert("extract_depth".to_string(), "basic".into());
        body.insert("format".to_string(), "markdown".into());
        self.post(req, "crawl", Value::Object(body))
    }

    /// Crawl `url`, or each of `urls` in order.
    ///
    /// With `urls` the result is `[{"url", "result"}, ...]`; the first failing
    /// crawl fails the whole call.
    pub fn crawl(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        if let Some(urls) = req.string_list("urls")?.filter(|urls| !urls.is_empty()) {
            info!("Crawling {} site(s)", urls.len());
            let results = urls
                .into_iter()
                .map(|url| {
                    let result = self.crawl_one(req, &url)?;
                    Ok(json!({ "url": url, "result": result }))
                })
                .collect::<Result<Vec<_>, ExternalCallError>>()?;
            return Ok(Value::Array(results));
        }

        if req.contains("url") {
            return self.crawl_one(req, req.str("url")?);
        }

        Err(ExternalCallError::rejected("No url or urls provided."))
    }

    pub fn map(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = Self::traversal_body(req, req.str("url")?, DEFAULT_MAP_DEPTH)?;
        self.post(req, "map", Value::Object(body))
    }
}
