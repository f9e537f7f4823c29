//! GitHub toolkit.
//!
//! Repository, issue, pull request, release, label and milestone tools on
//! the GitHub REST API. Authenticated with the user's OAuth2 access token.
//!
//! GitHub reports errors in the JSON body (`{"message": ...}`), so apart from
//! repository deletion every tool returns the decoded body whatever the status.

use std::sync::Arc;

use reqwest::Url;
use serde_json::{Value, json};

use super::bind;
use crate::domains::tools::descriptor::{AuthRequirement, ToolDescriptor};
use crate::domains::tools::error::{ExternalCallError, ToolError};
use crate::domains::tools::outbound::{HttpClient, HttpRequest};
use crate::domains::tools::registry::ToolRegistry;
use crate::domains::tools::request::InvocationRequest;

const ACCEPT: &str = "application/vnd.github+json";

/// Branch used for pull requests when `head`/`base` are not given.
pub const DEFAULT_BRANCH: &str = "main";

pub struct GithubToolkit {
    client: Arc<dyn HttpClient>,
    base_url: String,
}

impl GithubToolkit {
    pub const PROVIDER: &'static str = "github";

    pub fn new(client: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn auth() -> AuthRequirement {
        AuthRequirement::oauth2(Self::PROVIDER)
    }

    pub fn register(self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        let kit = Arc::new(self);
        let tool = |name: &str, description: &str| {
            ToolDescriptor::new(name, description, Self::auth())
        };

        registry.register(
            tool(
                "get_github_repos",
                "Fetches public repositories for a specified GitHub username.",
            )
            .params(["username"])
            .required(["username"]),
            bind(&kit, Self::get_repos),
        )?;
        registry.register(
            tool(
                "get_private_github_repos",
                "Fetches private repositories for the authenticated user.",
            ),
            bind(&kit, Self::get_private_repos),
        )?;
        registry.register(
            tool("create_github_repo", "Creates a new public GitHub repository.")
                .params(["name", "description"])
                .required(["name", "description"]),
            bind(&kit, Self::create_repo),
        )?;
        registry.register(
            tool("delete_github_repo", "Deletes a GitHub repository.")
                .params(["repo_id"])
                .required(["repo_id"]),
            bind(&kit, Self::delete_repo),
        )?;
        registry.register(
            tool("update_github_repo", "Updates a GitHub repository.")
                .params(["repo_id", "name", "description"])
                .required(["repo_id", "name", "description"]),
            bind(&kit, Self::update_repo),
        )?;
        registry.register(
            tool(
                "create_github_issue",
                "Creates a new GitHub issue in a repository.",
            )
            .params(["repo_id", "title", "body"])
            .required(["repo_id", "title", "body"]),
            bind(&kit, Self::create_issue),
        )?;
        registry.register(
            tool(
                "create_github_pull_request",
                "Creates a new GitHub pull request in a repository. \
                 Optional: head and base branches (default: main).",
            )
            .params(["repo_id", "title", "body", "head", "base"])
            .required(["repo_id", "title", "body"]),
            bind(&kit, Self::create_pull_request),
        )?;
        registry.register(
            tool(
                "create_github_release",
                "Creates a new GitHub release in a repository.",
            )
            .params(["repo_id", "tag_name", "name", "body"])
            .required(["repo_id", "tag_name", "name", "body"]),
            bind(&kit, Self::create_release),
        )?;
        registry.register(
            tool(
                "create_github_label",
                "Creates a new GitHub label in a repository.",
            )
            .params(["repo_id", "name", "color"])
            .required(["repo_id", "name", "color"]),
            bind(&kit, Self::create_label),
        )?;
        registry.register(
            tool(
                "create_github_milestone",
                "Creates a new GitHub milestone in a repository.",
            )
            .params(["repo_id", "title", "description"])
            .required(["repo_id", "title", "description"]),
            bind(&kit, Self::create_milestone),
        )?;

        Ok(())
    }

    /// `base_url` followed by `segments`, each percent-encoded.
    fn url<I, S>(&self, segments: I) -> Result<String, ExternalCallError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let invalid = |reason: String| {
            ExternalCallError::rejected(format!("Invalid GitHub API URL '{}': {}", self.base_url, reason))
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// `repos/{owner}/{repo}/{rest..}`. The `owner/repo` slash separates
    /// segments; everything else in `repo_id` is encoded.
    fn repo_url(&self, req: &InvocationRequest, rest: &[&str]) -> Result<String, ExternalCallError> {
        let repo_id = req.path_segment("repo_id")?;
        let segments = std::iter::once("repos")
            .chain(repo_id.split('/'))
            .chain(rest.iter().copied());
        self.url(segments)
    }

    fn authorized(&self, request: HttpRequest, req: &InvocationRequest) -> HttpRequest {
        request.bearer(req.auth_token()).header("Accept", ACCEPT)
    }

    fn send_json(&self, request: HttpRequest) -> Result<Value, ExternalCallError> {
        self.client.send(request)?.json()
    }

    /// POST `body` to `/repos/{repo_id}/{collection}`.
    fn create_in_repo(
        &self,
        req: &InvocationRequest,
        collection: &str,
        body: Value,
    ) -> Result<Value, ExternalCallError> {
        let url = self.repo_url(req, &[collection])?;
        self.send_json(self.authorized(HttpRequest::post(url), req).json(body))
    }

    pub fn get_repos(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let username = req.path_segment("username")?;
        let url = self.url(["users", username.as_str(), "repos"])?;
        self.send_json(self.authorized(HttpRequest::get(url), req))
    }

    pub fn get_private_repos(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        self.send_json(self.authorized(HttpRequest::get(self.url(["user", "repos"])?), req))
    }

    pub fn create_repo(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "name": req.value("name"),
            "description": req.value("description"),
        });
        let url = self.url(["user", "repos"])?;
        self.send_json(self.authorized(HttpRequest::post(url), req).json(body))
    }

    /// Returns `{"status_code", "message"}`; GitHub answers 204 with no body.
    pub fn delete_repo(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let url = self.repo_url(req, &[])?;
        let response = self.client.send(self.authorized(HttpRequest::delete(url), req))?;

        let message = if response.status == 204 {
            "Deleted".to_string()
        } else {
            response.body
        };
        Ok(json!({ "status_code": response.status, "message": message }))
    }

    pub fn update_repo(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let url = self.repo_url(req, &[])?;
        let body = json!({
            "name": req.value("name"),
            "description": req.value("description"),
        });
        self.send_json(self.authorized(HttpRequest::patch(url), req).json(body))
    }

    pub fn create_issue(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "title": req.value("title"),
            "body": req.value("body"),
        });
        self.create_in_repo(req, "issues", body)
    }

    pub fn create_pull_request(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "title": req.value("title"),
            "body": req.value("body"),
            "head": req.str_or("head", DEFAULT_BRANCH)?,
            "base": req.str_or("base", DEFAULT_BRANCH)?,
        });
        self.create_in_repo(req, "pulls", body)
    }

    pub fn create_release(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "tag_name": req.value("tag_name"),
            "name": req.value("name"),
            "body": req.value("body"),
        });
        self.create_in_repo(req, "releases", body)
    }

    pub fn create_label(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "name": req.value("name"),
            "color": req.value("color"),
        });
        self.create_in_repo(req, "labels", body)
    }

    pub fn create_milestone(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        let body = json!({
            "title": req.value("title"),
            "description": req.value("description"),
        });
        self.create_in_repo(req, "milestones", body)
    }
}
