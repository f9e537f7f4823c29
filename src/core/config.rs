//! Configuration management for the toolkit server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (and a `.env` file) on top of defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for the toolkit server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Which toolkits get registered at startup.
    pub toolkits: ToolkitsConfig,

    /// Base URLs of the external APIs.
    pub endpoints: EndpointsConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Problems found while loading; logged once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// A group of tools backed by one external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolkit {
    Github,
    Hubspot,
    Tavily,
}

impl Toolkit {
    pub const ALL: [Toolkit; 3] = [Toolkit::Github, Toolkit::Hubspot, Toolkit::Tavily];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Hubspot => "hubspot",
            Self::Tavily => "tavily",
        }
    }
}

impl fmt::Display for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toolkit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "hubspot" => Ok(Self::Hubspot),
            "tavily" => Ok(Self::Tavily),
            other => Err(format!("unknown toolkit: {}", other)),
        }
    }
}

/// Toolkit selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitsConfig {
    pub enabled: Vec<Toolkit>,
}

impl ToolkitsConfig {
    pub fn is_enabled(&self, toolkit: Toolkit) -> bool {
        self.enabled.contains(&toolkit)
    }

    /// Parse a comma-separated list. Unknown names are skipped and
    /// returned alongside the selection.
    pub fn parse_list(list: &str) -> (Self, Vec<String>) {
        let mut enabled = Vec::new();
        let mut unknown = Vec::new();
        for item in list.split(',').filter(|s| !s.trim().is_empty()) {
            match item.parse::<Toolkit>() {
                Ok(toolkit) if !enabled.contains(&toolkit) => enabled.push(toolkit),
                Ok(_) => {}
                Err(_) => unknown.push(item.trim().to_string()),
            }
        }
        (Self { enabled }, unknown)
    }
}

impl Default for ToolkitsConfig {
    fn default() -> Self {
        Self {
            enabled: Toolkit::ALL.to_vec(),
        }
    }
}

/// Base URLs of the external APIs, without trailing slash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub github: String,
    pub hubspot: String,
    pub tavily: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            github: "https://api.github.com".to_string(),
            hubspot: "https://api.hubapi.com".to_string(),
            tavily: "https://api.tavily.com".to_string(),
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Sent on every request; GitHub rejects requests without one.
    pub user_agent: String,

    /// Request timeout. `None` keeps the client library default.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("atp-toolkits/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "atp-toolkits".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            toolkits: ToolkitsConfig::default(),
            endpoints: EndpointsConfig::default(),
            client: ClientConfig::default(),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `ATP_`, for example
    /// `ATP_SERVER_NAME`, `ATP_LOG_LEVEL`, `ATP_TOOLKITS`.
    ///
    /// Runs before logging is initialized, so invalid values are recorded in
    /// [`Config::warnings`] instead of being logged here.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("ATP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("ATP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(list) = std::env::var("ATP_TOOLKITS") {
            let (toolkits, unknown) = ToolkitsConfig::parse_list(&list);
            for name in unknown {
                config.warnings.push(format!("Ignoring unknown toolkit in ATP_TOOLKITS: {}", name));
            }
            if toolkits.enabled.is_empty() {
                config
                    .warnings
                    .push("ATP_TOOLKITS selects no known toolkit - no tools will be registered".to_string());
            }
            config.toolkits = toolkits;
        }

        if let Ok(url) = std::env::var("ATP_GITHUB_API_URL") {
            config.endpoints.github = trim_base_url(url);
        }
        if let Ok(url) = std::env::var("ATP_HUBSPOT_API_URL") {
            config.endpoints.hubspot = trim_base_url(url);
        }
        if let Ok(url) = std::env::var("ATP_TAVILY_API_URL") {
            config.endpoints.tavily = trim_base_url(url);
        }

        if let Ok(agent) = std::env::var("ATP_HTTP_USER_AGENT") {
            config.client.user_agent = agent;
        }

        if let Ok(timeout) = std::env::var("ATP_HTTP_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => config.client.timeout_secs = Some(secs),
                Err(_) => config
                    .warnings
                    .push(format!("Ignoring invalid ATP_HTTP_TIMEOUT_SECS: {}", timeout)),
            }
        }

        config
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
