//! Tool-specific error types.

use thiserror::Error;

/// Errors raised by the tool registry.
///
/// Registration errors (`InvalidDescriptor`, `DuplicateTool`) are fatal at
/// startup. Invocation errors (`UnknownTool`, `MissingParameters`) are
/// returned to whoever asked for the call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    /// The descriptor failed validation.
    #[error("Invalid descriptor for tool '{tool}': {reason}")]
    InvalidDescriptor { tool: String, reason: String },

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// Required parameters were absent from the invocation.
    #[error("Missing required parameters for tool '{tool}': {}", .missing.join(", "))]
    MissingParameters { tool: String, missing: Vec<String> },
}

impl ToolError {
    /// Create a new "invalid descriptor" error.
    pub fn invalid_descriptor(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "unknown tool" error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }
}

/// Failure of a handler's outbound call.
///
/// Never escapes `ToolRegistry::invoke`: the registry turns it into an
/// `{"error": ...}` failure descriptor.
#[derive(Debug, Error)]
pub enum ExternalCallError {
    /// The request could not be sent or the connection failed.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a status the handler treats as failure.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// A parameter had the wrong shape for the request being built.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The handler refused the call before sending anything.
    #[error("{0}")]
    Rejected(String),
}

impl ExternalCallError {
    /// Create a new "invalid parameter" error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new "rejected" error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

impl From<reqwest::Error> for ExternalCallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
