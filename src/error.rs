//! Error types for the Clova Agent SDK

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure before an HTTP status was obtained
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Transport succeeded but the HTTP status was not 2xx
    #[error("Upstream HTTP error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// HTTP succeeded but the response envelope carried a non-success code
    #[error("Upstream API error {code}: {message}")]
    UpstreamApi { code: String, message: String },

    /// Tool execution error
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// A tool call named a capability that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool-call arguments do not satisfy the declared parameter schema
    #[error("Schema violation: {0}")]
    Schema(String),
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new upstream HTTP error
    pub fn upstream_http(status: u16, body: impl Into<String>) -> Self {
        Error::UpstreamHttp {
            status,
            body: body.into(),
        }
    }

    /// Create a new upstream API error
    pub fn upstream_api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UpstreamApi {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new tool error
    pub fn tool(msg: impl Into<String>) -> Self {
        Error::Tool(msg.into())
    }

    /// Create a new unknown-tool error
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Error::UnknownTool(name.into())
    }

    /// Create a new schema-violation error
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }
}
