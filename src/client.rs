//! # Completion Client
//!
//! [`CompletionClient`] turns a [`CompletionRequest`] into a validated
//! [`CompletionResponse`] against one configured upstream endpoint and
//! credential. It owns exactly three responsibilities:
//!
//! 1. **Request building** - [`CompletionClient::build_request`] applies the
//!    default sampling profile and enforces the tools/maxTokens rule: the
//!    upstream rejects a request that carries both a tool menu and an output
//!    token limit, so offering tools drops `maxTokens` and omitting them
//!    applies the default limit.
//! 2. **Transport** - [`CompletionClient::send`] performs a single HTTP POST
//!    with a fresh `X-Request-Id` per call. One call, one attempt: retry
//!    policy belongs to the caller (see [`crate::retry`]).
//! 3. **Envelope validation** - HTTP status, the embedded status code, and
//!    finish-reason coherence are all checked before a response is handed
//!    back, so callers never see a half-trusted envelope.
//!
//! Failures map onto the crate error taxonomy: network trouble is
//! [`Error::Transport`], a non-2xx HTTP status is [`Error::UpstreamHttp`]
//! with the status and body, and a 2xx envelope whose own status code is not
//! the success literal is [`Error::UpstreamApi`].
//!
//! ```rust,no_run
//! use clova_agent::{ClientConfig, CompletionClient, Message};
//!
//! # async fn example() -> clova_agent::Result<()> {
//! let client = CompletionClient::new(
//!     ClientConfig::new()
//!         .endpoint("https://example.com/v3/chat-completions/HCX-007")
//!         .api_key("secret"),
//! )?;
//!
//! let request = client.build_request(vec![Message::user("Hello")], None);
//! let response = client.send(&request).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{API_KEY_ENV, ClientConfig, ENDPOINT_ENV, replace_model_segment};
use crate::tools::Tool;
use crate::types::{CompletionRequest, CompletionResponse, Message, ToolChoice};
use crate::{Error, Result};
use std::time::Duration;
use tracing::{debug, warn};

// Default sampling profile for text conversations.
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 0.8;
const DEFAULT_REPETITION_PENALTY: f32 = 1.2;

/// Output cap applied whenever no tools are offered
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

// Sampling profile for vision requests (image content parts).
const VISION_TEMPERATURE: f32 = 0.5;
const VISION_TOP_P: f32 = 0.8;
const VISION_TOP_K: u32 = 0;
const VISION_MAX_TOKENS: u32 = 1000;
const VISION_REPETITION_PENALTY: f32 = 1.1;

/// Client for one upstream completion endpoint
pub struct CompletionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

// Never print the credential.
impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .finish()
    }
}

impl CompletionClient {
    /// Create a client from the given configuration.
    ///
    /// The endpoint and credential are mandatory; their absence is a fatal
    /// configuration error raised here, never at call time. A model
    /// selector, when present, replaces the model identifier at the tail of
    /// the endpoint path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the endpoint or credential is missing
    /// or empty, or when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::config(format!("completion endpoint is not set ({ENDPOINT_ENV})"))
            })?;
        let api_key = config
            .api_key
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::config(format!("API credential is not set ({API_KEY_ENV})")))?;

        let endpoint = match &config.model {
            Some(model) => replace_model_segment(&endpoint, model),
            None => endpoint,
        };

        // Reused across requests for connection pooling
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }

    /// Create a client from environment variables (see [`crate::config`])
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The resolved endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a request with the default sampling profile.
    ///
    /// When `tools` is present and non-empty the menu is offered with
    /// `toolChoice = "auto"` and no output token limit; otherwise the
    /// default `maxTokens` cap applies and no tool fields are emitted.
    pub fn build_request(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<Tool>>,
    ) -> CompletionRequest {
        let tools = tools.filter(|t| !t.is_empty());
        let has_tools = tools.is_some();
        CompletionRequest {
            messages,
            tool_choice: has_tools.then_some(ToolChoice::Auto),
            max_tokens: if has_tools {
                None
            } else {
                Some(DEFAULT_MAX_TOKENS)
            },
            tools,
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            top_k: None,
            repetition_penalty: Some(DEFAULT_REPETITION_PENALTY),
            stop: None,
            include_ai_filters: Some(true),
            seed: None,
        }
    }

    /// Build a request with the vision sampling profile.
    ///
    /// Used for conversations carrying image content parts against a vision
    /// model selector. Vision requests never offer tools.
    pub fn build_vision_request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            messages,
            tools: None,
            tool_choice: None,
            temperature: Some(VISION_TEMPERATURE),
            top_p: Some(VISION_TOP_P),
            top_k: Some(VISION_TOP_K),
            max_tokens: Some(VISION_MAX_TOKENS),
            repetition_penalty: Some(VISION_REPETITION_PENALTY),
            stop: Some(Vec::new()),
            include_ai_filters: None,
            seed: None,
        }
    }

    /// Send one request and validate the response envelope.
    ///
    /// Exactly one attempt is made; transient failures are reported, not
    /// retried. A fresh correlation id is attached as the `X-Request-Id`
    /// header on every call so upstream traces can be matched to client
    /// logs. The id is never interpreted.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`]: the request never produced an HTTP status
    /// - [`Error::UpstreamHttp`]: non-2xx status, with the response body
    /// - [`Error::UpstreamApi`]: 2xx but the envelope's status code is not
    ///   the success literal, or the envelope is internally inconsistent
    /// - [`Error::Json`]: the 2xx body was not a parseable envelope
    pub async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();

        debug!(
            request_id = %request_id,
            messages = request.messages.len(),
            tools_offered = request.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "sending completion request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Request-Id", &request_id)
            .json(request)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error (failed to read response body)".to_string());
            warn!(
                request_id = %request_id,
                status = status.as_u16(),
                "completion request rejected"
            );
            return Err(Error::upstream_http(status.as_u16(), body));
        }

        let body = response.text().await.map_err(Error::Transport)?;
        let envelope: CompletionResponse = serde_json::from_str(&body)?;

        if !envelope.status.is_success() {
            warn!(
                request_id = %request_id,
                code = %envelope.status.code,
                "completion envelope carried an error status"
            );
            return Err(Error::upstream_api(
                envelope.status.code.clone(),
                envelope.status.message.clone(),
            ));
        }

        let result = envelope.result.as_ref().ok_or_else(|| {
            Error::upstream_api(
                envelope.status.code.clone(),
                "response envelope is missing its result",
            )
        })?;
        result
            .validate()
            .map_err(|e| Error::upstream_api(envelope.status.code.clone(), e.to_string()))?;

        debug!(
            request_id = %request_id,
            finish_reason = ?result.finish_reason,
            total_tokens = result.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            "completion request succeeded"
        );

        Ok(envelope)
    }
}
