//! Configuration for the Clova Agent SDK

use std::env;

/// Environment variable holding the completion endpoint URL
pub const ENDPOINT_ENV: &str = "NCP_CLOVASTUDIO_ENDPOINT";

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "NCP_API_KEY";

/// Environment variable holding an optional model selector override
pub const MODEL_ENV: &str = "NCP_CLOVASTUDIO_MODEL";

/// Connection settings for one upstream completion endpoint.
///
/// A config is just a carrier; nothing is validated until it is handed to
/// [`crate::CompletionClient::new`], which is where a missing endpoint or
/// credential becomes a fatal configuration error.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Optional whole-call deadline in seconds. Expiry surfaces as a
    /// transport failure; no deadline is imposed when unset.
    pub timeout_secs: Option<u64>,
}

// Never print the credential.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the environment.
    ///
    /// Sources:
    /// 1. `NCP_CLOVASTUDIO_ENDPOINT` - completion endpoint URL
    /// 2. `NCP_API_KEY` - bearer credential
    /// 3. `NCP_CLOVASTUDIO_MODEL` - optional model selector
    ///
    /// Unset variables leave the corresponding field `None`; client
    /// construction decides which absences are fatal.
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var(ENDPOINT_ENV).ok(),
            api_key: env::var(API_KEY_ENV).ok(),
            model: env::var(MODEL_ENV).ok(),
            timeout_secs: None,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Swap the model identifier embedded at the tail of an endpoint URL.
///
/// Upstream endpoints carry the target model as their final path segment
/// (e.g. `.../v3/chat-completions/HCX-007`). When that tail is a model
/// identifier it is replaced with `model`; otherwise the endpoint is
/// returned unchanged.
pub fn replace_model_segment(endpoint: &str, model: &str) -> String {
    match endpoint.rsplit_once('/') {
        Some((base, tail))
            if tail
                .strip_prefix("HCX-")
                .is_some_and(|rest| !rest.is_empty()) =>
        {
            format!("{base}/{model}")
        }
        _ => endpoint.to_string(),
    }
}
