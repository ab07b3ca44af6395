//! Core conversation and wire types for the Clova Agent SDK
//!
//! Everything that crosses the HTTP boundary serializes with camelCase
//! field names, matching the upstream chat-completions protocol.

use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message role in the conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content: plain text or an ordered sequence of content parts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multi-part message body.
///
/// Image parts carry exactly one of a remote URL or an inline data URI;
/// both share the `image_url` tag on the wire. Use [`ContentPart::validate`]
/// to check the exactly-one-of constraint on values built by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        #[serde(
            rename = "imageUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        image_url: Option<ImageUrl>,
        #[serde(rename = "dataUri", default, skip_serializing_if = "Option::is_none")]
        data_uri: Option<DataUri>,
    },
}

/// Remote image reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

/// Inline image payload, a full `data:` URI string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataUri {
    pub data: String,
}

impl ContentPart {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create an image part referencing a remote URL
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: Some(ImageUrl { url: url.into() }),
            data_uri: None,
        }
    }

    /// Create an image part carrying inline data (a full data URI)
    pub fn image_data(data: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: None,
            data_uri: Some(DataUri { data: data.into() }),
        }
    }

    /// Check the structural constraint on image parts: exactly one of
    /// {remote URL, inline data} must be present.
    pub fn validate(&self) -> crate::Result<()> {
        match self {
            ContentPart::Text { .. } => Ok(()),
            ContentPart::ImageUrl {
                image_url,
                data_uri,
            } => match (image_url, data_uri) {
                (Some(_), None) | (None, Some(_)) => Ok(()),
                (Some(_), Some(_)) => Err(crate::Error::schema(
                    "image part carries both a URL and inline data",
                )),
                (None, None) => Err(crate::Error::schema(
                    "image part carries neither a URL nor inline data",
                )),
            },
        }
    }
}

/// A model-issued request to invoke a named capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Opaque correlation token, echoed back on the result message
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: ToolCallFunction,
}

/// The capability name and its structured arguments.
///
/// `arguments` is a JSON object, not a serialized string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: ToolCallFunction {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,

    /// Set only on `tool`-role messages: which invocation this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Set only on `assistant`-role messages that request capability invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content,
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(text.into()))
    }

    /// Create an assistant message that requests tool invocations
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
            tool_call_id: None,
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a tool-result message correlated to an earlier tool call
    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Text(text.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }

    /// Create a user message from content parts (e.g. text plus images)
    pub fn user_with_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(Role::User, MessageContent::Parts(parts))
    }

    /// Plain-text view of the content; `None` when split into parts
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(_) => None,
        }
    }

    /// Check the role/field coherence of this message in isolation:
    /// `tool_call_id` only on tool messages (and always on them),
    /// `tool_calls` only on assistant messages, content parts well-formed.
    pub fn validate(&self) -> crate::Result<()> {
        match self.role {
            Role::Tool => {
                if self.tool_call_id.is_none() {
                    return Err(crate::Error::schema(
                        "tool message is missing its toolCallId",
                    ));
                }
            }
            _ => {
                if self.tool_call_id.is_some() {
                    return Err(crate::Error::schema(format!(
                        "toolCallId is only valid on tool messages, found it on a {:?} message",
                        self.role
                    )));
                }
            }
        }
        if self.tool_calls.is_some() && self.role != Role::Assistant {
            return Err(crate::Error::schema(format!(
                "toolCalls is only valid on assistant messages, found it on a {:?} message",
                self.role
            )));
        }
        if let MessageContent::Parts(parts) = &self.content {
            for part in parts {
                part.validate()?;
            }
        }
        Ok(())
    }
}

/// Check the correlation invariant across an ordered history: every
/// tool-result message must reference the id of exactly one tool call
/// emitted by an earlier assistant message.
pub fn validate_history(messages: &[Message]) -> crate::Result<()> {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    for message in messages {
        message.validate()?;
        if message.role == Role::Tool {
            let id = message.tool_call_id.as_deref().unwrap_or_default();
            match seen_ids.get(id) {
                Some(1) => {}
                Some(_) => {
                    return Err(crate::Error::schema(format!(
                        "tool message references ambiguous tool call id '{id}'"
                    )));
                }
                None => {
                    return Err(crate::Error::schema(format!(
                        "tool message references unknown tool call id '{id}'"
                    )));
                }
            }
        }
        if let Some(calls) = &message.tool_calls {
            for call in calls {
                *seen_ids.entry(call.id.as_str()).or_insert(0) += 1;
            }
        }
    }
    Ok(())
}

/// Tool-choice policy offered alongside tools
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
}

/// Outbound completion request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_ai_filters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
}

/// Envelope-level status carried by every response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseStatus {
    pub code: String,
    pub message: String,
}

/// The literal status code the upstream uses for success
pub const SUCCESS_STATUS_CODE: &str = "20000";

impl ResponseStatus {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_STATUS_CODE
    }
}

/// Token accounting reported by the upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Successful completion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub message: Message,
    pub finish_reason: FinishReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionResult {
    /// Check finish-reason coherence: `tool_calls` implies the message
    /// carries at least one call, any other reason implies it carries none.
    pub fn validate(&self) -> crate::Result<()> {
        let call_count = self
            .message
            .tool_calls
            .as_ref()
            .map(|calls| calls.len())
            .unwrap_or(0);
        match self.finish_reason {
            FinishReason::ToolCalls if call_count == 0 => Err(crate::Error::schema(
                "finishReason is tool_calls but the message carries no tool calls",
            )),
            FinishReason::Stop | FinishReason::Length if call_count > 0 => {
                Err(crate::Error::schema(format!(
                    "finishReason is {:?} but the message carries {call_count} tool call(s)",
                    self.finish_reason
                )))
            }
            _ => Ok(()),
        }
    }

    /// Tool calls requested by this result, empty when it is a plain answer
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.message.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Inbound completion response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CompletionResult>,
}

impl CompletionResponse {
    /// Take the completion payload, failing on envelopes that carry none
    pub fn into_result(self) -> crate::Result<CompletionResult> {
        self.result.ok_or_else(|| {
            crate::Error::upstream_api(self.status.code, "response envelope is missing its result")
        })
    }
}
