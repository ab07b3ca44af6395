//! # Clova Agent SDK
//!
//! A tool-calling agent SDK for CLOVA Studio Chat Completions (HyperCLOVA X).
//!
//! ## Overview
//!
//! The SDK drives one conversation exchange end to end: it submits the
//! message history to the completion endpoint, detects when the model asks
//! for a tool, executes the tool, feeds the result back, and returns the
//! final answer together with the full extended history.
//!
//! ## Key Features
//!
//! - **Tool Calling**: Declarative tool schemas with validated arguments and
//!   async handlers
//! - **Orchestration**: The model-turn / tool-turn loop with a bounded round
//!   budget and loop detection
//! - **Failure Containment**: Tool failures become conversation messages the
//!   model can react to, never panics or lost histories
//! - **Vision Requests**: A second sampling profile for image-bearing
//!   conversations
//! - **Bundled Capability**: A ready-made `search_news` tool backed by a
//!   NewsAPI-style article index
//! - **Retry Logic**: Exponential backoff with jitter for transient upstream
//!   failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clova_agent::news::NewsClient;
//! use clova_agent::{
//!     CompletionClient, Message, Orchestrator, ToolExecutor, ToolRegistry, news_tool,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> clova_agent::Result<()> {
//!     // Reads NCP_CLOVASTUDIO_ENDPOINT and NCP_API_KEY
//!     let client = CompletionClient::from_env()?;
//!
//!     // One bundled tool: article search via NEWSAPI_KEY
//!     let registry = ToolRegistry::new(vec![news_tool(Arc::new(NewsClient::from_env()))])?;
//!     let orchestrator = Orchestrator::new(client, ToolExecutor::new(registry));
//!
//!     let outcome = orchestrator
//!         .orchestrate(vec![Message::user("What happened in AI this week?")])
//!         .await;
//!
//!     if let Some(error) = &outcome.error {
//!         eprintln!("exchange failed: {error}");
//!     }
//!     for message in &outcome.history {
//!         println!("{:?}: {}", message.role, message.as_text().unwrap_or("<parts>"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Tools
//!
//! ```rust,no_run
//! use clova_agent::{ParameterType, ToolRegistry, tool};
//!
//! let time = tool("get_time", "Get the current time for a timezone")
//!     .required_param("timezone", ParameterType::String, "IANA timezone name")
//!     .build(|args| async move {
//!         let zone = args["timezone"].as_str().unwrap_or("UTC").to_string();
//!         Ok(format!("12:00 in {zone}"))
//!     });
//!
//! let registry = ToolRegistry::new(vec![time]).unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **types**: Messages, content parts, tool calls, and the request/response
//!   envelope in the upstream wire format
//! - **tools**: Tool schemas, the registry, and argument validation
//! - **client**: Request building (text and vision profiles) and the single
//!   validated HTTP round-trip
//! - **executor**: Tool dispatch with unconditional failure-to-message
//!   conversion
//! - **orchestrator**: The model-turn / tool-turn state machine and the
//!   caller-facing entry point
//! - **news**: The bundled article-search capability behind a pluggable
//!   source trait
//! - **config**: Endpoint, credential, and model-selector resolution
//! - **error**: The error taxonomy and `Result<T>` alias
//! - **retry**: Exponential backoff retry logic with jitter

/// Completion client: request building, transport, envelope validation.
mod client;

/// Endpoint/credential configuration with environment variable support.
mod config;

/// Error taxonomy and the `Result<T>` alias used across all public APIs.
mod error;

/// Tool executor: dispatch plus unconditional failure containment.
mod executor;

/// Orchestrator: the model-turn / tool-turn loop and the entry point.
mod orchestrator;

/// Tool schemas, registry, argument validation, and the `tool()` builder.
mod tools;

/// Wire types for messages, tool calls, and the completion envelope.
mod types;

/// Bundled article-search capability (`search_news`).
///
/// Public as a module so callers can reach the source trait, the search
/// parameter types, and the rendering helper alongside the re-exported
/// entry points below.
pub mod news;

/// Retry utilities with exponential backoff.
///
/// Public as a module so callers can wrap their own operations, not just
/// completion calls.
pub mod retry;

// --- Core Client API ---

pub use client::{CompletionClient, DEFAULT_MAX_TOKENS};

// --- Configuration ---

pub use config::{API_KEY_ENV, ClientConfig, ENDPOINT_ENV, MODEL_ENV};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Orchestration ---

pub use executor::ToolExecutor;
pub use orchestrator::{
    DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_SYSTEM_PROMPT, OrchestrationOutcome, Orchestrator,
};

// --- Tool System ---

pub use news::{ArticleSource, news_tool};
pub use tools::{
    ParameterType, RegisteredTool, Tool, ToolBuilder, ToolParameter, ToolParameters, ToolRegistry,
    tool,
};

// --- Wire Types ---

pub use types::{
    CompletionRequest, CompletionResponse, CompletionResult, ContentPart, DataUri, FinishReason,
    ImageUrl, Message, MessageContent, ResponseStatus, Role, SUCCESS_STATUS_CODE, ToolCall,
    ToolCallFunction, ToolChoice, Usage, validate_history,
};

/// Convenience module containing the most commonly used types and functions.
/// Import with `use clova_agent::prelude::*;` for typical usage.
pub mod prelude {
    pub use crate::{
        ClientConfig, CompletionClient, Error, Message, OrchestrationOutcome, Orchestrator,
        ParameterType, Result, Role, Tool, ToolExecutor, ToolRegistry, news_tool, tool,
    };
}
