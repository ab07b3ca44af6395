//! # Orchestrator
//!
//! Drives one conversation exchange end to end: a model turn, an optional
//! tool turn, and the follow-up model turn that turns tool results into an
//! answer. State machine per invocation:
//!
//! ```text
//! START → MODEL_TURN → {TOOL_TURN → MODEL_TURN} → DONE
//! ```
//!
//! - **START**: a default system message is prepended when the caller's
//!   history does not open with one.
//! - **MODEL_TURN**: the full tool menu is offered while the round budget
//!   allows; the assistant message is appended to the history.
//! - **TOOL_TURN**: every requested call is executed and its result appended
//!   in the order the calls were issued.
//! - **DONE**: any finish reason other than `tool_calls` ends the exchange.
//!
//! The default budget is one tool turn per invocation. Raising
//! [`Orchestrator::with_max_tool_rounds`] lets the model chain calls, with
//! two guards against runaway loops: the budget itself, and a repeated
//! identical call (same name, same arguments) which stops the tool menu from
//! being offered again. The final permitted round always omits tools so the
//! model must conclude in text.
//!
//! [`Orchestrator::orchestrate`] never fails outward. Upstream and
//! serialization failures are captured into [`OrchestrationOutcome::error`]
//! with the partially extended history still returned, and tool failures
//! never reach the outcome at all: the executor renders them as `tool`
//! messages the model can react to.

use crate::client::CompletionClient;
use crate::executor::ToolExecutor;
use crate::types::{FinishReason, Message, Role};
use std::collections::HashSet;
use tracing::{debug, warn};

/// System message prepended when the caller's history does not supply one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful news research assistant. \
    When users ask about news or current events, use the search_news tool to find \
    relevant articles. Provide concise summaries of the news articles you find, \
    highlighting key points and sources. Always be objective and cite your sources.";

/// Tool turns permitted per invocation unless overridden
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 1;

/// What one orchestration produced.
///
/// `history` always contains everything appended before any failure, so a
/// caller can render the partial conversation alongside the error.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationOutcome {
    pub history: Vec<Message>,
    pub error: Option<String>,
}

impl OrchestrationOutcome {
    /// The last assistant message, usually the model's final answer
    pub fn final_answer(&self) -> Option<&Message> {
        self.history
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }
}

/// Sequences model turns and tool turns over one client and one registry
#[derive(Debug)]
pub struct Orchestrator {
    client: CompletionClient,
    executor: ToolExecutor,
    system_prompt: String,
    max_tool_rounds: usize,
}

impl Orchestrator {
    pub fn new(client: CompletionClient, executor: ToolExecutor) -> Self {
        Self {
            client,
            executor,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Replace the default system message
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Permit up to `rounds` tool turns per invocation.
    ///
    /// Zero disables tool offering entirely; the exchange becomes a single
    /// plain completion round.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Run one exchange and return the extended history.
    ///
    /// Never returns an error: upstream failures land in
    /// [`OrchestrationOutcome::error`], tool failures land in the
    /// conversation itself.
    pub async fn orchestrate(&self, history: Vec<Message>) -> OrchestrationOutcome {
        let mut history = history;
        match self.drive(&mut history).await {
            Ok(()) => OrchestrationOutcome {
                history,
                error: None,
            },
            Err(error) => {
                warn!(error = %error, "orchestration failed");
                OrchestrationOutcome {
                    history,
                    error: Some(error.to_string()),
                }
            }
        }
    }

    async fn drive(&self, history: &mut Vec<Message>) -> crate::Result<()> {
        if history.first().map(|m| m.role) != Some(Role::System) {
            history.insert(0, Message::system(&self.system_prompt));
        }

        let mut rounds_used = 0;
        let mut executed: HashSet<String> = HashSet::new();
        let mut offer_tools = self.max_tool_rounds > 0 && !self.executor.registry().is_empty();

        loop {
            let tools = offer_tools.then(|| self.executor.registry().list_tools());
            let request = self.client.build_request(history.clone(), tools);
            let result = self.client.send(&request).await?.into_result()?;

            let requested_calls = result.finish_reason == FinishReason::ToolCalls;
            let calls = result.message.tool_calls.clone().unwrap_or_default();
            history.push(result.message);

            if !requested_calls {
                return Ok(());
            }
            if !offer_tools {
                // The menu was withheld this round; a tool-calls finish here
                // is upstream misbehavior and must not restart the loop.
                warn!("upstream requested tools on a round where none were offered");
                return Ok(());
            }

            rounds_used += 1;
            let mut repeated_call = false;
            for call in &calls {
                let signature = format!("{}:{}", call.function.name, call.function.arguments);
                if !executed.insert(signature) {
                    repeated_call = true;
                }
            }
            if repeated_call {
                debug!("repeated identical tool call detected, tool menu withdrawn");
            }

            debug!(round = rounds_used, calls = calls.len(), "executing tool turn");
            history.extend(self.executor.execute_all(&calls).await);

            // The final permitted round omits tools so the model answers in
            // text instead of queueing more calls.
            offer_tools = rounds_used < self.max_tool_rounds && !repeated_call;
        }
    }
}
