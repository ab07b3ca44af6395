//! # Tool Executor
//!
//! The bridge between a model-issued [`ToolCall`] and the registered handler
//! that fulfills it. The executor has one hard rule: failures never unwind.
//! An unknown name, arguments that violate the declared schema, or a handler
//! error all become the text of a `tool`-role message, so the conversation
//! keeps going and the model can react to the failure.

use crate::tools::ToolRegistry;
use crate::types::{Message, ToolCall};
use futures::future::join_all;
use tracing::{debug, warn};

/// Runs tool calls against a registry and renders each outcome as a message
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The registry backing this executor
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one tool call and render the outcome as a `tool` message.
    ///
    /// Never fails outward. Resolution, validation, and handler errors all
    /// come back as message text, correlated with the call's id so the model
    /// can see which invocation went wrong.
    pub async fn execute(&self, call: &ToolCall) -> Message {
        let name = &call.function.name;
        debug!(tool = %name, id = %call.id, "executing tool call");

        let content = match self.run(call).await {
            Ok(rendered) => rendered,
            Err(error) => {
                warn!(tool = %name, id = %call.id, error = %error, "tool call failed");
                failure_text(name, &error)
            }
        };
        Message::tool(&call.id, content)
    }

    /// Execute every call of one model turn.
    ///
    /// Calls within a turn are independent, so they run concurrently; results
    /// come back in the original request order, keeping each tool message
    /// aligned with the `toolCalls` entry it answers.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<Message> {
        join_all(calls.iter().map(|call| self.execute(call))).await
    }

    async fn run(&self, call: &ToolCall) -> crate::Result<String> {
        let registered = self.registry.resolve(&call.function.name)?;
        registered
            .parameters()
            .validate_arguments(&call.function.arguments)?;
        registered.invoke(call.function.arguments.clone()).await
    }
}

// The rendered text is read by the model, not by our callers, so taxonomy
// wrappers are unwrapped into plain prose.
fn failure_text(name: &str, error: &crate::Error) -> String {
    let detail = match error {
        crate::Error::Tool(message) | crate::Error::Schema(message) => message.clone(),
        crate::Error::UnknownTool(_) => "no such tool is registered".to_string(),
        other => other.to_string(),
    };
    format!("Error executing {name}: {detail}")
}
