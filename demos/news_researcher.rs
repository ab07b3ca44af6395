//! News researcher example
//!
//! The full tool-calling exchange: the model decides to search, the bundled
//! `search_news` capability runs against NewsAPI, and the follow-up turn
//! summarizes the findings.
//!
//! Required environment:
//! - NCP_CLOVASTUDIO_ENDPOINT, NCP_API_KEY (completion endpoint)
//! - NEWSAPI_KEY (article search; without it the tool fails gracefully and
//!   the model reports the problem instead of answering)

use anyhow::Result;
use clova_agent::news::NewsClient;
use clova_agent::{
    CompletionClient, Message, Orchestrator, Role, ToolExecutor, ToolRegistry, news_tool,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = CompletionClient::from_env()?;
    let registry = ToolRegistry::new(vec![news_tool(Arc::new(NewsClient::from_env()))])?;
    let orchestrator = Orchestrator::new(client, ToolExecutor::new(registry));

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What happened in AI this week?".to_string());
    println!("Question: {question}\n");

    let outcome = orchestrator.orchestrate(vec![Message::user(question)]).await;

    for message in &outcome.history {
        match message.role {
            Role::System => continue,
            Role::Tool => {
                println!("[tool result]\n{}\n", message.as_text().unwrap_or_default());
            }
            Role::Assistant => {
                let text = message.as_text().unwrap_or_default();
                if let Some(calls) = &message.tool_calls {
                    for call in calls {
                        println!(
                            "[assistant requests {}] {}",
                            call.function.name, call.function.arguments
                        );
                    }
                }
                if !text.is_empty() {
                    println!("Assistant: {text}\n");
                }
            }
            Role::User => println!("User: {}\n", message.as_text().unwrap_or_default()),
        }
    }

    if let Some(error) = outcome.error {
        eprintln!("Exchange failed: {error}");
    }

    Ok(())
}
