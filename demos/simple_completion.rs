//! Simple completion example
//!
//! One request, no tools: build a request with the default sampling
//! profile, send it, print the answer and the token accounting.

use anyhow::Result;
use clova_agent::{CompletionClient, Message};

#[tokio::main]
async fn main() -> Result<()> {
    // Reads NCP_CLOVASTUDIO_ENDPOINT and NCP_API_KEY
    let client = CompletionClient::from_env()?;

    let history = vec![
        Message::system("You are a concise assistant."),
        Message::user("What is the capital of South Korea? One sentence."),
    ];

    println!("Sending completion request...\n");

    let request = client.build_request(history, None);
    let result = client.send(&request).await?.into_result()?;

    println!("Response: {}", result.message.as_text().unwrap_or_default());
    println!("Finish reason: {:?}", result.finish_reason);
    if let Some(usage) = result.usage {
        println!(
            "Tokens: {} prompt + {} completion = {} total",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
