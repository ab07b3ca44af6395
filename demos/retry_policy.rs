//! Retry policy example
//!
//! The client makes exactly one attempt per send, so transient-failure
//! handling is a wrapper: conditional retry with exponential backoff, which
//! gives up immediately on errors a retry cannot fix.

use anyhow::Result;
use clova_agent::retry::{RetryConfig, is_retryable_error, retry_with_backoff_conditional};
use clova_agent::{CompletionClient, Message};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let client = CompletionClient::from_env()?;
    let request = client.build_request(
        vec![Message::user("Give me one sentence about Rust.")],
        None,
    );

    let config = RetryConfig::default()
        .with_max_attempts(4)
        .with_initial_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8))
        .with_jitter_factor(0.2);

    println!("Sending with up to {} attempts...", config.max_attempts);

    match retry_with_backoff_conditional(config, || client.send(&request)).await {
        Ok(response) => {
            let result = response.into_result()?;
            println!("Response: {}", result.message.as_text().unwrap_or_default());
        }
        Err(err) => {
            // is_retryable_error tells you whether more attempts would have
            // helped, useful when deciding what to surface to users
            println!(
                "Failed ({}): {err}",
                if is_retryable_error(&err) {
                    "transient, budget exhausted"
                } else {
                    "permanent"
                }
            );
        }
    }

    Ok(())
}
