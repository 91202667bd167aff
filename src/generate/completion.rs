//! Chat-completion client used by the draft generator.
//!
//! One attempt per request, no retry: the generator treats any failure here
//! as a signal to keep its heuristic draft.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4.1";
const SYSTEM_PROMPT: &str = "You are a growth architect for a personal development product.";

/// Produces a raw completion for a prompt.
///
/// Injected into the router state so tests can substitute a fake; the
/// production implementation is [`ChatCompletionClient`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client for the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    api_key: String,
    client: Client,
}

impl ChatCompletionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.3,
        });

        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("completion call failed with {status}: {text}");
        }

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("completion response did not contain a message"))
    }
}
