//! AI advisor client.
//!
//! Speaks the OpenAI-compatible chat-completions shape. Rate-limit
//! responses get exactly one retry after a fixed backoff; every other
//! failure surfaces as [`CoreError::AdvisorUnavailable`] so callers can
//! fall through to the deterministic path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::Advisor;
use crate::error::{CoreError, CoreResult};

/// Prompts longer than this are truncated before sending; the advisor's
/// context window is the bottleneck, not ours.
const MAX_PROMPT_CHARS: usize = 3000;
const TRUNCATION_MARKER: &str = "\n... (truncated to fit token limit)";

/// Retry policy for rate-limit conditions: one fixed-delay retry, then
/// give up. Kept as a [`Backoff`] impl so the rule is explicit and
/// testable rather than buried in request code.
#[derive(Debug, Clone)]
pub struct SingleFixedRetry {
    delay: Duration,
    spent: bool,
}

impl SingleFixedRetry {
    pub fn new(delay: Duration) -> Self {
        Self { delay, spent: false }
    }
}

impl Backoff for SingleFixedRetry {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.spent {
            None
        } else {
            self.spent = true;
            Some(self.delay)
        }
    }

    fn reset(&mut self) {
        self.spent = false;
    }
}

/// How a single completion request failed; rate limits are the only
/// retryable condition.
enum RequestFault {
    RateLimited,
    Other(CoreError),
}

/// Client for the AI advisor service.
#[derive(Clone)]
pub struct AdvisorClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    retry_backoff: Duration,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl AdvisorClient {
    /// Create a new advisor client.
    pub fn new(
        base_url: &Url,
        api_key: &str,
        model: &str,
        timeout_seconds: u64,
        retry_backoff_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = %base_url, model = model, "Advisor client initialized");

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            retry_backoff: Duration::from_secs(retry_backoff_seconds),
        })
    }

    async fn request_completion(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, RequestFault> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: 0.7,
        };

        debug!(url = %url, prompt_chars = prompt.len(), "Advisor request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                RequestFault::Other(CoreError::AdvisorUnavailable(format!("request failed: {e}")))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RequestFault::RateLimited);
        }
        if !status.is_success() {
            return Err(RequestFault::Other(CoreError::AdvisorUnavailable(format!(
                "HTTP {status} from advisor"
            ))));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            RequestFault::Other(CoreError::AdvisorUnavailable(format!("invalid response: {e}")))
        })?;

        parsed.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RequestFault::Other(CoreError::AdvisorUnavailable(
                "response carried no choices".to_string(),
            ))
        })
    }
}

#[async_trait]
impl Advisor for AdvisorClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> CoreResult<String> {
        let prompt = truncate_prompt(prompt);

        let policy = SingleFixedRetry::new(self.retry_backoff);
        let result = backoff::future::retry(policy, || async {
            self.request_completion(&prompt, max_tokens)
                .await
                .map_err(|fault| match fault {
                    RequestFault::RateLimited => {
                        warn!("Advisor rate limited, backing off once");
                        backoff::Error::transient(CoreError::AdvisorUnavailable(
                            "rate limited".to_string(),
                        ))
                    }
                    RequestFault::Other(e) => backoff::Error::permanent(e),
                })
        })
        .await;

        match &result {
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Advisor completion failed"),
        }
        result
    }
}

fn truncate_prompt(prompt: &str) -> String {
    if prompt.len() <= MAX_PROMPT_CHARS {
        return prompt.to_string();
    }
    let mut cut = MAX_PROMPT_CHARS;
    while !prompt.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = prompt[..cut].to_string();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
