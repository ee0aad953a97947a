//! LLM API interaction with exponential backoff retry logic.
//!
//! This module talks to an OpenAI-compatible chat-completion endpoint. The
//! request shape is deliberately small: one system persona, one user prompt
//! and a few sampling parameters. The reply is treated as opaque text.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`OpenAiChat`]: `POST {api_base}/chat/completions` over `reqwest`
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//!
//! # Retry Strategy
//!
//! - Retry count comes from `llm.max_retries` (default 2)
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::LlmConfig;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to LLM endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM reply had no message content")]
    EmptyReply,
}

/// One chat-completion call: a persona, a prompt and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Trait for async LLM interaction.
///
/// Implementors send a [`ChatRequest`] and return the reply text. Decorators
/// such as [`RetryAsk`] and test fakes implement it too.
pub trait AskAsync {
    async fn ask(&self, request: &ChatRequest) -> Result<String, ApiError>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiChat {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: chat_endpoint(&config.api_base),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn wire_request<'a>(&'a self, request: &'a ChatRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }
}

fn chat_endpoint(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

fn first_choice(response: WireResponse) -> Result<String, ApiError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(ApiError::EmptyReply)
}

impl AskAsync for OpenAiChat {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let t0 = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.wire_request(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "API call failed"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply = first_choice(response.json::<WireResponse>().await?)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply = %truncate_for_log(&reply, 200),
            "API call succeeded"
        );
        Ok(reply)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    /// Retries after the first attempt; `0` means a single try.
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, request: &ChatRequest) -> Result<String, ApiError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(request).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = backoff_delay(self.base_delay, self.max_delay, attempt)
                        + StdDuration::from_millis(rng().random_range(0..=250));

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Un-jittered delay before retry number `attempt` (1-based).
fn backoff_delay(base: StdDuration, max: StdDuration, attempt: usize) -> StdDuration {
    let shift = (attempt.saturating_sub(1)).min(16) as u32;
    base.saturating_mul(1u32 << shift).min(max)
}

/// Build the production client stack: [`OpenAiChat`] behind [`RetryAsk`].
pub fn client_with_backoff(
    config: &LlmConfig,
    api_key: &str,
) -> Result<RetryAsk<OpenAiChat>, ApiError> {
    let chat = OpenAiChat::new(config, api_key)?;
    Ok(RetryAsk::new(chat, config.max_retries, StdDuration::from_secs(1)))
}
