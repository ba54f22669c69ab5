//! Core `ActionOracle` trait and `ApiOracle` implementation.
//!
//! `ApiOracle` talks to an OpenAI-compatible `/v1/chat/completions`
//! endpoint (Ollama in OpenAI mode works too) and rotates through the
//! configured key pool. Connection details come from [`LlmConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::action::Action;
use crate::config::{LlmConfig, LlmProvider};
use crate::llm::context::render_context;
use crate::llm::parsing::parse_action_response;
use crate::llm::prompt::PromptBuilder;
use crate::llm::rotation::KeyPool;
use crate::pipeline::InterpretContext;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur on the remote path.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The reply could not be turned into an action.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The provider needs a key and the pool is empty.
    #[error("no API keys configured")]
    NoKeys,

    /// Every key in the pool failed; carries the last failure.
    #[error("all {attempts} API keys failed; last error: {last}")]
    Exhausted {
        attempts: usize,
        #[source]
        last: Box<LlmError>,
    },
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ActionOracle trait
// ---------------------------------------------------------------------------

/// Async trait for remote utterance interpretation.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn ActionOracle>`).
///
/// # Arguments
/// * `utterance` – What the user said, typed, or what the slip shows.
/// * `ctx`       – The caller's snapshot; never mutated.
#[async_trait]
pub trait ActionOracle: Send + Sync {
    async fn interpret(&self, utterance: &str, ctx: &InterpretContext) -> Result<Action, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiOracle
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// Keys are taken from the shared [`KeyPool`]: the request starts at the
/// pool's active index and moves to the next key on any failure (transport
/// error, timeout, bad status, empty reply) until every key was tried.
/// A reply that arrives but cannot be parsed is returned as
/// [`LlmError::Parse`] without trying further keys.
pub struct ApiOracle {
    client: reqwest::Client,
    config: LlmConfig,
    pool: Arc<KeyPool>,
}

impl ApiOracle {
    /// Build an `ApiOracle` from application config and a key pool.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails.
    pub fn from_config(config: &LlmConfig, pool: Arc<KeyPool>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            pool,
        }
    }

    /// One chat-completions call. The `Authorization: Bearer …` header is
    /// attached only for a non-empty key.
    async fn complete(&self, key: Option<&str>, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                code: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl ActionOracle for ApiOracle {
    async fn interpret(&self, utterance: &str, ctx: &InterpretContext) -> Result<Action, LlmError> {
        let (system, user) = PromptBuilder::new(ctx.language).build_chat(utterance, &render_context(ctx));

        if self.pool.is_empty() {
            if self.config.provider != LlmProvider::Ollama {
                return Err(LlmError::NoKeys);
            }
            let content = self.complete(None, &system, &user).await?;
            return parse_action_response(&content, ctx);
        }

        let attempts = self.pool.len();
        let start = self.pool.checkout(ctx.today());
        let mut last = LlmError::NoKeys;

        for attempt in 0..attempts {
            let index = (start + attempt) % attempts;
            log::debug!("llm: attempt {} with key #{index}", attempt + 1);

            match self.complete(self.pool.key(index), &system, &user).await {
                Ok(content) => {
                    self.pool.record_success(index);
                    return parse_action_response(&content, ctx);
                }
                Err(e) => {
                    log::warn!("llm: key #{index} failed: {e}");
                    last = e;
                }
            }
        }

        self.pool.record_exhausted();
        Err(LlmError::Exhausted {
            attempts,
            last: Box::new(last),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
