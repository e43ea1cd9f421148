//! LLM interaction: send the cleaned letter, get the five fields back.
//!
//! The model is reached through the [`TextGenerator`] port so the
//! extraction contract (prompt, instruction, reply unwrapping) can be tested
//! against a deterministic fake. [`ProviderGenerator`] is the production
//! implementation over any `edgequake_llm` provider; it owns the timeout
//! and retry policy. All prompt wording lives in [`crate::prompts`].
//!
//! ## Retry Strategy
//!
//! Retries are off by default: an extraction is one user waiting on one
//! upload. When enabled, the wait doubles per attempt
//! (`retry_backoff_ms * 2^attempt`), and every attempt is bounded by
//! `api_timeout_secs` so a hung provider cannot hold the request forever.

use crate::config::ExtractionConfig;
use crate::error::{SptError, UpstreamError};
use crate::output::LlmExtraction;
use crate::prompts::{extraction_prompt, SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Response type requested from the provider.
const JSON_RESPONSE_FORMAT: &str = "json_object";

/// Text-in, text-out access to a language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to `prompt` under `system_instruction`.
    async fn generate(&self, prompt: &str, system_instruction: &str)
        -> Result<String, UpstreamError>;
}

/// [`TextGenerator`] over an `edgequake_llm` provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ExtractionConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Resolve the provider named by `config` and wrap it.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, SptError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(
        &self,
        prompt: &str,
        system_instruction: &str,
    ) -> Result<String, UpstreamError> {
        let messages = vec![
            ChatMessage::system(system_instruction),
            ChatMessage::user(prompt),
        ];
        let start = Instant::now();
        let mut last_err: Option<UpstreamError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "LLM retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(self.timeout, self.provider.chat(&messages, Some(&self.options))).await {
                Ok(Ok(response)) => {
                    debug!(
                        "LLM reply: {} input tokens, {} output tokens, {:?}",
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    return Ok(response.content);
                }
                Ok(Err(e)) => {
                    warn!("LLM attempt {} failed — {}", attempt + 1, e);
                    last_err = Some(UpstreamError::Provider {
                        retries: attempt,
                        detail: e.to_string(),
                    });
                }
                Err(_) => {
                    warn!(
                        "LLM attempt {} timed out after {}s",
                        attempt + 1,
                        self.timeout.as_secs()
                    );
                    last_err = Some(UpstreamError::Timeout {
                        secs: self.timeout.as_secs(),
                    });
                }
            }
        }

        Err(last_err.unwrap_or(UpstreamError::Provider {
            retries: self.max_retries,
            detail: "Unknown error".to_string(),
        }))
    }
}

/// Build `CompletionOptions` from the extraction config.
///
/// The reply is always requested as a JSON object; providers that support a
/// JSON response type (Gemini `responseMimeType`, OpenAI `response_format`)
/// enforce it server-side.
fn build_options(config: &ExtractionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        response_format: Some(JSON_RESPONSE_FORMAT.to_string()),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider + model** — `config.provider_name` / `config.model`,
///    falling back to Gemini with `gemini-2.5-flash`. The factory reads the
///    provider's API key (`GEMINI_API_KEY`, `OPENAI_API_KEY`, …) from the
///    environment.
pub fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn LLMProvider>, SptError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let name = config.provider_name_or_default();
    let model = config.model_or_default();
    info!("Using LLM provider {} with model {}", name, model);
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        SptError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

// ── Extraction contract ──────────────────────────────────────────────────

/// Fixed-prompt extraction over a [`TextGenerator`].
///
/// Pure with respect to the document: it returns the model's reply as an
/// [`LlmExtraction`] and leaves personnel and date cleanup to the caller.
#[derive(Clone)]
pub struct ExtractionClient {
    generator: Arc<dyn TextGenerator>,
    system_instruction: String,
}

impl ExtractionClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Use `config.system_instruction` when set.
    pub fn with_config(generator: Arc<dyn TextGenerator>, config: &ExtractionConfig) -> Self {
        Self {
            generator,
            system_instruction: config
                .system_instruction
                .clone()
                .unwrap_or_else(|| SYSTEM_INSTRUCTION.to_string()),
        }
    }

    /// Ask the model for the letter's fields.
    pub async fn extract(&self, cleaned_text: &str) -> Result<LlmExtraction, UpstreamError> {
        if cleaned_text.trim().is_empty() {
            return Err(UpstreamError::EmptyInput);
        }

        let prompt = extraction_prompt(cleaned_text);
        debug!("Extraction prompt: {} chars", prompt.len());

        let reply = self
            .generator
            .generate(&prompt, &self.system_instruction)
            .await?;
        debug!("Extraction reply: {} chars", reply.len());

        parse_reply(&reply)
    }
}

/// Unwrap and parse a model reply into an [`LlmExtraction`].
pub fn parse_reply(reply: &str) -> Result<LlmExtraction, UpstreamError> {
    let json = strip_json_fence(reply);
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| UpstreamError::InvalidJson {
            detail: e.to_string(),
        })?;
    LlmExtraction::from_value(value)
}

/// Trim the reply and drop a surrounding markdown code fence
/// (```` ```json ```` or bare ```` ``` ````) if present.
pub fn strip_json_fence(reply: &str) -> &str {
    let s = reply.trim();
    let s = s
        .strip_prefix("```json")
        .or(s.strip_prefix("```"))
        .map_or(s, str::trim_start);
    s.strip_suffix("```").map_or(s, str::trim_end)
}
