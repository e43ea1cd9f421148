//! Configuration types for SPT extraction.
//!
//! Two structs carry every knob:
//!
//! * [`ExtractionConfig`] — how to reach the LLM (provider, model, sampling,
//!   timeout, retries), built via its [`ExtractionConfigBuilder`].
//! * [`DocumentRules`] — what an assignment letter looks like (title, office
//!   code, noise lines, signatory denylist). Plain serde data so a deployment
//!   for another office can ship a JSON file instead of a new build.
//!
//! Both are constructed explicitly and handed to
//! [`crate::process::Pipeline`]; nothing is read from process-wide state
//! after startup.

use crate::error::SptError;
use edgequake_llm::LLMProvider;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the LLM extraction stage.
///
/// # Example
/// ```rust
/// use spt_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("gemini-2.0-flash")
///     .api_timeout_secs(30)
///     .max_retries(1)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_retries, 1);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// LLM provider name (e.g. "gemini", "openai"). If None, uses [`DEFAULT_PROVIDER`].
    pub provider_name: Option<String>,

    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Extraction is transcription, not composition; a low temperature keeps
    /// the model faithful to the letter text.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 8192.
    ///
    /// Thinking models (gemini-2.5-*) count reasoning tokens against this
    /// cap, so it must leave room beyond the five-field JSON reply.
    pub max_tokens: usize,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Retry attempts on a failed or timed-out LLM call. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Custom system instruction. If None, uses
    /// [`crate::prompts::SYSTEM_INSTRUCTION`].
    pub system_instruction: Option<String>,

    /// Document-shape rules shared by every stage.
    pub rules: DocumentRules,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 8192,
            api_timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 500,
            system_instruction: None,
            rules: DocumentRules::default(),
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("rules", &self.rules)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Provider name after applying the default.
    pub fn provider_name_or_default(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Model after applying the default.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = Some(instruction.into());
        self
    }

    pub fn rules(mut self, rules: DocumentRules) -> Self {
        self.config.rules = rules;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, SptError> {
        let c = &self.config;
        if c.api_timeout_secs == 0 {
            return Err(SptError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(SptError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        c.rules.validate()?;
        Ok(self.config)
    }
}

// ── Document rules ───────────────────────────────────────────────────────

/// The shape of the one letter format this pipeline accepts.
///
/// Defaults describe the Semarang monitoring office (`BALMON.33`) template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRules {
    /// Phrase that must appear (uppercased) for a text to be an SPT.
    pub required_title: String,

    /// Office code that must follow `NOMOR` and appear in the letter number.
    pub office_code: String,

    /// Line-level regexes (matched case-insensitively against trimmed lines)
    /// for boilerplate that must not reach the LLM.
    pub noise_patterns: Vec<String>,

    /// Lowercase substrings that disqualify a personnel entry.
    pub personnel_denylist: Vec<String>,

    /// A personnel entry must be strictly longer than this many characters.
    pub min_personnel_len: usize,
}

impl Default for DocumentRules {
    fn default() -> Self {
        Self {
            required_title: "SURAT TUGAS".to_string(),
            office_code: "BALMON.33".to_string(),
            noise_patterns: [
                r"^Semarang,?\s*\d{1,2}\s+\w+\s+\d{4}",
                r"^Kepala Balai Monitor",
                r"^Kepala Balmon",
                r"^Supriadi, S\.H\., M\.H\.",
                r"^Casual",
                r"^Casuala",
                r"^\*.*\d{4}.*\*",
                r"^Dokumen.*elektronik",
                r"^===== Page \d+ =====",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            personnel_denylist: [
                "supriadi, s.h., m.h.",
                "kepala balai",
                "kepala balmon",
                "supriadi",
                "kepala",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_personnel_len: 5,
        }
    }
}

impl DocumentRules {
    /// Load rules from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SptError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SptError::InvalidConfig(format!("cannot read rules file {}: {e}", path.display()))
        })?;
        let rules: Self = serde_json::from_str(&raw).map_err(|e| {
            SptError::InvalidConfig(format!("invalid rules file {}: {e}", path.display()))
        })?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that the rules are usable: non-empty markers, compilable patterns.
    pub fn validate(&self) -> Result<(), SptError> {
        if self.required_title.trim().is_empty() {
            return Err(SptError::InvalidConfig(
                "required_title must not be empty".into(),
            ));
        }
        if self.office_code.trim().is_empty() {
            return Err(SptError::InvalidConfig(
                "office_code must not be empty".into(),
            ));
        }
        for pattern in &self.noise_patterns {
            Regex::new(pattern).map_err(|e| {
                SptError::InvalidConfig(format!("bad noise pattern {pattern:?}: {e}"))
            })?;
        }
        Ok(())
    }
}
