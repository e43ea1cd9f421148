//! Text cleaning: drop boilerplate lines before the text reaches the LLM.
//!
//! Letters come out of pdfium with the signature block, the e-signature
//! disclaimer and page-break markers interleaved with the content. They
//! cost tokens and, worse, tempt the model into listing the signatory as
//! personnel. Each noise class is one line-level regex; a line matching any
//! of them is dropped whole.
//!
//! The pass is total and idempotent: surviving lines are trimmed,
//! non-empty, and never reordered, so cleaning twice changes nothing.

use crate::config::DocumentRules;
use crate::error::SptError;
use once_cell::sync::Lazy;
use regex::{RegexSet, RegexSetBuilder};

/// Line filter compiled from [`DocumentRules::noise_patterns`].
#[derive(Debug, Clone)]
pub struct TextCleaner {
    noise: RegexSet,
}

static DEFAULT_CLEANER: Lazy<TextCleaner> = Lazy::new(|| {
    TextCleaner::from_rules(&DocumentRules::default()).expect("default noise patterns compile")
});

impl TextCleaner {
    /// Compile the rules' noise patterns (case-insensitive).
    pub fn from_rules(rules: &DocumentRules) -> Result<Self, SptError> {
        let noise = RegexSetBuilder::new(&rules.noise_patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| SptError::InvalidConfig(format!("bad noise pattern: {e}")))?;
        Ok(Self { noise })
    }

    /// Remove blank and noise lines, keeping the rest in order.
    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.noise.is_match(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        DEFAULT_CLEANER.clone()
    }
}

/// Clean `text` with the default rules.
pub fn clean_extracted_text(text: &str) -> String {
    DEFAULT_CLEANER.clean(text)
}
