//! Document gates: cheap local checks on either side of the LLM call.
//!
//! [`PreValidator::validate`] runs before extraction and rejects text that
//! is plainly not an assignment letter, so a wrong upload never costs an LLM
//! call. [`PreValidator::letter_number_matches`] runs after extraction and
//! rejects a letter number that lacks the office code, which catches both
//! hallucinated numbers and letters from another office that slipped past
//! the first gate.

use crate::config::DocumentRules;
use crate::error::SptError;
use regex::Regex;
use serde::Serialize;

pub const REASON_EMPTY: &str = "Teks kosong.";
pub const REASON_NOT_SPT: &str = "Dokumen bukan Surat Tugas";
pub const REASON_BAD_NUMBER: &str = "Nomor surat tidak sesuai format";
pub const REASON_OK: &str = "Validasi awal berhasil";

/// Outcome of the pre-extraction gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub passed: bool,
    pub reason: String,
}

impl ValidationVerdict {
    fn pass() -> Self {
        Self {
            passed: true,
            reason: REASON_OK.to_string(),
        }
    }

    fn fail(reason: &str) -> Self {
        Self {
            passed: false,
            reason: reason.to_string(),
        }
    }
}

/// Gates compiled from [`DocumentRules`].
#[derive(Debug, Clone)]
pub struct PreValidator {
    required_title: String,
    office_code: String,
    number_pattern: Regex,
}

impl PreValidator {
    pub fn from_rules(rules: &DocumentRules) -> Result<Self, SptError> {
        let office_code = rules.office_code.trim().to_uppercase();
        // `NOMOR` followed anywhere later, across lines, by the office code.
        let number_pattern = Regex::new(&format!("(?s)NOMOR.*{}", regex::escape(&office_code)))
            .map_err(|e| SptError::InvalidConfig(format!("bad office code: {e}")))?;
        Ok(Self {
            required_title: rules.required_title.trim().to_uppercase(),
            office_code,
            number_pattern,
        })
    }

    /// Decide whether `text` looks like an assignment letter.
    pub fn validate(&self, text: &str) -> ValidationVerdict {
        if text.is_empty() {
            return ValidationVerdict::fail(REASON_EMPTY);
        }

        let upper = text.to_uppercase();
        if !upper.contains(&self.required_title) {
            return ValidationVerdict::fail(REASON_NOT_SPT);
        }
        if !self.number_pattern.is_match(&upper) {
            return ValidationVerdict::fail(REASON_BAD_NUMBER);
        }
        ValidationVerdict::pass()
    }

    /// Whether an extracted letter number carries the office code.
    pub fn letter_number_matches(&self, letter_number: &str) -> bool {
        letter_number.to_uppercase().contains(&self.office_code)
    }
}

impl Default for PreValidator {
    fn default() -> Self {
        Self::from_rules(&DocumentRules::default()).expect("default rules compile")
    }
}
