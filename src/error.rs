//! Error types for the spt-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SptError`] — **Boundary**: the document cannot be turned into a
//!   [`crate::output::FinalRecord`] (bad upload, not an SPT, extraction
//!   failed, letter number rejected). Returned as `Err(SptError)` from
//!   [`crate::process::Pipeline`] and mapped one-to-one onto HTTP responses
//!   by the `api` module.
//!
//! * [`UpstreamError`] — **Extraction**: the LLM call or the parsing of its
//!   reply failed. It never escapes the extraction stage on its own; the
//!   orchestrator logs it and wraps it in [`SptError::AnalysisFailed`] so the
//!   caller only sees a generic "Analysis Failed" while the detail stays in
//!   the server log.

use thiserror::Error;

/// All boundary-level errors returned by the spt-extract library.
#[derive(Debug, Error)]
pub enum SptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The multipart request carried no `pdf` field.
    #[error("No PDF file uploaded")]
    NoPdfUploaded,

    /// The `pdf` field was present but its filename is empty.
    #[error("No file selected")]
    NoFileSelected,

    /// The uploaded filename does not end in `.pdf`.
    #[error("File must be a PDF (got '{filename}')")]
    NotAPdf { filename: String },

    /// Text extraction produced nothing usable (blank or unreadable PDF).
    #[error("Empty PDF")]
    EmptyPdf,

    /// Every line of the extracted text was noise.
    #[error("Empty text after cleaning")]
    EmptyAfterCleaning,

    // ── Validation errors ─────────────────────────────────────────────────
    /// The cleaned text does not look like an assignment letter.
    #[error("Invalid SPT Document: {reason}")]
    InvalidDocument { reason: String },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The LLM call or the parsing of its reply failed.
    #[error("Analysis failed: {source}")]
    AnalysisFailed {
        #[source]
        source: UpstreamError,
    },

    // ── Post-validation errors ────────────────────────────────────────────
    /// The LLM returned a letter number without the expected office code.
    #[error("Invalid SPT Format: letter number '{letter_number}' lacks office code")]
    InvalidFormat { letter_number: String },

    /// The sanitized extraction could not be assembled into a record.
    #[error("Processing error: no record assembled")]
    Processing,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure of the LLM extraction stage.
///
/// Carried inside [`SptError::AnalysisFailed`]; its text is logged, never
/// returned to HTTP callers.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// There was no text to send.
    #[error("nothing to extract: input text is empty")]
    EmptyInput,

    /// The provider returned an error (after any configured retries).
    #[error("LLM call failed after {retries} retries: {detail}")]
    Provider { retries: u32, detail: String },

    /// The provider did not answer within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The reply was not valid JSON.
    #[error("LLM reply is not valid JSON: {detail}")]
    InvalidJson { detail: String },

    /// The reply was valid JSON but not an object.
    #[error("LLM reply is JSON but not an object (got {kind})")]
    NotAnObject { kind: &'static str },
}

impl From<UpstreamError> for SptError {
    fn from(source: UpstreamError) -> Self {
        SptError::AnalysisFailed { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_document_display_carries_reason() {
        let e = SptError::InvalidDocument {
            reason: "Dokumen bukan Surat Tugas".into(),
        };
        assert!(e.to_string().contains("Dokumen bukan Surat Tugas"));
    }

    #[test]
    fn upstream_converts_into_analysis_failed() {
        let e: SptError = UpstreamError::Timeout { secs: 60 }.into();
        assert!(matches!(e, SptError::AnalysisFailed { .. }));
        assert!(e.to_string().contains("60s"), "got: {e}");
    }

    #[test]
    fn provider_error_display() {
        let e = UpstreamError::Provider {
            retries: 2,
            detail: "503 overloaded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("2 retries"), "got: {msg}");
        assert!(msg.contains("503 overloaded"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = SptError::NotAPdf {
            filename: "scan.docx".into(),
        };
        assert!(e.to_string().contains("scan.docx"));
    }
}
