//! # spt-extract
//!
//! Extract structured fields from Surat Tugas (SPT, assignment letter) PDFs
//! using a Large Language Model.
//!
//! ## Why this crate?
//!
//! The letters are generated from one office template, but what comes out
//! of a PDF text layer is noisy: signature blocks, e-signature disclaimers
//! and page-break markers interleave with the content, and the personnel
//! list lives in an attachment table. Regexes alone cannot read the table
//! reliably; an LLM alone hallucinates and lists the signatory. This crate
//! puts deterministic rules on both sides of the model: clean and gate the
//! text before the call, sanitize and re-check the reply after it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Input     check filename, stage bytes in a temp file
//!  ├─ 2. Extract   page text via pdfium (spawn_blocking)
//!  ├─ 3. Clean     drop signature / footer / page-break lines
//!  ├─ 4. Gate      "SURAT TUGAS" + "NOMOR … BALMON.33", before any LLM cost
//!  ├─ 5. LLM       fixed prompt → JSON with five fields
//!  ├─ 6. Sanitize  personnel filter + degree strip, Indonesian dates → ISO
//!  ├─ 7. Gate      letter number must carry the office code
//!  └─ 8. Output    FinalRecord { user, report }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spt_extract::{ExtractionConfig, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini by default; the provider reads GEMINI_API_KEY.
//!     let config = ExtractionConfig::default();
//!     let pipeline = Pipeline::from_config(&config, None)?;
//!     let record = pipeline.process_pdf(std::path::Path::new("surat_tugas.pdf")).await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | HTTP API (`api` module) and the `spt-server` binary (axum + clap + tracing-subscriber) |
//!
//! Disable `server` when embedding only the pipeline:
//! ```toml
//! spt-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentRules, ExtractionConfig, ExtractionConfigBuilder};
pub use error::{SptError, UpstreamError};
pub use output::{assemble, FinalRecord, LlmExtraction, Report, SanitizedExtraction};
pub use pipeline::clean::TextCleaner;
pub use pipeline::dates::{normalize_date_range, DateRange};
pub use pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
pub use pipeline::llm::{ExtractionClient, ProviderGenerator, TextGenerator};
pub use pipeline::personnel::{remove_degrees, PersonnelSanitizer};
pub use pipeline::validate::{PreValidator, ValidationVerdict};
pub use process::Pipeline;
