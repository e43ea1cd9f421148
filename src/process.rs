//! Pipeline orchestration: one document in, one [`FinalRecord`] or one
//! [`SptError`] out.
//!
//! The order of the stages is the failure policy. Cheap local checks run
//! first and short-circuit, so the only paid step (the LLM call) is reached
//! only by text that already looks like an assignment letter:
//!
//! ```text
//! raw text ─▶ empty? ─▶ clean ─▶ empty? ─▶ pre-validate ─▶ LLM ─▶ sanitize ─▶ letter no.? ─▶ assemble
//!             400        │        400         400          500                  400          500
//! ```
//!
//! Upstream failures are logged here with full detail and surface to the
//! caller only as [`SptError::AnalysisFailed`].

use crate::config::ExtractionConfig;
use crate::error::SptError;
use crate::output::{assemble, FinalRecord, LlmExtraction, SanitizedExtraction};
use crate::pipeline::clean::TextCleaner;
use crate::pipeline::dates::{normalize_date_range, DateRange};
use crate::pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
use crate::pipeline::input;
use crate::pipeline::llm::{ExtractionClient, ProviderGenerator, TextGenerator};
use crate::pipeline::personnel::PersonnelSanitizer;
use crate::pipeline::validate::PreValidator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Every stage, built once from the configuration and shared read-only
/// across requests.
#[derive(Clone)]
pub struct Pipeline {
    cleaner: TextCleaner,
    validator: PreValidator,
    client: ExtractionClient,
    personnel: PersonnelSanitizer,
    extractor: Arc<dyn PdfTextExtractor>,
}

impl Pipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        config: &ExtractionConfig,
        generator: Arc<dyn TextGenerator>,
        extractor: Arc<dyn PdfTextExtractor>,
    ) -> Result<Self, SptError> {
        let rules = &config.rules;
        Ok(Self {
            cleaner: TextCleaner::from_rules(rules)?,
            validator: PreValidator::from_rules(rules)?,
            client: ExtractionClient::with_config(generator, config),
            personnel: PersonnelSanitizer::from_rules(rules),
            extractor,
        })
    }

    /// Production pipeline: provider from `config`, pdfium from `pdfium_lib_dir`
    /// (or the system library).
    pub fn from_config(
        config: &ExtractionConfig,
        pdfium_lib_dir: Option<PathBuf>,
    ) -> Result<Self, SptError> {
        let generator = ProviderGenerator::from_config(config)?;
        Self::new(
            config,
            Arc::new(generator),
            Arc::new(PdfiumExtractor::new(pdfium_lib_dir)),
        )
    }

    /// Validate, stage and process an uploaded file.
    pub async fn process_upload(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<FinalRecord, SptError> {
        let staged = input::stage_upload(filename, bytes)?;
        info!("Processing PDF: {}", staged.filename());
        // `staged` lives until the pipeline returns; the temp file goes with it.
        self.process_pdf(staged.path()).await
    }

    /// Extract text from a PDF on disk and process it.
    pub async fn process_pdf(&self, pdf_path: &Path) -> Result<FinalRecord, SptError> {
        let raw = self.extractor.extract_text(pdf_path).await;
        self.process_text(raw.as_deref()).await
    }

    /// Run the text stages on already-extracted text.
    pub async fn process_text(&self, raw: Option<&str>) -> Result<FinalRecord, SptError> {
        let start = Instant::now();

        // ── Step 1: Extracted text present ───────────────────────────────
        let raw = match raw {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!("PDF is empty");
                return Err(SptError::EmptyPdf);
            }
        };
        info!("Extracted text length: {} characters", raw.chars().count());

        // ── Step 2: Strip noise lines ────────────────────────────────────
        let cleaned = self.cleaner.clean(raw);
        if cleaned.trim().is_empty() {
            warn!("Text empty after cleaning");
            return Err(SptError::EmptyAfterCleaning);
        }
        info!("Cleaned text length: {} characters", cleaned.chars().count());

        // ── Step 3: Pre-validation gate ──────────────────────────────────
        let verdict = self.validator.validate(&cleaned);
        if !verdict.passed {
            warn!("Validation failed: {}", verdict.reason);
            return Err(SptError::InvalidDocument {
                reason: verdict.reason,
            });
        }
        info!("Pre-validation passed");

        // ── Step 4: LLM extraction ───────────────────────────────────────
        let extraction = self.client.extract(&cleaned).await.map_err(|e| {
            error!("LLM extraction failed: {}", e);
            SptError::from(e)
        })?;

        // ── Step 5: Sanitize personnel and dates ─────────────────────────
        let sanitized = self.sanitize(extraction);

        // ── Step 6: Post-validation gate ─────────────────────────────────
        let letter_number = sanitized.nomor_surat.as_deref().unwrap_or("");
        if !self.validator.letter_number_matches(letter_number) {
            warn!("Letter number {:?} lacks office code", letter_number);
            return Err(SptError::InvalidFormat {
                letter_number: letter_number.to_string(),
            });
        }

        // ── Step 7: Assemble ─────────────────────────────────────────────
        let record = assemble(Some(sanitized)).ok_or(SptError::Processing)?;

        info!(
            "Successfully processed in {}ms. User count: {}",
            start.elapsed().as_millis(),
            record.user.len()
        );
        info!("User names (without degrees): {:?}", record.user);
        Ok(record)
    }

    /// Apply the personnel and date cleanup to a raw extraction.
    pub fn sanitize(&self, extraction: LlmExtraction) -> SanitizedExtraction {
        let personil = self.personnel.sanitize(&extraction.personil);
        let dates = match extraction.tanggal_pelaksanaan.as_deref() {
            Some(text) if !text.is_empty() => normalize_date_range(text),
            _ => DateRange::empty(),
        };
        SanitizedExtraction {
            nomor_surat: extraction.nomor_surat,
            tempat_pelaksanaan: extraction.tempat_pelaksanaan,
            tujuan_kegiatan: extraction.tujuan_kegiatan,
            personil: Some(personil),
            dates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use async_trait::async_trait;
    use serde_json::json;

    struct Reply(String);

    #[async_trait]
    impl TextGenerator for Reply {
        async fn generate(&self, _: &str, _: &str) -> Result<String, UpstreamError> {
            Ok(self.0.clone())
        }
    }

    struct NoPdf;

    #[async_trait]
    impl PdfTextExtractor for NoPdf {
        async fn extract_text(&self, _: &Path) -> Option<String> {
            None
        }
    }

    fn pipeline(reply: &str) -> Pipeline {
        Pipeline::new(
            &ExtractionConfig::default(),
            Arc::new(Reply(reply.to_string())),
            Arc::new(NoPdf),
        )
        .unwrap()
    }

    #[test]
    fn sanitize_keeps_text_fields_and_fixes_the_rest() {
        let p = pipeline("{}");
        let raw = LlmExtraction::from_value(json!({
            "nomor_surat": "366/BALMON.33/KP.01.06/07/2025",
            "tanggal_pelaksanaan": "28 Juli 2025 s.d 01 Agustus 2025",
            "tujuan_kegiatan": " ",
            "personil": ["Supriadi, S.H., M.H.", "Purwanto, S.E."]
        }))
        .unwrap();

        let s = p.sanitize(raw);
        assert_eq!(s.personil, Some(vec!["Purwanto".to_string()]));
        assert_eq!(s.dates.start_date, "2025-07-28");
        assert_eq!(s.dates.end_date, "2025-08-01");
        assert_eq!(s.tujuan_kegiatan.as_deref(), Some(" "));
        assert_eq!(s.tempat_pelaksanaan, None);
    }

    #[test]
    fn sanitize_without_dates() {
        let p = pipeline("{}");
        let s = p.sanitize(LlmExtraction::default());
        assert!(s.dates.is_empty());
        assert_eq!(s.personil, Some(Vec::new()));
    }

    #[tokio::test]
    async fn unreadable_pdf_is_empty_pdf() {
        let p = pipeline("{}");
        let err = p.process_pdf(Path::new("/tmp/none.pdf")).await.unwrap_err();
        assert!(matches!(err, SptError::EmptyPdf));
    }

    #[tokio::test]
    async fn upload_name_checked_before_extraction() {
        let p = pipeline("{}");
        let err = p.process_upload(Some("spt.png"), b"x").await.unwrap_err();
        assert!(matches!(err, SptError::NotAPdf { .. }));
    }
}
