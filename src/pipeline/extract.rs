//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not safe to call
//! from async contexts and parses synchronously. The work moves onto the
//! blocking pool so a large upload does not stall the Tokio workers serving
//! other requests.
//!
//! Extraction is best-effort by contract: a file pdfium cannot open or a
//! library that cannot be bound yields `None`, which the pipeline reports as
//! an empty PDF. Image-only scans come back as blank text for the same
//! reason; OCR is out of scope.

use crate::error::SptError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source of raw text for a PDF on disk.
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    /// Concatenated text of every page, or `None` if the file is unreadable.
    async fn extract_text(&self, pdf_path: &Path) -> Option<String>;
}

/// [`PdfTextExtractor`] backed by a pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    /// Directory holding libpdfium. `None` uses the system library.
    lib_dir: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }

    /// Bind the library once to prove it is loadable.
    pub fn check(&self) -> Result<(), SptError> {
        bind(self.lib_dir.as_deref())
            .map(|_| ())
            .map_err(|e| SptError::PdfiumBindingFailed(format!("{e:?}")))
    }
}

#[async_trait]
impl PdfTextExtractor for PdfiumExtractor {
    async fn extract_text(&self, pdf_path: &Path) -> Option<String> {
        let path = pdf_path.to_path_buf();
        let lib_dir = self.lib_dir.clone();

        match tokio::task::spawn_blocking(move || extract_text_blocking(&path, lib_dir.as_deref()))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction task panicked: {}", e);
                None
            }
        }
    }
}

fn bind(lib_dir: Option<&Path>) -> Result<Pdfium, PdfiumError> {
    let bindings = match lib_dir {
        Some(dir) => {
            let dir = dir.to_string_lossy().to_string();
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))?
        }
        None => Pdfium::bind_to_system_library()?,
    };
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(pdf_path: &Path, lib_dir: Option<&Path>) -> Option<String> {
    let pdfium = match bind(lib_dir) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to bind pdfium: {:?}", e);
            return None;
        }
    };

    let document = match pdfium.load_pdf_from_file(pdf_path, None) {
        Ok(d) => d,
        Err(e) => {
            warn!("Failed to open {}: {:?}", pdf_path.display(), e);
            return None;
        }
    };

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(page_text) => {
                let content = page_text.all();
                debug!("Page {}: {} chars", idx + 1, content.len());
                text.push_str(&content);
                text.push('\n');
            }
            Err(e) => {
                warn!("Text extraction failed on page {}: {:?}", idx + 1, e);
                return None;
            }
        }
    }

    Some(text)
}
