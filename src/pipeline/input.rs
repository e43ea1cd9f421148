//! Upload staging: check the uploaded filename and park the bytes on disk.
//!
//! ## Why a temp file?
//!
//! pdfium opens documents by path. Writing the upload to a
//! [`NamedTempFile`] gives it one while tying the file's lifetime to the
//! request: the file is removed when [`StagedPdf`] is dropped, on success,
//! on every error response, and on panic.

use crate::error::SptError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// An uploaded PDF written to a temporary file.
#[derive(Debug)]
pub struct StagedPdf {
    filename: String,
    file: NamedTempFile,
}

impl StagedPdf {
    /// Path pdfium can open. Valid while `self` is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The client-supplied filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Check the uploaded filename: present and ending in `.pdf`
/// (case-insensitive).
pub fn check_upload_name(filename: Option<&str>) -> Result<(), SptError> {
    let name = filename.unwrap_or("");
    if name.is_empty() {
        return Err(SptError::NoFileSelected);
    }
    if !name.to_lowercase().ends_with(".pdf") {
        return Err(SptError::NotAPdf {
            filename: name.to_string(),
        });
    }
    Ok(())
}

/// Validate the filename and write `bytes` to a fresh temp file.
pub fn stage_upload(filename: Option<&str>, bytes: &[u8]) -> Result<StagedPdf, SptError> {
    check_upload_name(filename)?;

    let mut file = tempfile::Builder::new()
        .prefix("spt-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| SptError::Internal(format!("tempfile: {e}")))?;
    file.write_all(bytes)
        .map_err(|e| SptError::Internal(format!("tempfile write: {e}")))?;
    file.flush()
        .map_err(|e| SptError::Internal(format!("tempfile flush: {e}")))?;

    debug!(
        "Staged upload {:?} ({} bytes) at {}",
        filename,
        bytes.len(),
        file.path().display()
    );

    Ok(StagedPdf {
        filename: filename.unwrap_or_default().to_string(),
        file,
    })
}
