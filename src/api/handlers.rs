//! Request handlers.

use super::AppState;
use crate::error::SptError;
use crate::output::FinalRecord;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

/// Multipart field carrying the document.
pub const PDF_FIELD: &str = "pdf";

/// GET / — liveness check.
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "SPT Processing API is running" }))
}

/// POST /process-pdf — run one uploaded document through the pipeline.
pub async fn process_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FinalRecord>, SptError> {
    let (filename, bytes) = read_pdf_field(multipart).await?;
    let record = state
        .pipeline
        .process_upload(filename.as_deref(), &bytes)
        .await?;
    Ok(Json(record))
}

/// Find the first file part named [`PDF_FIELD`].
///
/// A part with that name but no `filename` is an ordinary form value, not a
/// file, and is skipped.
async fn read_pdf_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(Option<String>, Bytes), SptError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected upload: {}", e);
        SptError::NoPdfUploaded
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SptError::Internal(format!("multipart read failed: {e}")))?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| SptError::Internal(format!("multipart read failed: {e}")))?;
        return Ok((Some(filename), bytes));
    }
    Err(SptError::NoPdfUploaded)
}
