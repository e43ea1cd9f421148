//! `SptError` → HTTP response.
//!
//! Bodies are fixed strings. Upstream and internal detail is logged here and
//! never echoed to the caller; only the pre-validation reason is returned,
//! because it tells the uploader what is wrong with their document.

use crate::error::SptError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::any::Any;
use tracing::error;

/// Status and JSON body for an error.
pub fn error_body(err: &SptError) -> (StatusCode, Value) {
    match err {
        SptError::NoPdfUploaded => bad_request("No PDF file uploaded"),
        SptError::NoFileSelected => bad_request("No file selected"),
        SptError::NotAPdf { .. } => bad_request("File must be a PDF"),
        SptError::EmptyPdf => bad_request("Empty PDF"),
        SptError::EmptyAfterCleaning => bad_request("Empty text after cleaning"),
        SptError::InvalidDocument { reason } => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Invalid SPT Document", "details": reason }),
        ),
        SptError::AnalysisFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Analysis Failed",
                "details": "LLM extraction returned empty data"
            }),
        ),
        SptError::InvalidFormat { .. } => bad_request("Invalid SPT Format"),
        SptError::Processing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Processing Error" }),
        ),
        SptError::InvalidConfig(_)
        | SptError::ProviderNotConfigured { .. }
        | SptError::PdfiumBindingFailed(_)
        | SptError::Internal(_) => internal(),
    }
}

fn bad_request(message: &str) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!({ "error": message }))
}

fn internal() -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error" }),
    )
}

impl IntoResponse for SptError {
    fn into_response(self) -> Response {
        let (status, body) = error_body(&self);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(body)).into_response()
    }
}

/// Response for a panicking handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {}", detail);
    let (status, body) = internal();
    (status, Json(body)).into_response()
}
