//! Record types: the untrusted LLM reply, its sanitized form, and the final
//! record returned to callers.
//!
//! ```text
//! serde_json::Value ──▶ LlmExtraction ──▶ SanitizedExtraction ──▶ FinalRecord
//!   (model reply)        (lenient view)     (names + dates fixed)   (wire shape)
//! ```

use crate::error::UpstreamError;
use crate::pipeline::dates::DateRange;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The model's reply, read leniently.
///
/// Every field is optional. A textual field that is present but not a JSON
/// string is treated as absent; a `personil` that is not an array is treated
/// as an empty list. Entries of `personil` are kept as raw JSON values for
/// the sanitizer to judge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmExtraction {
    pub nomor_surat: Option<String>,
    pub tanggal_pelaksanaan: Option<String>,
    pub tempat_pelaksanaan: Option<String>,
    pub tujuan_kegiatan: Option<String>,
    pub personil: Vec<Value>,
}

impl LlmExtraction {
    /// Read the five known keys out of a parsed reply.
    pub fn from_value(value: Value) -> Result<Self, UpstreamError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(UpstreamError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let mut text = |key: &str| match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let nomor_surat = text("nomor_surat");
        let tanggal_pelaksanaan = text("tanggal_pelaksanaan");
        let tempat_pelaksanaan = text("tempat_pelaksanaan");
        let tujuan_kegiatan = text("tujuan_kegiatan");
        let personil = match map.remove("personil") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Self {
            nomor_surat,
            tanggal_pelaksanaan,
            tempat_pelaksanaan,
            tujuan_kegiatan,
            personil,
        }
    }

    /// The letter number, or `""` when the model gave none.
    pub fn letter_number(&self) -> &str {
        self.nomor_surat.as_deref().unwrap_or("")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An extraction after personnel filtering and date normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedExtraction {
    pub nomor_surat: Option<String>,
    pub tempat_pelaksanaan: Option<String>,
    pub tujuan_kegiatan: Option<String>,
    pub personil: Option<Vec<String>>,
    pub dates: DateRange,
}

/// The record returned across the system boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    /// Personnel names, degrees stripped.
    pub user: Vec<String>,
    pub report: Report,
}

/// Letter details inside a [`FinalRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub spt_number: String,
    pub destination: String,
    pub place_of_execution: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<SanitizedExtraction> for FinalRecord {
    fn from(e: SanitizedExtraction) -> Self {
        FinalRecord {
            user: e.personil.unwrap_or_default(),
            report: Report {
                spt_number: e.nomor_surat.unwrap_or_default(),
                destination: e.tujuan_kegiatan.unwrap_or_default(),
                place_of_execution: e.tempat_pelaksanaan.unwrap_or_default(),
                start_date: e.dates.start_date,
                end_date: e.dates.end_date,
            },
        }
    }
}

/// Map a sanitized extraction onto the final record.
///
/// `None` in means the upstream stage produced nothing; it is passed through
/// rather than replaced by an all-empty record.
pub fn assemble(extraction: Option<SanitizedExtraction>) -> Option<FinalRecord> {
    extraction.map(FinalRecord::from)
}
