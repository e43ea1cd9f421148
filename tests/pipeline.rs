//! Orchestrator tests: real cleaning, gating and sanitizing around a
//! scripted language model and a fixed PDF text source.

use async_trait::async_trait;
use spt_extract::{
    DocumentRules, ExtractionConfig, PdfTextExtractor, Pipeline, SptError, TextGenerator,
    UpstreamError,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Replies with a fixed result and records every prompt.
struct ScriptedModel {
    reply: Result<String, UpstreamError>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn replying(reply: &str) -> Arc<Self> {
        Self::with(Ok(reply.to_string()))
    }

    fn failing(err: UpstreamError) -> Arc<Self> {
        Self::with(Err(err))
    }

    fn with(reply: Result<String, UpstreamError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Returns the same text for any path.
struct FixedText(Option<String>);

#[async_trait]
impl PdfTextExtractor for FixedText {
    async fn extract_text(&self, _pdf_path: &Path) -> Option<String> {
        self.0.clone()
    }
}

const LETTER: &str = "\
KEMENTERIAN KOMUNIKASI DAN DIGITAL
SURAT TUGAS
NOMOR: 366/BALMON.33/KP.01.06/07/2025

Dalam rangka Inspeksi Monitoring Frekuensi Radio
Tempat: Kota Semarang
Tanggal: 28 Juli 2025 s.d 01 Agustus 2025

Semarang, 25 Juli 2025
Kepala Balai Monitor Spektrum Frekuensi Radio Kelas I Semarang
Supriadi, S.H., M.H.
Dokumen ini telah ditandatangani secara elektronik
===== Page 2 =====
Lampiran
1. Agung Suryo Wibowo, S.T.
2. Kuswahyudi, S.Kom., M.M.
";

const GOOD_REPLY: &str = r#"```json
{
  "nomor_surat": "366/BALMON.33/KP.01.06/07/2025",
  "tanggal_pelaksanaan": "28 Juli 2025 s.d 01 Agustus 2025",
  "tempat_pelaksanaan": "Kota Semarang",
  "tujuan_kegiatan": "Inspeksi Monitoring Frekuensi Radio",
  "personil": [
    "Agung Suryo Wibowo, S.T.",
    "Kuswahyudi, S.Kom., M.M.",
    "Supriadi, S.H., M.H.",
    "Kepala Balai Monitor, S.T.",
    "Budi",
    42
  ]
}
```"#;

fn pipeline_with(model: Arc<ScriptedModel>, text: Option<&str>) -> Pipeline {
    Pipeline::new(
        &ExtractionConfig::default(),
        model,
        Arc::new(FixedText(text.map(str::to_string))),
    )
    .expect("default config builds a pipeline")
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn letter_becomes_record() {
    let model = ScriptedModel::replying(GOOD_REPLY);
    let pipeline = pipeline_with(model.clone(), Some(LETTER));

    let record = pipeline
        .process_pdf(Path::new("surat_tugas.pdf"))
        .await
        .expect("letter should process");

    assert_eq!(record.user, vec!["Agung Suryo Wibowo", "Kuswahyudi"]);
    assert_eq!(record.report.spt_number, "366/BALMON.33/KP.01.06/07/2025");
    assert_eq!(record.report.place_of_execution, "Kota Semarang");
    assert_eq!(
        record.report.destination,
        "Inspeksi Monitoring Frekuensi Radio"
    );
    assert_eq!(record.report.start_date, "2025-07-28");
    assert_eq!(record.report.end_date, "2025-08-01");
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn noise_never_reaches_the_model() {
    let model = ScriptedModel::replying(GOOD_REPLY);
    let pipeline = pipeline_with(model.clone(), Some(LETTER));
    pipeline.process_text(Some(LETTER)).await.unwrap();

    let prompts = model.prompts.lock().unwrap();
    let prompt = &prompts[0];
    assert!(prompt.contains("NOMOR: 366/BALMON.33/KP.01.06/07/2025"));
    assert!(prompt.contains("Agung Suryo Wibowo, S.T."));
    for noise in [
        "Semarang, 25 Juli 2025",
        "Supriadi, S.H., M.H.",
        "ditandatangani secara elektronik",
        "===== Page 2 =====",
    ] {
        assert!(!prompt.contains(noise), "noise line leaked: {noise:?}");
    }
}

#[tokio::test]
async fn empty_personnel_and_unparseable_dates() {
    let reply = r#"{
        "nomor_surat": "12/BALMON.33/KP.01.06/01/2025",
        "tanggal_pelaksanaan": "minggu depan",
        "tempat_pelaksanaan": "Kudus",
        "tujuan_kegiatan": "Pengukuran",
        "personil": []
    }"#;
    let pipeline = pipeline_with(ScriptedModel::replying(reply), None);

    let record = pipeline.process_text(Some(LETTER)).await.unwrap();
    assert!(record.user.is_empty());
    assert_eq!(record.report.start_date, "");
    assert_eq!(record.report.end_date, "");
    assert_eq!(record.report.place_of_execution, "Kudus");
}

#[tokio::test]
async fn missing_fields_become_empty_strings() {
    let reply = r#"{"nomor_surat": "7/BALMON.33/2025"}"#;
    let pipeline = pipeline_with(ScriptedModel::replying(reply), None);

    let record = pipeline.process_text(Some(LETTER)).await.unwrap();
    assert_eq!(record.report.spt_number, "7/BALMON.33/2025");
    assert_eq!(record.report.destination, "");
    assert_eq!(record.report.place_of_execution, "");
    assert!(record.user.is_empty());
}

// ── Gates before the model ───────────────────────────────────────────────────

#[tokio::test]
async fn blank_pdf_is_empty_pdf() {
    for text in [None, Some(""), Some("  \n\t ")] {
        let model = ScriptedModel::replying(GOOD_REPLY);
        let pipeline = pipeline_with(model.clone(), text);
        let err = pipeline
            .process_pdf(Path::new("blank.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, SptError::EmptyPdf), "got {err:?} for {text:?}");
        assert_eq!(model.calls(), 0);
    }
}

#[tokio::test]
async fn noise_only_pdf_is_empty_after_cleaning() {
    let noise = "Semarang, 25 Juli 2025\nSupriadi, S.H., M.H.\n===== Page 1 =====\n";
    let model = ScriptedModel::replying(GOOD_REPLY);
    let pipeline = pipeline_with(model.clone(), None);

    let err = pipeline.process_text(Some(noise)).await.unwrap_err();
    assert!(matches!(err, SptError::EmptyAfterCleaning), "got {err:?}");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn non_spt_text_is_rejected_with_reason() {
    let model = ScriptedModel::replying(GOOD_REPLY);
    let pipeline = pipeline_with(model.clone(), None);

    let err = pipeline
        .process_text(Some("Undangan rapat koordinasi\nNOMOR: 1/BALMON.33/2025"))
        .await
        .unwrap_err();
    match err {
        SptError::InvalidDocument { reason } => assert_eq!(reason, "Dokumen bukan Surat Tugas"),
        other => panic!("expected InvalidDocument, got {other:?}"),
    }

    let err = pipeline
        .process_text(Some("SURAT TUGAS\nNOMOR: 1/BALMON.12/2025"))
        .await
        .unwrap_err();
    match err {
        SptError::InvalidDocument { reason } => {
            assert_eq!(reason, "Nomor surat tidak sesuai format")
        }
        other => panic!("expected InvalidDocument, got {other:?}"),
    }
    assert_eq!(model.calls(), 0);
}

// ── Model failures ───────────────────────────────────────────────────────────

#[tokio::test]
async fn garbage_reply_is_analysis_failure() {
    let pipeline = pipeline_with(ScriptedModel::replying("Maaf, saya tidak bisa."), None);
    let err = pipeline.process_text(Some(LETTER)).await.unwrap_err();
    assert!(
        matches!(
            err,
            SptError::AnalysisFailed {
                source: UpstreamError::InvalidJson { .. }
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn array_reply_is_analysis_failure() {
    let pipeline = pipeline_with(ScriptedModel::replying(r#"["a"]"#), None);
    let err = pipeline.process_text(Some(LETTER)).await.unwrap_err();
    assert!(matches!(err, SptError::AnalysisFailed { .. }), "got {err:?}");
}

#[tokio::test]
async fn provider_error_is_analysis_failure() {
    let model = ScriptedModel::failing(UpstreamError::Timeout { secs: 60 });
    let pipeline = pipeline_with(model, None);
    let err = pipeline.process_text(Some(LETTER)).await.unwrap_err();
    assert!(
        matches!(
            err,
            SptError::AnalysisFailed {
                source: UpstreamError::Timeout { secs: 60 }
            }
        ),
        "got {err:?}"
    );
}

// ── Gate after the model ─────────────────────────────────────────────────────

#[tokio::test]
async fn letter_number_without_office_code_is_invalid_format() {
    for reply in [
        r#"{"nomor_surat": "366/BALMON.12/KP.01.06/07/2025", "personil": []}"#,
        r#"{"nomor_surat": 366, "personil": []}"#,
        r#"{"personil": ["Agung Suryo Wibowo, S.T."]}"#,
    ] {
        let pipeline = pipeline_with(ScriptedModel::replying(reply), None);
        let err = pipeline.process_text(Some(LETTER)).await.unwrap_err();
        assert!(
            matches!(err, SptError::InvalidFormat { .. }),
            "got {err:?} for {reply}"
        );
    }
}

#[tokio::test]
async fn lowercase_office_code_in_number_passes() {
    let reply = r#"{"nomor_surat": "366/balmon.33/kp.01.06/07/2025", "personil": []}"#;
    let pipeline = pipeline_with(ScriptedModel::replying(reply), None);
    let record = pipeline.process_text(Some(LETTER)).await.unwrap();
    assert_eq!(record.report.spt_number, "366/balmon.33/kp.01.06/07/2025");
}

// ── Custom rules ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_office_code_applies_to_both_gates() {
    let rules = DocumentRules {
        office_code: "BALMON.34".to_string(),
        ..DocumentRules::default()
    };
    let config = ExtractionConfig::builder().rules(rules).build().unwrap();
    let reply = r#"{"nomor_surat": "9/BALMON.34/2025", "personil": []}"#;
    let pipeline = Pipeline::new(
        &config,
        ScriptedModel::replying(reply),
        Arc::new(FixedText(None)),
    )
    .unwrap();

    let err = pipeline.process_text(Some(LETTER)).await.unwrap_err();
    assert!(matches!(err, SptError::InvalidDocument { .. }), "got {err:?}");

    let record = pipeline
        .process_text(Some("SURAT TUGAS\nNOMOR: 9/BALMON.34/2025"))
        .await
        .unwrap();
    assert_eq!(record.report.spt_number, "9/BALMON.34/2025");
}
