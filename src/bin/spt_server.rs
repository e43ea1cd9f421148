//! CLI binary for spt-extract.
//!
//! Serves the HTTP API by default. `probe` checks LLM connectivity step by
//! step; `extract` runs one local PDF through the pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spt_extract::api::{error::error_body, start_server, AppState, ServerConfig};
use spt_extract::config::{DEFAULT_MODEL, DEFAULT_PROVIDER};
use spt_extract::pipeline::llm::{resolve_provider, strip_json_fence};
use spt_extract::{
    DocumentRules, ExtractionClient, ExtractionConfig, Pipeline, PdfiumExtractor,
    ProviderGenerator, TextGenerator,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on 0.0.0.0:8000 (Gemini, GEMINI_API_KEY from the environment)
  spt-server

  # Another port, custom document rules
  spt-server --port 9000 --rules rules.json

  # Check LLM connectivity before deploying
  spt-server probe

  # Run one letter locally and print the record
  spt-server extract surat_tugas.pdf --pretty

ENDPOINTS:
  GET  /             liveness message
  POST /process-pdf  multipart form, field "pdf"

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY     Google Gemini API key (default credential)
  SPT_API_KEY_ENV    Name of the credential variable checked at startup
  PDFIUM_LIB_PATH    Directory containing libpdfium (default: system library)
  RUST_LOG           tracing filter, overrides --verbose / --quiet
"#;

/// Extract structured data from Surat Tugas PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "spt-server",
    version,
    about = "Extract structured data from Surat Tugas (assignment letter) PDFs",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Bind address.
    #[arg(long, env = "SPT_HOST", default_value = "0.0.0.0", global = true)]
    host: String,

    /// Bind port.
    #[arg(long, env = "SPT_PORT", default_value_t = 8000, global = true)]
    port: u16,

    /// LLM provider: gemini, openai, anthropic, ollama, ...
    #[arg(long, env = "SPT_PROVIDER", default_value = DEFAULT_PROVIDER, global = true)]
    provider: String,

    /// LLM model ID.
    #[arg(long, env = "SPT_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Environment variable that must hold the provider credential.
    #[arg(long, env = "SPT_API_KEY_ENV", default_value = "GEMINI_API_KEY", global = true)]
    api_key_env: String,

    /// LLM call timeout in seconds.
    #[arg(long, env = "SPT_API_TIMEOUT", default_value_t = 60, global = true)]
    api_timeout: u64,

    /// Retries on LLM failure.
    #[arg(long, env = "SPT_MAX_RETRIES", default_value_t = 0, global = true)]
    max_retries: u32,

    /// Largest accepted upload in MiB.
    #[arg(long, env = "SPT_MAX_UPLOAD_MB", default_value_t = 16,
          value_parser = clap::value_parser!(u64).range(1..=1024), global = true)]
    max_upload_mb: u64,

    /// Directory containing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH", global = true)]
    pdfium_lib_path: Option<PathBuf>,

    /// JSON file overriding the document rules.
    #[arg(long, env = "SPT_RULES", global = true)]
    rules: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SPT_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "SPT_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Check LLM connectivity step by step.
    Probe,
    /// Run one local PDF through the pipeline and print the record.
    Extract {
        /// Path to the PDF.
        file: PathBuf,
        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.command {
        None | Some(Command::Serve) => serve(&cli, &config).await,
        Some(Command::Probe) => probe(&cli, &config).await,
        Some(Command::Extract { ref file, pretty }) => {
            extract(&cli, &config, file.clone(), pretty).await
        }
    }
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .provider_name(cli.provider.clone())
        .model(cli.model.clone())
        .api_timeout_secs(cli.api_timeout)
        .max_retries(cli.max_retries);

    if let Some(ref path) = cli.rules {
        let rules = DocumentRules::from_json_file(path)
            .with_context(|| format!("Failed to load document rules from {:?}", path))?;
        builder = builder.rules(rules);
    }

    builder.build().context("Invalid configuration")
}

fn credential_present(var: &str) -> bool {
    std::env::var(var)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

fn require_credential(cli: &Cli) -> Result<()> {
    if !credential_present(&cli.api_key_env) {
        anyhow::bail!(
            "{} is not set. Export the provider API key before starting.",
            cli.api_key_env
        );
    }
    Ok(())
}

/// Everything the server and `extract` need, checked up front.
fn build_pipeline(cli: &Cli, config: &ExtractionConfig) -> Result<Pipeline> {
    require_credential(cli)?;
    PdfiumExtractor::new(cli.pdfium_lib_path.clone())
        .check()
        .context("PDF engine unavailable")?;
    Pipeline::from_config(config, cli.pdfium_lib_path.clone())
        .context("Failed to initialise the extraction pipeline")
}

// ── serve ────────────────────────────────────────────────────────────────

async fn serve(cli: &Cli, config: &ExtractionConfig) -> Result<()> {
    let pipeline = build_pipeline(cli, config)?;
    let server = ServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        max_upload_bytes: (cli.max_upload_mb * 1024 * 1024) as usize,
    };
    info!(
        "Using {} / {} (timeout {}s, retries {})",
        config.provider_name_or_default(),
        config.model_or_default(),
        config.api_timeout_secs,
        config.max_retries
    );
    start_server(&server, AppState::new(pipeline))
        .await
        .with_context(|| format!("Server on {} failed", server.addr()))
}

// ── extract ──────────────────────────────────────────────────────────────

async fn extract(cli: &Cli, config: &ExtractionConfig, file: PathBuf, pretty: bool) -> Result<()> {
    let pipeline = build_pipeline(cli, config)?;
    let (body, failure) = match pipeline.process_pdf(&file).await {
        Ok(record) => (serde_json::to_value(&record)?, None),
        Err(e) => (error_body(&e).1, Some(e)),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&body)
    } else {
        serde_json::to_string(&body)
    }
    .context("Failed to serialise output")?;
    println!("{json}");

    match failure {
        Some(e) => Err(e).with_context(|| format!("Extraction of {:?} failed", file)),
        None => Ok(()),
    }
}

// ── probe ────────────────────────────────────────────────────────────────

const PROBE_LETTER: &str = "SURAT TUGAS
NOMOR: 366/BALMON.33/KP.01.06/07/2025

Tempat: Kota Semarang
Tanggal: 28 Juli 2025 s.d 01 Agustus 2025
Tujuan: Inspeksi Monitoring

Lampiran
1. Budi Santoso, S.T.
2. Rina Wulandari, S.Kom.";

fn step(n: u32, title: &str) {
    eprintln!("\n{} {}", bold(&format!("[{n}/5]")), title);
}

fn pass(msg: &str) {
    eprintln!("  {} {}", green("✓"), msg);
}

fn fail(msg: &str) -> anyhow::Error {
    eprintln!("  {} {}", red("✗"), msg);
    anyhow::anyhow!("probe failed: {msg}")
}

async fn probe(cli: &Cli, config: &ExtractionConfig) -> Result<()> {
    eprintln!(
        "{}",
        bold(&format!(
            "Probing {} / {}",
            config.provider_name_or_default(),
            config.model_or_default()
        ))
    );

    step(1, "Credential");
    if !credential_present(&cli.api_key_env) {
        return Err(fail(&format!("{} is not set", cli.api_key_env)));
    }
    pass(&format!("{} is set", cli.api_key_env));

    step(2, "Provider");
    let provider = resolve_provider(config).map_err(|e| fail(&e.to_string()))?;
    let generator = Arc::new(ProviderGenerator::new(provider, config));
    pass("provider initialised");

    step(3, "Plain reply");
    let reply = generator
        .generate("Say hello in one word", "Answer in one word.")
        .await
        .map_err(|e| fail(&e.to_string()))?;
    pass(&format!("reply: {}", dim(reply.trim())));

    step(4, "JSON reply");
    let reply = generator
        .generate(
            r#"Return JSON: {"test": "success"}"#,
            "Reply with a single JSON object and nothing else.",
        )
        .await
        .map_err(|e| fail(&e.to_string()))?;
    match serde_json::from_str::<serde_json::Value>(strip_json_fence(&reply)) {
        Ok(v) if v.is_object() => pass(&format!("reply: {}", dim(&v.to_string()))),
        Ok(v) => return Err(fail(&format!("not a JSON object: {v}"))),
        Err(e) => return Err(fail(&format!("invalid JSON: {e}"))),
    }

    step(5, "SPT extraction");
    let client = ExtractionClient::with_config(generator, config);
    let extraction = client
        .extract(PROBE_LETTER)
        .await
        .map_err(|e| fail(&e.to_string()))?;
    pass(&format!(
        "nomor_surat: {}, personil: {}",
        dim(extraction.letter_number()),
        extraction.personil.len()
    ));

    eprintln!("\n{} all checks passed", green("✔"));
    Ok(())
}
