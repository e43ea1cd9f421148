//! Pipeline stages for SPT extraction.
//!
//! Each submodule implements exactly one step. Keeping stages separate
//! makes each independently testable and lets the orchestrator in
//! [`crate::process`] own the short-circuit policy alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ clean ──▶ validate ──▶ llm ──▶ personnel + dates
//! (upload)  (pdfium)   (noise)   (gate)       (LLM)   (sanitize)
//! ```
//!
//! 1. [`input`]     — check the upload name, stage bytes in a temp file
//! 2. [`extract`]   — pull raw text out of every page; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`clean`]     — drop signature, footer and page-break lines
//! 4. [`validate`]  — reject non-SPT text before paying for an LLM call;
//!    re-check the letter number afterwards
//! 5. [`llm`]       — fixed-prompt extraction; the only stage with network I/O
//! 6. [`personnel`] / [`dates`] — deterministic cleanup of the model's reply

pub mod clean;
pub mod dates;
pub mod extract;
pub mod input;
pub mod llm;
pub mod personnel;
pub mod validate;
