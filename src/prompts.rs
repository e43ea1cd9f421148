//! Prompts for LLM-based SPT field extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing what the model is asked for
//!    (a new field, a stricter rule about the signature block) requires
//!    editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the prompts directly without
//!    calling a real model, so a prompt regression is caught before it ships.
//!
//! The prompts are written in Indonesian, the language of the letters.
//! Callers can override the system instruction via
//! [`crate::config::ExtractionConfig::system_instruction`].

/// JSON keys the model must return, in prompt order.
pub const EXTRACTION_FIELDS: [&str; 5] = [
    "nomor_surat",
    "tanggal_pelaksanaan",
    "tempat_pelaksanaan",
    "tujuan_kegiatan",
    "personil",
];

/// Default system instruction for the extraction call.
pub const SYSTEM_INSTRUCTION: &str = "Anda adalah parser data yang sangat akurat untuk Surat Tugas (SPT). \
Tugas Anda HANYA mengekstrak informasi dari BAGIAN UTAMA surat. \
ABAIKAN sepenuhnya: tanda tangan, footer, header berulang, dan elemen di luar konten utama. \
Untuk daftar personil, ambil HANYA dari tabel yang ada di lampiran. \
ABAIKAN nama di bagian tanda tangan seperti 'Supriadi, S.H., M.H.'. \
JIKA SEBUAH DATA TIDAK DITEMUKAN, isi dengan string kosong (\" \"). \
JANGAN sertakan teks atau penjelasan lain di luar blok JSON.";

/// User prompt template. `{document}` is replaced with the cleaned text.
const EXTRACTION_TEMPLATE: &str = r#"EKSTRAK INFORMASI dari teks Surat Tugas di bawah:

INFORMASI YANG DIEKSTRAK:
1. Nomor Surat (Nomor SPT)
2. Tanggal Pelaksanaan (Format: DD MMMM YYYY s.d DD MMMM YYYY)
3. Tempat Pelaksanaan
4. Tujuan/Kegiatan
5. Daftar Nama Personil (HANYA dari tabel lampiran)

Output HARUS dalam format JSON:
{
  "nomor_surat": "...",
  "tanggal_pelaksanaan": "...",
  "tempat_pelaksanaan": "...",
  "tujuan_kegiatan": "...",
  "personil": ["Nama 1", "Nama 2", ...]
}

TEKS SURAT TUGAS:
---
{document}
---"#;

/// Build the user prompt for one cleaned document.
pub fn extraction_prompt(cleaned_text: &str) -> String {
    EXTRACTION_TEMPLATE.replace("{document}", cleaned_text)
}
