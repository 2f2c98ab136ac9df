// EduCheck Data Models
// Shared types for the document-to-verdict pipeline

use serde::{Deserialize, Serialize};

// ============ Upload Boundary ============

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_PLAIN_TEXT: &str = "text/plain";

/// An uploaded document: declared MIME type, raw bytes and a display name.
/// Consumed once by the extractor, never persisted.
#[derive(Debug, Clone)]
pub struct Document {
    pub display_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Closed dispatch over the recognized upload formats. Anything that does
/// not parse here is an unsupported format, not an implicit plain-text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            MIME_PDF => Some(Self::Pdf),
            MIME_DOCX => Some(Self::Docx),
            MIME_PLAIN_TEXT => Some(Self::PlainText),
            _ => None,
        }
    }
}

// ============ Segmentation ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in the chunk sequence.
    pub index: i32,
    /// Char offset (0-based) into the extracted text.
    pub start: i32,
    /// Char offset (0-based, end-exclusive) into the extracted text.
    pub end: i32,
    pub text: String,
}

// ============ Classification ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkLabel {
    MachineGenerated,
    HumanAuthored,
}

/// Top-ranked classifier output for one chunk. `raw_label` keeps the
/// provider's literal label for display; `label` is the normalized verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: ChunkLabel,
    pub raw_label: String,
    pub confidence: f64,
}

// ============ Verdict & Report ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStatus {
    Original,
    NeedsReview,
}

impl ScanStatus {
    /// Tag shown in the summary display.
    pub fn display_tag(&self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::NeedsReview => "NEEDS REVIEW",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub ai_score: f64,
    pub human_score: f64,
    pub status: ScanStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReport {
    /// 0-based chunk index; the certificate prints blocks 1-based.
    pub index: i32,
    pub label: ChunkLabel,
    pub raw_label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub request_id: String,
    pub document: String,
    pub human_score: f64,
    pub ai_score: f64,
    pub status: ScanStatus,
    pub blocks: Vec<BlockReport>,
    pub version: String,
}

// ============ Scan Options ============

/// Chunking and decision parameters. The defaults match the published
/// behavior (600-char windows, 15 blocks, review at 25%); all three are
/// configuration rather than derived invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    #[serde(default = "default_chunk_size")]
    pub chunk_size_chars: usize,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            chunk_size_chars: default_chunk_size(),
            max_chunks: default_max_chunks(),
            review_threshold: default_review_threshold(),
        }
    }
}

// ============ Default Value Functions ============

fn default_chunk_size() -> usize { 600 }
fn default_max_chunks() -> usize { 15 }
fn default_review_threshold() -> f64 { 25.0 }
