// Text Extraction Service
// Converts an uploaded document (pdf / docx / plain text) into one string

use crate::models::{Document, DocumentKind, MIME_DOCX, MIME_PDF, MIME_PLAIN_TEXT};
use regex::Regex;
use std::io::Read;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported upload type: {mime}")]
    UnsupportedFormat { mime: String },
    #[error("pdf extraction failed: {0}")]
    Pdf(String),
    #[error("pdf is password protected")]
    PasswordProtected,
    #[error("docx extraction failed: {0}")]
    Docx(String),
    #[error("plain text is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Map a lowercase file extension to the declared MIME type the upload
/// boundary would send.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some(MIME_PDF),
        "docx" => Some(MIME_DOCX),
        "txt" => Some(MIME_PLAIN_TEXT),
        _ => None,
    }
}

/// Extract the full text of a document according to its declared MIME type.
/// Reads the input once; the declared type is trusted, not sniffed.
pub fn extract_text(document: &Document) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_mime(&document.mime_type).ok_or_else(|| {
        ExtractError::UnsupportedFormat {
            mime: document.mime_type.clone(),
        }
    })?;

    match kind {
        DocumentKind::Pdf => extract_pdf(&document.bytes),
        DocumentKind::Docx => extract_docx(&document.bytes),
        DocumentKind::PlainText => Ok(String::from_utf8(document.bytes.clone())?),
    }
}

/// Extract every page's text in page order, joined with a single space.
/// A page with no extractable text (scanned image) contributes an empty
/// string rather than an error.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        let msg = e.to_string();
        let lowered = msg.to_lowercase();
        if lowered.contains("encrypted") || lowered.contains("password") {
            ExtractError::PasswordProtected
        } else {
            ExtractError::Pdf(msg)
        }
    })?;

    // Pages come back separated by form feeds.
    let pages: Vec<&str> = raw.split('\x0C').collect();
    let empty_pages = pages.iter().filter(|p| p.trim().is_empty()).count();
    if empty_pages > 0 {
        debug!(empty_pages, total_pages = pages.len(), "extract.pdf.pages_without_text");
    }

    Ok(pages.join(" "))
}

/// Extract the document's visible text in document order, formatting
/// discarded. Primary path walks the parsed docx tree; if the file cannot
/// be parsed structurally, fall back to reading word/document.xml out of
/// the zip container directly.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    match docx_rs::read_docx(bytes) {
        Ok(docx) => {
            let mut out = String::new();
            for child in &docx.document.children {
                match child {
                    docx_rs::DocumentChild::Paragraph(p) => {
                        push_paragraph(&paragraph_text(&p.children), &mut out);
                    }
                    docx_rs::DocumentChild::Table(table) => {
                        for row in &table.rows {
                            let docx_rs::TableChild::TableRow(row) = row;
                            for cell in &row.cells {
                                let docx_rs::TableRowChild::TableCell(cell) = cell;
                                for content in &cell.children {
                                    if let docx_rs::TableCellContent::Paragraph(p) = content {
                                        push_paragraph(&paragraph_text(&p.children), &mut out);
                                    }
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(out)
        }
        Err(e) => {
            warn!(error = %e, "extract.docx.structured_parse_failed");
            extract_docx_raw_xml(bytes)
        }
    }
}

fn paragraph_text(children: &[docx_rs::ParagraphChild]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                        docx_rs::RunChild::Tab(_) => out.push(' '),
                        docx_rs::RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            docx_rs::ParagraphChild::Hyperlink(link) => {
                out.push_str(&paragraph_text(&link.children));
            }
            _ => {}
        }
    }
    out
}

fn push_paragraph(text: &str, out: &mut String) {
    if text.trim().is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(text);
}

fn extract_docx_raw_xml(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    Ok(document_xml_to_text(&xml))
}

/// Pull the text runs (`<w:t>`) out of a raw WordprocessingML body,
/// one output line per `<w:p>` paragraph.
fn document_xml_to_text(xml: &str) -> String {
    let run_re = Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").unwrap();
    let mut out = String::new();
    for para in xml.split("</w:p>") {
        let mut para_text = String::new();
        for cap in run_re.captures_iter(para) {
            para_text.push_str(&unescape_xml(&cap[1]));
        }
        push_paragraph(&para_text, &mut out);
    }
    out
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
