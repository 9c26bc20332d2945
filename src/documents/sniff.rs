//! Content-type detection for uploaded payloads.
//!
//! The client-declared content type is never trusted: a disguised payload (say, an
//! executable renamed to `.txt`) must be rejected on its bytes alone. Detection covers
//! exactly the allow-list the gateway accepts: PDF, DOCX, and plain text.

/// MIME type for PDF documents.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type for DOCX documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type for plain text.
pub const TEXT_MIME: &str = "text/plain";

const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// Detect the content type of a payload from its bytes.
///
/// Returns `None` for anything outside the allow-list, including plain ZIP archives
/// that are not DOCX containers.
pub fn detect_content_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some(PDF_MIME);
    }
    if bytes.starts_with(ZIP_MAGIC) {
        return looks_like_docx(bytes).then_some(DOCX_MIME);
    }
    if is_plain_text(bytes) {
        return Some(TEXT_MIME);
    }
    None
}

/// A DOCX file is a ZIP container whose entries live under `word/` alongside
/// `[Content_Types].xml`; the entry names appear verbatim in the local file headers.
fn looks_like_docx(bytes: &[u8]) -> bool {
    contains(bytes, b"word/") || contains(bytes, b"[Content_Types].xml")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Treat valid UTF-8 without NUL bytes as plain text. Binary formats the gateway
/// rejects (images, executables, archives) fail one of the two checks in practice.
fn is_plain_text(bytes: &[u8]) -> bool {
    !bytes.is_empty() && !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}
