//! Base64 payload sizing shared by the migration planner and both readers

use crate::contract::{DocumentStats, DocumentType, SchemaVersion};

pub use crate::contract::calculate_size;

/// Embedded strings of this length or shorter are placeholders, not payloads
pub const PAYLOAD_MIN_EXCLUSIVE: usize = 100;

const PNG_DATA_URL_PREFIX: &str = "data:image/png";

/// Whether an embedded string carries a real payload
pub fn is_payload(content: &str) -> bool {
    content.len() > PAYLOAD_MIN_EXCLUSIVE
}

/// Returns the value only when it carries a real payload
pub fn payload(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| is_payload(s))
}

/// MIME type from a data-URL prefix; JPEG is the capture default
pub fn sniff_mime_type(content: &str) -> &'static str {
    if content.starts_with(PNG_DATA_URL_PREFIX) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Running totals behind `DocumentStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentTally {
    pub total_bytes: u64,
    pub signatures: usize,
    pub certificates: usize,
    pub documents: usize,
}

impl DocumentTally {
    pub fn add(&mut self, doc_type: DocumentType, size: u64) {
        self.total_bytes += size;
        self.documents += 1;
        match doc_type {
            DocumentType::Signature => self.signatures += 1,
            DocumentType::Certificate => self.certificates += 1,
            _ => {}
        }
    }

    pub fn into_stats(self, is_normalized: bool, schema_version: SchemaVersion) -> DocumentStats {
        let kb = self.total_bytes as f64 / 1024.0;
        let mb = kb / 1024.0;
        DocumentStats {
            total_size_bytes: self.total_bytes,
            total_size_kb: round2(kb),
            total_size_mb: round2(mb),
            signature_count: self.signatures,
            certificate_count: self.certificates,
            document_count: self.documents,
            is_normalized,
            schema_version,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
