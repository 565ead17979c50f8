use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{Result, ValidationError};

/// Largest accepted upload: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_PPT: &str = "application/vnd.ms-powerpoint";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_UNKNOWN: &str = "application/octet-stream";

pub const ALLOWED_MIME_TYPES: [&str; 6] =
    [MIME_PDF, MIME_DOC, MIME_DOCX, MIME_PPT, MIME_PPTX, MIME_TEXT];

/// A document picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        Ok(Self::new(name, mime_for_path(path), bytes))
    }
}

/// A URL that passed validation. Only the validator constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUrl(String);

impl ValidUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file that passed type and size checks. Only the validator constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFile(DocumentFile);

impl ValidFile {
    pub fn file(&self) -> &DocumentFile {
        &self.0
    }

    pub fn into_file(self) -> DocumentFile {
        self.0
    }
}

/// Only emptiness is checked; malformed URLs are reported by the server.
pub fn validate_youtube_input(url: &str) -> std::result::Result<ValidUrl, ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        debug!("rejected empty YouTube URL");
        return Err(ValidationError::EmptyInput);
    }

    Ok(ValidUrl(trimmed.to_string()))
}

/// Parse `SS`, `M:SS` or `MM:SS` into seconds. Anything else yields `None`.
pub fn parse_duration_string(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parts = text
        .split(':')
        .map(parse_non_negative)
        .collect::<Option<Vec<u64>>>()?;

    match parts.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
        _ => None,
    }
}

fn parse_non_negative(part: &str) -> Option<u64> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

pub fn validate_file(file: DocumentFile) -> std::result::Result<ValidFile, ValidationError> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        debug!(name = %file.name, mime = %file.mime_type, "rejected unsupported file type");
        return Err(ValidationError::UnsupportedType {
            mime_type: file.mime_type,
        });
    }

    if file.byte_size() > MAX_UPLOAD_BYTES {
        debug!(name = %file.name, size = file.byte_size(), "rejected oversized file");
        return Err(ValidationError::TooLarge {
            byte_size: file.byte_size(),
        });
    }

    Ok(ValidFile(file))
}

/// Map a file extension to one of the accepted MIME types.
pub fn mime_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension() else {
        return MIME_UNKNOWN;
    };

    match ext.to_string_lossy().to_lowercase().as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        "ppt" => MIME_PPT,
        "pptx" => MIME_PPTX,
        "txt" => MIME_TEXT,
        _ => MIME_UNKNOWN,
    }
}
