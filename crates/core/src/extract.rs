//! Recovers structured fields that the document endpoint folds into its
//! markdown-flavoured summary text.
//!
//! Extraction is best-effort: a missing or malformed marker only drops the
//! derived field, the raw summary is always displayable.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::types::{Complexity, DocumentInfo};

pub const KEY_POINTS_MARKER: &str = "**Key Points:**";
pub const DOCUMENT_INFO_MARKER: &str = "\n\n**Document Type:**";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*(.*)$").unwrap());
static DOCUMENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Document Type:\*\* (.+)").unwrap());
static READING_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Reading Time:\*\* (.+)").unwrap());
static COMPLEXITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Content Complexity:\*\* (.+)").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
enum ExtractError {
    #[error("marker `{0}` not found")]
    MissingMarker(&'static str),

    #[error("marker `{0}` has an empty value")]
    EmptyValue(&'static str),
}

/// Everything recoverable from one summary string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummarySections {
    pub summary: String,
    pub key_points: Vec<String>,
    pub document_info: Option<DocumentInfo>,
}

pub fn extract_sections(raw: &str) -> SummarySections {
    SummarySections {
        summary: clean_summary(raw),
        key_points: extract_key_points(raw),
        document_info: extract_document_info(raw),
    }
}

/// Numbered items between the first `**Key Points:**` and the next one, prefix
/// stripped, in source order.
pub fn extract_key_points(summary: &str) -> Vec<String> {
    let Some(section) = summary.split(KEY_POINTS_MARKER).nth(1) else {
        return Vec::new();
    };

    section
        .lines()
        .filter_map(|line| {
            NUMBERED_LINE
                .captures(line.trim())
                .map(|caps| caps[1].trim().to_string())
        })
        .filter(|point| !point.is_empty())
        .collect()
}

/// All three document markers, or nothing.
pub fn extract_document_info(summary: &str) -> Option<DocumentInfo> {
    match try_document_info(summary) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!(reason = %e, "document info not extracted from summary");
            None
        }
    }
}

fn try_document_info(summary: &str) -> Result<DocumentInfo, ExtractError> {
    let document_type = marker_value(summary, &DOCUMENT_TYPE, "Document Type")?;
    let reading_time = marker_value(summary, &READING_TIME, "Reading Time")?;
    let complexity = marker_value(summary, &COMPLEXITY, "Content Complexity")?;

    Ok(DocumentInfo {
        document_type,
        reading_time,
        complexity: Complexity::from_label(&complexity),
    })
}

fn marker_value(
    summary: &str,
    pattern: &Regex,
    name: &'static str,
) -> Result<String, ExtractError> {
    let caps = pattern
        .captures(summary)
        .ok_or(ExtractError::MissingMarker(name))?;
    let value = caps[1].trim();
    if value.is_empty() {
        return Err(ExtractError::EmptyValue(name));
    }
    Ok(value.to_string())
}

/// Summary text without the trailing document-info and key-points block.
pub fn clean_summary(summary: &str) -> String {
    summary
        .split_once(DOCUMENT_INFO_MARKER)
        .map_or(summary, |(head, _)| head)
        .trim()
        .to_string()
}
