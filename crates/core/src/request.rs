use serde::Serialize;
use tracing::debug;

use crate::{
    error::ValidationError,
    types::SubmissionKind,
    validate::{
        DocumentFile, ValidFile, ValidUrl, parse_duration_string, validate_file,
        validate_youtube_input,
    },
};

/// JSON body sent to the video analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YoutubeRequest {
    #[serde(rename = "youtube_url")]
    pub url: String,
    #[serde(
        rename = "average_view_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_view_duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub file: DocumentFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Youtube(YoutubeRequest),
    Document(DocumentRequest),
}

impl AnalysisRequest {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            AnalysisRequest::Youtube(_) => SubmissionKind::Youtube,
            AnalysisRequest::Document(_) => SubmissionKind::Document,
        }
    }
}

/// What the user has entered so far, across both input tabs.
///
/// Setters validate eagerly so that only checked input is ever held. A URL
/// that fails validation clears the held one, since the field now shows
/// something else. A rejected file leaves the previous selection in place.
#[derive(Debug, Clone, Default)]
pub struct InputDraft {
    url: Option<ValidUrl>,
    duration_text: String,
    file: Option<ValidFile>,
}

impl InputDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_url(&mut self, raw: &str) -> Result<(), ValidationError> {
        match validate_youtube_input(raw) {
            Ok(url) => {
                self.url = Some(url);
                Ok(())
            }
            Err(e) => {
                self.url = None;
                Err(e)
            }
        }
    }

    pub fn set_duration(&mut self, text: impl Into<String>) {
        self.duration_text = text.into();
    }

    pub fn set_file(&mut self, file: DocumentFile) -> Result<(), ValidationError> {
        self.file = Some(validate_file(file)?);
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file = None;
    }

    pub fn url(&self) -> Option<&ValidUrl> {
        self.url.as_ref()
    }

    pub fn file(&self) -> Option<&DocumentFile> {
        self.file.as_ref().map(ValidFile::file)
    }

    /// Build the request for whichever tab is active.
    pub fn build(&self, kind: SubmissionKind) -> Result<AnalysisRequest, ValidationError> {
        build_request(kind, self.url.as_ref(), &self.duration_text, self.file.as_ref())
    }
}

pub fn build_request(
    kind: SubmissionKind,
    url: Option<&ValidUrl>,
    duration_text: &str,
    file: Option<&ValidFile>,
) -> Result<AnalysisRequest, ValidationError> {
    match kind {
        SubmissionKind::Youtube => {
            let url = url.ok_or(ValidationError::MissingInput {
                what: "a YouTube URL",
            })?;
            let average_view_duration_seconds = parse_duration_string(duration_text);
            if average_view_duration_seconds.is_none() && !duration_text.trim().is_empty() {
                debug!(duration = duration_text, "ignoring unparseable view duration");
            }

            Ok(AnalysisRequest::Youtube(YoutubeRequest {
                url: url.as_str().to_string(),
                average_view_duration_seconds,
            }))
        }
        SubmissionKind::Document => {
            let file = file.ok_or(ValidationError::MissingInput { what: "a document" })?;
            Ok(AnalysisRequest::Document(DocumentRequest {
                file: file.file().clone(),
            }))
        }
    }
}
