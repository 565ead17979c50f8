use std::fmt;

use serde::{Deserialize, Serialize};

/// Which input tab a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    #[default]
    Youtube,
    Document,
}

impl SubmissionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionKind::Youtube => "youtube",
            SubmissionKind::Document => "document",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 0..=100 score. Anything outside the range is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Score::new)
            .ok_or_else(|| format!("score {value} is outside 0..=100"))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub video_id: Option<String>,
    pub title: String,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub thumbnail_url: String,
    pub channel_name: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl VideoMetadata {
    /// Video id the document endpoint uses for its stand-in metadata.
    pub const DOCUMENT_PLACEHOLDER_ID: &'static str = "doc_analysis";

    pub fn is_document_placeholder(&self) -> bool {
        self.video_id.as_deref() == Some(Self::DOCUMENT_PLACEHOLDER_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    #[serde(rename = "timestamp")]
    pub timestamp_label: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStructure {
    #[serde(default)]
    pub hook: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub main_content: String,
    #[serde(default)]
    pub call_to_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRecommendation {
    pub platform: String,
    pub suitability_score: Score,
    pub reasoning: String,
    #[serde(default)]
    pub optimization_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub target_audience: String,
    pub content_style: String,
    #[serde(rename = "suggested_structure", default)]
    pub structure: ContentStructure,
    #[serde(default)]
    pub pro_tips: Vec<String>,
    pub estimated_viral_score: Score,
    #[serde(default)]
    pub platform_recommendations: Option<Vec<PlatformRecommendation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Complexity {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl Complexity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Complexity::Low,
            "medium" => Complexity::Medium,
            "high" => Complexity::High,
            _ => Complexity::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
            Complexity::Unknown => "Unknown",
        }
    }
}

impl From<String> for Complexity {
    fn from(label: String) -> Self {
        Complexity::from_label(&label)
    }
}

impl From<Complexity> for String {
    fn from(complexity: Complexity) -> Self {
        complexity.label().to_string()
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_type: String,
    #[serde(rename = "estimated_reading_time")]
    pub reading_time: String,
    pub complexity: Complexity,
}

/// Response body of both analysis endpoints, exactly as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub video_metadata: Option<VideoMetadata>,
    pub summary: String,
    #[serde(default)]
    pub timeline_summary: Option<Vec<TimelineItem>>,
    pub viral_score: Score,
    #[serde(default)]
    pub viral_label: String,
    #[serde(default)]
    pub viral_explanation: String,
    pub recommendations: Recommendation,
    #[serde(default)]
    pub doc_summary: Option<String>,
    #[serde(default)]
    pub key_points: Option<Vec<String>>,
    #[serde(default)]
    pub document_info: Option<DocumentInfo>,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub content_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_metadata: VideoMetadata,
    pub summary: String,
    pub timeline: Vec<TimelineItem>,
    pub viral_score: Score,
    pub viral_label: String,
    pub viral_explanation: String,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub document_info: Option<DocumentInfo>,
    pub word_count: Option<u64>,
    pub content_preview: Option<String>,
    pub viral_score: Score,
    pub viral_label: String,
    pub viral_explanation: String,
    pub recommendation: Recommendation,
}

/// Shaped result of a successful analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    Video(VideoAnalysis),
    Document(DocumentAnalysis),
}

impl AnalysisResult {
    pub fn summary(&self) -> &str {
        match self {
            AnalysisResult::Video(v) => &v.summary,
            AnalysisResult::Document(d) => &d.summary,
        }
    }

    pub fn viral_score(&self) -> Score {
        match self {
            AnalysisResult::Video(v) => v.viral_score,
            AnalysisResult::Document(d) => d.viral_score,
        }
    }

    pub fn viral_label(&self) -> &str {
        match self {
            AnalysisResult::Video(v) => &v.viral_label,
            AnalysisResult::Document(d) => &d.viral_label,
        }
    }

    pub fn viral_explanation(&self) -> &str {
        match self {
            AnalysisResult::Video(v) => &v.viral_explanation,
            AnalysisResult::Document(d) => &d.viral_explanation,
        }
    }

    pub fn recommendation(&self) -> &Recommendation {
        match self {
            AnalysisResult::Video(v) => &v.recommendation,
            AnalysisResult::Document(d) => &d.recommendation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rejects_out_of_range_values() {
        assert!(serde_json::from_str::<Score>("100").is_ok());
        assert!(serde_json::from_str::<Score>("0").is_ok());
        assert!(serde_json::from_str::<Score>("101").is_err());
        assert!(serde_json::from_str::<Score>("-1").is_err());
    }

    #[test]
    fn complexity_parses_case_insensitively() {
        assert_eq!(Complexity::from_label("Medium"), Complexity::Medium);
        assert_eq!(Complexity::from_label(" HIGH "), Complexity::High);
        assert_eq!(Complexity::from_label("low"), Complexity::Low);
        assert_eq!(Complexity::from_label("extreme"), Complexity::Unknown);
    }

    #[test]
    fn recommendation_tolerates_missing_optional_parts() {
        let json = serde_json::json!({
            "title": "Idea",
            "target_audience": "Devs",
            "content_style": "Tutorial",
            "estimated_viral_score": 70
        });
        let rec: Recommendation = serde_json::from_value(json).unwrap();
        assert_eq!(rec.structure, ContentStructure::default());
        assert!(rec.pro_tips.is_empty());
        assert!(rec.platform_recommendations.is_none());
    }

    #[test]
    fn placeholder_metadata_is_detected() {
        let meta: VideoMetadata = serde_json::from_value(serde_json::json!({
            "video_id": "doc_analysis",
            "title": "report.pdf",
            "duration": 0,
            "thumbnail_url": "",
            "channel_name": "Document Upload"
        }))
        .unwrap();
        assert!(meta.is_document_placeholder());
    }
}
