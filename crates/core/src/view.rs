use std::fmt;

use tracing::debug;

use crate::{
    extract::extract_sections,
    types::{
        AnalysisResponse, AnalysisResult, DocumentAnalysis, PlatformRecommendation, Score,
        SubmissionKind, VideoAnalysis,
    },
};

/// Viral potential bucket, used when the backend leaves the label empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViralTier {
    NeedsImprovement,
    Moderate,
    Good,
    VeryHigh,
}

impl ViralTier {
    pub fn from_score(score: Score) -> Self {
        match score.value() {
            80.. => ViralTier::VeryHigh,
            60..=79 => ViralTier::Good,
            40..=59 => ViralTier::Moderate,
            _ => ViralTier::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViralTier::VeryHigh => "Very High Potential",
            ViralTier::Good => "Good Potential",
            ViralTier::Moderate => "Moderate Potential",
            ViralTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for ViralTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Emotional engagement estimate shown next to the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    pub fn from_score(score: Score) -> Self {
        match score.value() {
            70.. => EngagementLevel::High,
            50..=69 => EngagementLevel::Medium,
            _ => EngagementLevel::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngagementLevel::High => "High",
            EngagementLevel::Medium => "Medium",
            EngagementLevel::Low => "Low",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngagementLevel::High => "Strong emotional connection with audience",
            EngagementLevel::Medium => "Good balance of emotion and information",
            EngagementLevel::Low => "Primarily informational content",
        }
    }
}

/// Turn a raw response into the result shape the viewer works with.
///
/// Real video metadata selects the video shape. The document endpoint's
/// placeholder metadata does not count, and documents never become videos.
pub fn shape_response(response: AnalysisResponse, origin: SubmissionKind) -> AnalysisResult {
    let AnalysisResponse {
        video_metadata,
        summary,
        timeline_summary,
        viral_score,
        viral_label,
        viral_explanation,
        recommendations,
        doc_summary: _,
        key_points,
        document_info,
        word_count,
        content_preview,
    } = response;

    let viral_label = label_or_tier(viral_label, viral_score);
    let video_metadata = video_metadata.filter(|meta| !meta.is_document_placeholder());

    if let (SubmissionKind::Youtube, Some(video_metadata)) = (origin, video_metadata) {
        return AnalysisResult::Video(VideoAnalysis {
            video_metadata,
            summary,
            timeline: timeline_summary.unwrap_or_default(),
            viral_score,
            viral_label,
            viral_explanation,
            recommendation: recommendations,
        });
    }

    let sections = extract_sections(&summary);
    let key_points = if sections.key_points.is_empty() {
        key_points.unwrap_or_default()
    } else {
        sections.key_points
    };
    let document_info = sections.document_info.or(document_info);
    debug!(
        key_points = key_points.len(),
        has_document_info = document_info.is_some(),
        "shaped document analysis"
    );

    AnalysisResult::Document(DocumentAnalysis {
        summary: sections.summary,
        key_points,
        document_info,
        word_count,
        content_preview,
        viral_score,
        viral_label,
        viral_explanation,
        recommendation: recommendations,
    })
}

fn label_or_tier(label: String, score: Score) -> String {
    if label.trim().is_empty() {
        ViralTier::from_score(score).label().to_string()
    } else {
        label
    }
}

impl AnalysisResult {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            AnalysisResult::Video(_) => SubmissionKind::Youtube,
            AnalysisResult::Document(_) => SubmissionKind::Document,
        }
    }

    pub fn viral_tier(&self) -> ViralTier {
        ViralTier::from_score(self.viral_score())
    }

    pub fn engagement_level(&self) -> EngagementLevel {
        EngagementLevel::from_score(self.viral_score())
    }

    /// Platform recommendations, best fit first. Ties keep backend order.
    pub fn platforms_by_suitability(&self) -> Vec<&PlatformRecommendation> {
        let mut platforms: Vec<_> = self
            .recommendation()
            .platform_recommendations
            .iter()
            .flatten()
            .collect();
        platforms.sort_by(|a, b| b.suitability_score.cmp(&a.suitability_score));
        platforms
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::types::{Complexity, DocumentInfo};

    fn recommendations() -> Value {
        json!({
            "title": "Ten tips",
            "target_audience": "Creators",
            "content_style": "Listicle",
            "suggested_structure": {
                "hook": "Open strong",
                "introduction": "Context",
                "main_content": "Tips",
                "call_to_action": "Subscribe"
            },
            "pro_tips": ["Post at noon"],
            "estimated_viral_score": 72,
            "platform_recommendations": [
                {
                    "platform": "YouTube",
                    "suitability_score": 60,
                    "reasoning": "Long form",
                    "optimization_tips": []
                },
                {
                    "platform": "TikTok",
                    "suitability_score": 90,
                    "reasoning": "Short clips",
                    "optimization_tips": ["Hook in 2s"]
                },
                {
                    "platform": "Instagram",
                    "suitability_score": 60,
                    "reasoning": "Reels",
                    "optimization_tips": []
                }
            ]
        })
    }

    fn response(extra: Value) -> AnalysisResponse {
        let mut body = json!({
            "summary": "Plain summary",
            "viral_score": 85,
            "viral_label": "Very High Potential",
            "viral_explanation": "Trending topic",
            "recommendations": recommendations()
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
            base.extend(extra);
        }
        serde_json::from_value(body).unwrap()
    }

    fn video_metadata(video_id: &str) -> Value {
        json!({
            "video_id": video_id,
            "title": "How to cook",
            "duration": 605,
            "thumbnail_url": "https://img/1.jpg",
            "channel_name": "Chef",
            "view_count": 12000
        })
    }

    #[test]
    fn video_metadata_selects_video_shape() {
        let raw = response(json!({
            "video_metadata": video_metadata("abc123"),
            "timeline_summary": [
                {"timestamp": "00:00 - 01:00", "summary": "Intro"},
                {"timestamp": "01:00 - 02:00", "summary": "Prep"}
            ]
        }));

        let AnalysisResult::Video(video) = shape_response(raw, SubmissionKind::Youtube) else {
            panic!("expected video shape");
        };
        assert_eq!(video.video_metadata.duration_seconds, 605);
        assert_eq!(video.timeline.len(), 2);
        assert_eq!(video.timeline[1].timestamp_label, "01:00 - 02:00");
    }

    #[test]
    fn youtube_response_without_metadata_is_a_document() {
        let result = shape_response(response(json!({})), SubmissionKind::Youtube);
        assert_eq!(result.kind(), SubmissionKind::Document);
    }

    #[test]
    fn placeholder_metadata_is_a_document() {
        let raw = response(json!({ "video_metadata": video_metadata("doc_analysis") }));
        let result = shape_response(raw, SubmissionKind::Youtube);
        assert_eq!(result.kind(), SubmissionKind::Document);
    }

    #[test]
    fn document_endpoint_never_yields_video() {
        let raw = response(json!({ "video_metadata": video_metadata("abc123") }));
        let result = shape_response(raw, SubmissionKind::Document);
        assert_eq!(result.kind(), SubmissionKind::Document);
    }

    #[test]
    fn extracted_sections_win_over_explicit_fields() {
        let raw = response(json!({
            "summary": "Body text.\n\n\
                **Document Type:** Guide\n**Reading Time:** 3 min\n**Content Complexity:** High\n\n\
                **Key Points:**\n1. First\n2. Second\n",
            "key_points": ["ignored"],
            "document_info": {
                "document_type": "Memo",
                "estimated_reading_time": "1 min",
                "complexity": "Low"
            }
        }));

        let AnalysisResult::Document(doc) = shape_response(raw, SubmissionKind::Document) else {
            panic!("expected document shape");
        };
        assert_eq!(doc.summary, "Body text.");
        assert_eq!(doc.key_points, vec!["First", "Second"]);
        assert_eq!(
            doc.document_info,
            Some(DocumentInfo {
                document_type: "Guide".to_string(),
                reading_time: "3 min".to_string(),
                complexity: Complexity::High,
            })
        );
    }

    #[test]
    fn explicit_fields_fill_in_when_summary_has_no_markers() {
        let raw = response(json!({
            "key_points": ["From backend"],
            "document_info": {
                "document_type": "Memo",
                "estimated_reading_time": "1 min",
                "complexity": "low"
            },
            "word_count": 420
        }));

        let AnalysisResult::Document(doc) = shape_response(raw, SubmissionKind::Document) else {
            panic!("expected document shape");
        };
        assert_eq!(doc.summary, "Plain summary");
        assert_eq!(doc.key_points, vec!["From backend"]);
        assert_eq!(doc.document_info.map(|i| i.complexity), Some(Complexity::Low));
        assert_eq!(doc.word_count, Some(420));
    }

    #[test]
    fn missing_key_points_do_not_block_shaping() {
        let AnalysisResult::Document(doc) =
            shape_response(response(json!({})), SubmissionKind::Document)
        else {
            panic!("expected document shape");
        };
        assert!(doc.key_points.is_empty());
        assert!(doc.document_info.is_none());
    }

    #[test]
    fn empty_label_falls_back_to_tier() {
        let raw = response(json!({ "viral_label": "", "viral_score": 45 }));
        let result = shape_response(raw, SubmissionKind::Document);
        assert_eq!(result.viral_label(), "Moderate Potential");
    }

    #[test]
    fn platforms_sorted_by_suitability_with_stable_ties() {
        let result = shape_response(response(json!({})), SubmissionKind::Document);
        let names: Vec<_> = result
            .platforms_by_suitability()
            .iter()
            .map(|p| p.platform.as_str())
            .collect();
        assert_eq!(names, vec!["TikTok", "YouTube", "Instagram"]);
    }

    #[test]
    fn tiers_and_engagement_thresholds() {
        let score = |v| Score::new(v).unwrap();
        assert_eq!(ViralTier::from_score(score(80)), ViralTier::VeryHigh);
        assert_eq!(ViralTier::from_score(score(79)), ViralTier::Good);
        assert_eq!(ViralTier::from_score(score(40)), ViralTier::Moderate);
        assert_eq!(ViralTier::from_score(score(39)), ViralTier::NeedsImprovement);
        assert_eq!(EngagementLevel::from_score(score(70)), EngagementLevel::High);
        assert_eq!(EngagementLevel::from_score(score(50)), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_score(score(49)), EngagementLevel::Low);
    }
}
