use std::fmt::Write as _;

use crate::{
    navigation::{NavigationState, ResultSection},
    types::{AnalysisResult, DocumentAnalysis, Recommendation, VideoAnalysis},
};

/// Format seconds as M:SS
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a byte count with a 1024 base, e.g. `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Format a count with thousands separators, e.g. `12,000`
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

/// Render the section selected in `nav` as human-readable markdown
pub fn format_result_readable(result: &AnalysisResult, nav: &NavigationState) -> String {
    match nav.active_section {
        ResultSection::Summarize => match result {
            AnalysisResult::Video(video) => format_video_summary(video, nav),
            AnalysisResult::Document(doc) => format_document_summary(doc),
        },
        ResultSection::Viral => format_viral(result),
        ResultSection::Recommendation => format_recommendation(result),
    }
}

fn format_video_summary(video: &VideoAnalysis, nav: &NavigationState) -> String {
    let meta = &video.video_metadata;
    let mut output = String::new();

    let _ = writeln!(output, "# {}\n", meta.title);
    let _ = write!(
        output,
        "**Channel:** {} | **Duration:** {}",
        meta.channel_name,
        format_duration(meta.duration_seconds)
    );
    if let Some(views) = meta.view_count {
        let _ = write!(output, " | **Views:** {}", format_count(views));
    }
    output.push_str("\n\n");

    output.push_str("## Summary\n\n");
    output.push_str(&video.summary);
    output.push_str("\n\n");

    if !video.timeline.is_empty() {
        output.push_str("## Timeline\n\n");
        for (i, item) in video.timeline.iter().enumerate() {
            if nav.is_timeline_expanded(i) {
                let _ = writeln!(output, "### [{}]\n\n{}\n", item.timestamp_label, item.summary);
            } else {
                let _ = writeln!(output, "### [{}] …", item.timestamp_label);
            }
        }
        output.push('\n');
    }

    output
}

fn format_document_summary(doc: &DocumentAnalysis) -> String {
    let mut output = String::new();

    output.push_str("# Document Analysis\n\n");
    if let Some(info) = &doc.document_info {
        let _ = writeln!(
            output,
            "**Type:** {} | **Reading Time:** {} | **Complexity:** {}\n",
            info.document_type, info.reading_time, info.complexity
        );
    }
    if let Some(words) = doc.word_count {
        let _ = writeln!(output, "**Words:** {}\n", format_count(words));
    }

    output.push_str("## Summary\n\n");
    output.push_str(&doc.summary);
    output.push_str("\n\n");

    if !doc.key_points.is_empty() {
        output.push_str("## Key Points\n\n");
        for (i, point) in doc.key_points.iter().enumerate() {
            let _ = writeln!(output, "{}. {}", i + 1, point);
        }
        output.push('\n');
    }

    output
}

fn format_viral(result: &AnalysisResult) -> String {
    let mut output = String::new();
    let engagement = result.engagement_level();

    output.push_str("# Viral Analysis\n\n");
    let _ = writeln!(
        output,
        "**Score:** {}/100 | **Potential:** {}\n",
        result.viral_score(),
        result.viral_label()
    );
    let _ = writeln!(
        output,
        "**Emotional Engagement:** {} ({})\n",
        engagement.label(),
        engagement.description()
    );

    if !result.viral_explanation().is_empty() {
        output.push_str("## Why does this content have viral potential?\n\n");
        output.push_str(result.viral_explanation());
        output.push_str("\n\n");
    }

    output
}

fn format_recommendation(result: &AnalysisResult) -> String {
    let rec: &Recommendation = result.recommendation();
    let mut output = String::new();

    let _ = writeln!(output, "# {}\n", rec.title);
    let _ = writeln!(
        output,
        "**Audience:** {} | **Style:** {} | **Estimated Score:** {}/100\n",
        rec.target_audience, rec.content_style, rec.estimated_viral_score
    );

    output.push_str("## Structure\n\n");
    for (label, text) in [
        ("Hook", &rec.structure.hook),
        ("Introduction", &rec.structure.introduction),
        ("Main Content", &rec.structure.main_content),
        ("Call to Action", &rec.structure.call_to_action),
    ] {
        if !text.is_empty() {
            let _ = writeln!(output, "- **{}:** {}", label, text);
        }
    }
    output.push('\n');

    if !rec.pro_tips.is_empty() {
        output.push_str("## Pro Tips\n\n");
        for tip in &rec.pro_tips {
            let _ = writeln!(output, "• {}", tip);
        }
        output.push('\n');
    }

    let platforms = result.platforms_by_suitability();
    if !platforms.is_empty() {
        output.push_str("## Platforms\n\n");
        for platform in platforms {
            let _ = writeln!(
                output,
                "### {} ({}/100)\n\n{}\n",
                platform.platform, platform.suitability_score, platform.reasoning
            );
            for tip in &platform.optimization_tips {
                let _ = writeln!(output, "• {}", tip);
            }
            if !platform.optimization_tips.is_empty() {
                output.push('\n');
            }
        }
    }

    output
}
