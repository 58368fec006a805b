//! Text report builder for CLI output.

use crate::model::AnalysisReport;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a human-readable report from an analysis result.
pub(crate) fn build_text_summary(report: &AnalysisReport) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Match score: {:.0}%", report.score));

    let matched = if report.matched_keywords.is_empty() {
        "(none)".to_string()
    } else {
        report.matched_keywords.join(", ")
    };
    lines.push(format!("Matched keywords: {matched}"));

    let missing = report.missing_keywords();
    let missing = if missing.is_empty() {
        "(none)".to_string()
    } else {
        missing.join(", ")
    };
    lines.push(format!("Missing keywords: {missing}"));

    if !report.suggestions.is_empty() {
        lines.push("Suggestions:".to_string());
        for (i, suggestion) in report.suggestions.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, suggestion));
        }
    }
    if !report.key_skills_analysis.trim().is_empty() {
        lines.push(format!("Key skills: {}", report.key_skills_analysis.trim()));
    }
    if !report.improvement_areas.trim().is_empty() {
        lines.push(format!(
            "Improvement areas: {}",
            report.improvement_areas.trim()
        ));
    }

    TextSummary { lines }
}
