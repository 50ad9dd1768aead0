use std::path::PathBuf;

use crate::{AnalysisReport, EngineHint, FeedbackStatus, Phase};

/// Lines of the selected log shown before submission.
pub const PREVIEW_LINES: usize = 12;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub engine_hint: EngineHint,
    pub file_name: Option<String>,
    pub preview: Option<String>,
    pub can_submit: bool,
    pub busy: bool,
    pub report: Option<ReportView>,
    pub error: Option<String>,
    pub saved: Option<Result<PathBuf, String>>,
    pub feedback: Option<FeedbackStatus>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportView {
    pub summary: String,
    pub engine: String,
    /// Confidence as a rounded percentage, clamped to 0..=100.
    pub confidence_percent: Option<u8>,
    pub root_cause: Option<String>,
    pub evidence: Vec<String>,
    pub recommendations: Vec<String>,
    pub code_patch: Option<String>,
    pub detected_signatures: Vec<String>,
    pub source_url: String,
}

impl ReportView {
    pub(crate) fn from_report(report: &AnalysisReport) -> Self {
        Self {
            summary: report.summary.clone(),
            engine: report
                .engine
                .clone()
                .filter(|engine| !engine.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            confidence_percent: report
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as u8),
            root_cause: report.root_cause.clone(),
            evidence: report.evidence.clone(),
            recommendations: report.recommendations.clone(),
            code_patch: report.code_patch.clone(),
            detected_signatures: report.detected_signatures.clone(),
            source_url: report.source_url.clone(),
        }
    }
}

/// First [`PREVIEW_LINES`] lines of a log, accepting `\n` and `\r\n` endings.
pub fn log_preview(text: &str) -> String {
    text.lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}
