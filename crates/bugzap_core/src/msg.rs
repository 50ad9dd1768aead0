use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked a crash log; `contents` are its raw bytes.
    LogSelected { path: PathBuf, contents: Vec<u8> },
    /// User switched the engine selector.
    EngineHintChanged(crate::EngineHint),
    /// User asked for an analysis of the selected log.
    SubmitClicked,
    /// User abandoned the in-flight analysis.
    CancelClicked,
    /// User cleared the selection, result and error.
    ResetClicked,
    /// User asked to save the current report as JSON.
    SaveClicked,
    /// User sent free-text feedback.
    FeedbackSubmitted {
        message: String,
        email: Option<String>,
    },
    /// Engine accepted a backend response.
    AnalysisSucceeded {
        submission_id: crate::SubmissionId,
        report: crate::AnalysisReport,
    },
    /// Engine gave up: configuration, backend or exhaustion error.
    AnalysisFailed {
        submission_id: crate::SubmissionId,
        message: String,
    },
    /// Report file written (or not).
    ReportSaved(Result<PathBuf, String>),
    /// Feedback delivered (or not).
    FeedbackDone(Result<(), String>),
    /// UI/render tick to coalesce rendering.
    Tick,
}
