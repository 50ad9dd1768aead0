use std::path::{Path, PathBuf};

use crate::view_model::{log_preview, AppViewModel, ReportView};
use crate::AnalysisReport;

pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineHint {
    #[default]
    Unity,
    Unreal,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting {
        submission_id: SubmissionId,
    },
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedLog {
    pub path: PathBuf,
    pub file_name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackStatus {
    Sending,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    engine_hint: EngineHint,
    selected: Option<SelectedLog>,
    phase: Phase,
    report: Option<AnalysisReport>,
    error: Option<String>,
    saved: Option<Result<PathBuf, String>>,
    feedback: Option<FeedbackStatus>,
    last_submission_id: SubmissionId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            engine_hint: self.engine_hint,
            file_name: self.selected.as_ref().map(|log| log.file_name.clone()),
            preview: self
                .selected
                .as_ref()
                .map(|log| log_preview(&String::from_utf8_lossy(&log.contents)))
                .filter(|preview| !preview.is_empty()),
            can_submit: self.can_submit(),
            busy: self.in_flight().is_some(),
            report: self.report.as_ref().map(ReportView::from_report),
            error: self.error.clone(),
            saved: self.saved.clone(),
            feedback: self.feedback.clone(),
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Succeeded | Phase::Failed)
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        match self.phase {
            Phase::Submitting { submission_id } => Some(submission_id),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && self.in_flight().is_none()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn feedback_status(&self) -> Option<&FeedbackStatus> {
        self.feedback.as_ref()
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn engine_hint(&self) -> EngineHint {
        self.engine_hint
    }

    pub(crate) fn set_engine_hint(&mut self, hint: EngineHint) {
        if self.engine_hint != hint {
            self.engine_hint = hint;
            self.mark_dirty();
        }
    }

    pub(crate) fn select_log(&mut self, path: PathBuf, contents: Vec<u8>) {
        let file_name = file_name_of(&path);
        self.selected = Some(SelectedLog {
            path,
            file_name,
            contents,
        });
        self.mark_dirty();
    }

    pub(crate) fn selected(&self) -> Option<&SelectedLog> {
        self.selected.as_ref()
    }

    /// Starts a new submission, discarding the previous outcome.
    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        self.last_submission_id += 1;
        let submission_id = self.last_submission_id;
        self.phase = Phase::Submitting { submission_id };
        self.report = None;
        self.error = None;
        self.saved = None;
        self.mark_dirty();
        submission_id
    }

    pub(crate) fn abandon_submission(&mut self) {
        self.phase = Phase::Idle;
        self.mark_dirty();
    }

    pub(crate) fn finish_with_report(&mut self, report: AnalysisReport) {
        self.phase = Phase::Succeeded;
        self.report = Some(report);
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn finish_with_error(&mut self, message: String) {
        self.phase = Phase::Failed;
        self.report = None;
        self.error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn reset(&mut self) {
        self.selected = None;
        self.phase = Phase::Idle;
        self.report = None;
        self.error = None;
        self.saved = None;
        self.mark_dirty();
    }

    pub(crate) fn record_saved(&mut self, result: Result<PathBuf, String>) {
        self.saved = Some(result);
        self.mark_dirty();
    }

    pub(crate) fn set_feedback(&mut self, status: FeedbackStatus) {
        self.feedback = Some(status);
        self.mark_dirty();
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
