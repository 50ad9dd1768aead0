//! BugZap core: pure submission state machine and view-model helpers.
mod effect;
mod msg;
mod report;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use report::AnalysisReport;
pub use state::{AppState, EngineHint, FeedbackStatus, Phase, SelectedLog, SubmissionId};
pub use update::update;
pub use view_model::{log_preview, AppViewModel, ReportView, PREVIEW_LINES};
