//! BugZap engine: backend configuration, endpoint probing and report IO.
mod config;
mod engine;
mod feedback;
mod payload;
mod probe;
mod report;
mod result;
mod types;

pub use config::{
    builtin_routes, normalize_override_path, FileConfig, ProbeConfig, ProbeSettings,
    RouteRegistry, RouteSource, ENV_API_BASE_URL, ENV_API_URL, ENV_CRASH_PATH, FEEDBACK_PATH,
};
pub use engine::EngineHandle;
pub use feedback::{FeedbackClient, FeedbackError};
pub use payload::{EngineHint, FieldAliases, UploadPayload};
pub use probe::{EndpointProber, Prober};
pub use report::{report_filename, ReportError, ReportWriter};
pub use result::AnalysisResult;
pub use tokio_util::sync::CancellationToken;
pub use types::{
    AttemptOutcome, EngineEvent, ProbeAttempt, ProbeError, ProbeSuccess, SubmissionId,
    MAX_ERROR_BODY_CHARS,
};
