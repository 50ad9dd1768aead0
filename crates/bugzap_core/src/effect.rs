use std::path::PathBuf;

use crate::{EngineHint, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitLog {
        submission_id: SubmissionId,
        path: PathBuf,
        /// Bytes read when the log was selected; the file is not read again.
        contents: Vec<u8>,
        engine_hint: EngineHint,
    },
    CancelSubmission {
        submission_id: SubmissionId,
    },
    SaveReport {
        contents: String,
    },
    SendFeedback {
        message: String,
        email: Option<String>,
    },
}
