use std::fmt;

use crate::feedback::FeedbackError;
use crate::result::AnalysisResult;

pub type SubmissionId = u64;

/// Longest slice of a backend error body carried into [`ProbeError::Backend`].
pub const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ProbeCompleted {
        submission_id: SubmissionId,
        result: Result<ProbeSuccess, ProbeError>,
    },
    FeedbackCompleted {
        result: Result<serde_json::Value, FeedbackError>,
    },
}

/// The accepted response of a probe and the URL that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSuccess {
    pub url: String,
    pub result: AnalysisResult,
}

/// One candidate URL tried during a probe and why it was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub url: String,
    pub outcome: AttemptOutcome,
}

/// Soft misses: each one advances the probe to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    NotFound,
    /// 3xx; redirects are never followed.
    Redirect { status: u16, location: Option<String> },
    NotJson { content_type: Option<String> },
    WrongShape,
    MalformedBody(String),
    Transport(String),
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::NotFound => write!(f, "404 not found"),
            AttemptOutcome::Redirect {
                status,
                location: Some(location),
            } => write!(f, "redirect {status} to {location}"),
            AttemptOutcome::Redirect {
                status,
                location: None,
            } => write!(f, "redirect {status}"),
            AttemptOutcome::NotJson {
                content_type: Some(ct),
            } => write!(f, "non-JSON response ({ct})"),
            AttemptOutcome::NotJson { content_type: None } => {
                write!(f, "non-JSON response (no content type)")
            }
            AttemptOutcome::WrongShape => write!(f, "JSON without a summary field"),
            AttemptOutcome::MalformedBody(msg) => write!(f, "malformed body: {msg}"),
            AttemptOutcome::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("Missing API base URL: set BUGZAP_API_URL (or BUGZAP_API_BASE_URL) or api_base_url in the config file.")]
    MissingBaseUrl,
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("no candidate routes configured")]
    NoCandidates,
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("HTTP {status} from {url}: {body}")]
    Backend {
        status: u16,
        url: String,
        body: String,
    },
    #[error("{}", exhausted_message(.attempts))]
    Exhausted { attempts: Vec<ProbeAttempt> },
    #[error("analysis cancelled")]
    Cancelled,
}

impl ProbeError {
    /// URLs tried before giving up, in the order they were tried.
    pub fn attempted_urls(&self) -> Vec<&str> {
        match self {
            ProbeError::Exhausted { attempts } => {
                attempts.iter().map(|a| a.url.as_str()).collect()
            }
            ProbeError::Backend { url, .. } => vec![url.as_str()],
            _ => Vec::new(),
        }
    }
}

fn exhausted_message(attempts: &[ProbeAttempt]) -> String {
    let mut msg = String::from("No crash-analysis endpoint responded successfully.\nTried:");
    for attempt in attempts {
        msg.push_str("\n- ");
        msg.push_str(&attempt.url);
    }
    msg
}

/// Cuts `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_lists_every_url_in_order() {
        let err = ProbeError::Exhausted {
            attempts: vec![
                ProbeAttempt {
                    url: "https://a/x".into(),
                    outcome: AttemptOutcome::NotFound,
                },
                ProbeAttempt {
                    url: "https://a/y".into(),
                    outcome: AttemptOutcome::WrongShape,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "No crash-analysis endpoint responded successfully.\nTried:\n- https://a/x\n- https://a/y"
        );
        assert_eq!(err.attempted_urls(), vec!["https://a/x", "https://a/y"]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 300), "short");
    }
}
