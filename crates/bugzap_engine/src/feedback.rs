use bugzap_logging::{engine_info, engine_warn};
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use serde_json::Value;

use crate::config::{ProbeConfig, FEEDBACK_PATH};
use crate::probe::describe_reqwest_error;
use crate::types::{truncate_chars, MAX_ERROR_BODY_CHARS};
use crate::ProbeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Config(#[from] ProbeError),
    #[error("feedback request failed: {0}")]
    Network(String),
    #[error("feedback rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("feedback response was not JSON: {0}")]
    InvalidResponse(String),
}

/// Posts free-text feedback to `{BASE}/api/feedback`.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    config: ProbeConfig,
}

impl FeedbackClient {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub async fn send(&self, message: &str, email: Option<&str>) -> Result<Value, FeedbackError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }
        let url = format!("{}{}", self.config.resolved_base()?, FEEDBACK_PATH);

        let client = reqwest::Client::builder()
            .connect_timeout(self.config.settings.connect_timeout)
            .timeout(self.config.settings.request_timeout)
            .build()
            .map_err(|err| FeedbackError::Network(err.to_string()))?;

        let form = Form::new()
            .text("message", message.to_string())
            .text("user_email", email.map(str::trim).unwrap_or_default().to_string());

        let response = client
            .post(&url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|err| FeedbackError::Network(describe_reqwest_error(&err)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| FeedbackError::Network(describe_reqwest_error(&err)))?;

        if !status.is_success() {
            engine_warn!("Feedback rejected by {}: {}", url, status);
            return Err(FeedbackError::Rejected {
                status: status.as_u16(),
                body: truncate_chars(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        engine_info!("Feedback delivered to {}", url);
        serde_json::from_str(&text).map_err(|err| FeedbackError::InvalidResponse(err.to_string()))
    }
}
