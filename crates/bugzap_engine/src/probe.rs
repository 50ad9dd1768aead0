use bugzap_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Response, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::ProbeConfig;
use crate::payload::UploadPayload;
use crate::result::AnalysisResult;
use crate::types::{truncate_chars, MAX_ERROR_BODY_CHARS};
use crate::{AttemptOutcome, ProbeAttempt, ProbeError, ProbeSuccess};

#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Posts `payload` to each candidate route in order until one is accepted.
    async fn probe(
        &self,
        payload: &UploadPayload,
        cancel: &CancellationToken,
    ) -> Result<ProbeSuccess, ProbeError>;
}

/// What a single candidate told us.
enum Step {
    Accept(AnalysisResult),
    Miss(AttemptOutcome),
    Stop(ProbeError),
}

#[derive(Debug, Clone)]
pub struct EndpointProber {
    config: ProbeConfig,
}

impl EndpointProber {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Full URLs in probe order: trimmed base + candidate path, concatenated verbatim.
    pub fn candidate_urls(&self) -> Result<Vec<String>, ProbeError> {
        let base = self.config.resolved_base()?;
        let routes = self.config.registry.routes();
        if routes.is_empty() {
            return Err(ProbeError::NoCandidates);
        }
        Ok(routes.iter().map(|path| format!("{base}{path}")).collect())
    }

    fn build_client(&self) -> Result<Client, ProbeError> {
        Client::builder()
            .connect_timeout(self.config.settings.connect_timeout)
            .timeout(self.config.settings.request_timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|err| ProbeError::Client(err.to_string()))
    }

    async fn try_candidate(&self, client: &Client, url: &str, payload: &UploadPayload) -> Step {
        let response = match client
            .post(url)
            .header(ACCEPT, "application/json")
            .multipart(payload.to_form(&self.config.aliases))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return Step::Miss(AttemptOutcome::Transport(describe_reqwest_error(&err))),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Step::Miss(AttemptOutcome::NotFound);
        }
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string());
            return Step::Miss(AttemptOutcome::Redirect {
                status: status.as_u16(),
                location,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

        if !status.is_success() {
            let body = match self.read_body(response).await {
                Ok(body) => body,
                Err(msg) => return Step::Miss(AttemptOutcome::MalformedBody(msg)),
            };
            return Step::Stop(ProbeError::Backend {
                status: status.as_u16(),
                url: url.to_string(),
                body: error_excerpt(status, &body, is_json),
            });
        }

        if !is_json {
            return Step::Miss(AttemptOutcome::NotJson { content_type });
        }

        let body = match self.read_body(response).await {
            Ok(body) => body,
            Err(msg) => return Step::Miss(AttemptOutcome::MalformedBody(msg)),
        };
        let value: Value = match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(err) => return Step::Miss(AttemptOutcome::MalformedBody(err.to_string())),
        };
        match AnalysisResult::from_value(value) {
            Some(result) => Step::Accept(result),
            None => Step::Miss(AttemptOutcome::WrongShape),
        }
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, String> {
        let max_bytes = self.config.settings.max_body_bytes;
        if let Some(len) = response.content_length() {
            if len > max_bytes {
                return Err(format!("response too large ({len} > {max_bytes} bytes)"));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| describe_reqwest_error(&err))?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(format!("response exceeded {max_bytes} bytes"));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Prober for EndpointProber {
    async fn probe(
        &self,
        payload: &UploadPayload,
        cancel: &CancellationToken,
    ) -> Result<ProbeSuccess, ProbeError> {
        let urls = self.candidate_urls()?;
        let client = self.build_client()?;
        let total = urls.len();
        let mut attempts = Vec::with_capacity(total);

        for (index, url) in urls.into_iter().enumerate() {
            if cancel.is_cancelled() {
                engine_info!("Probe cancelled before {}", url);
                return Err(ProbeError::Cancelled);
            }
            engine_debug!("Probe {}/{}: POST {}", index + 1, total, url);

            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    engine_info!("Probe cancelled while waiting on {}", url);
                    return Err(ProbeError::Cancelled);
                }
                step = self.try_candidate(&client, &url, payload) => step,
            };

            match step {
                Step::Accept(result) => {
                    engine_info!("Accepted analysis from {} after {} attempt(s)", url, index + 1);
                    return Ok(ProbeSuccess { url, result });
                }
                Step::Stop(err) => {
                    engine_warn!("Backend error, probe stopped: {}", err);
                    return Err(err);
                }
                Step::Miss(outcome) => {
                    engine_debug!("Skipping {}: {}", url, outcome);
                    attempts.push(ProbeAttempt { url, outcome });
                }
            }
        }

        engine_warn!("No candidate route accepted after {} attempt(s)", attempts.len());
        Err(ProbeError::Exhausted { attempts })
    }
}

/// Error body as shown to the user: compact JSON when possible, at most 300 chars.
fn error_excerpt(status: StatusCode, body: &[u8], is_json: bool) -> String {
    let text = String::from_utf8_lossy(body);
    let shown = if is_json {
        serde_json::from_str::<Value>(&text)
            .map(|value| value.to_string())
            .unwrap_or_else(|_| text.into_owned())
    } else {
        text.into_owned()
    };
    if shown.trim().is_empty() {
        return status.canonical_reason().unwrap_or_default().to_string();
    }
    truncate_chars(&shown, MAX_ERROR_BODY_CHARS)
}

pub(crate) fn describe_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return format!("timed out: {err}");
    }
    if err.is_connect() {
        return format!("connection failed: {err}");
    }
    err.to_string()
}
