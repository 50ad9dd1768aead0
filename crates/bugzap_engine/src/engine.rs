use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bugzap_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::config::ProbeConfig;
use crate::feedback::FeedbackClient;
use crate::payload::UploadPayload;
use crate::probe::{EndpointProber, Prober};
use crate::{EngineEvent, SubmissionId};

enum EngineCommand {
    Submit {
        submission_id: SubmissionId,
        payload: UploadPayload,
    },
    Cancel {
        submission_id: SubmissionId,
    },
    SendFeedback {
        message: String,
        email: Option<String>,
    },
    Finished {
        submission_id: SubmissionId,
    },
    Shutdown,
}

/// Runs probes and feedback calls on a background tokio runtime.
///
/// Commands go in through the handle; results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: ProbeConfig) -> io::Result<Self> {
        let feedback = FeedbackClient::new(config.clone());
        Self::with_prober(Arc::new(EndpointProber::new(config)), feedback)
    }

    pub fn with_prober(prober: Arc<dyn Prober>, feedback: FeedbackClient) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let loop_tx = cmd_tx.clone();

        thread::Builder::new()
            .name("bugzap-engine".to_string())
            .spawn(move || {
                let feedback = Arc::new(feedback);
                let mut in_flight: HashMap<SubmissionId, CancellationToken> = HashMap::new();

                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Submit {
                            submission_id,
                            payload,
                        } => {
                            let token = CancellationToken::new();
                            in_flight.insert(submission_id, token.clone());
                            let prober = prober.clone();
                            let event_tx = event_tx.clone();
                            let loop_tx = loop_tx.clone();
                            runtime.spawn(async move {
                                let result = prober.probe(&payload, &token).await;
                                let _ = event_tx.send(EngineEvent::ProbeCompleted {
                                    submission_id,
                                    result,
                                });
                                let _ = loop_tx.send(EngineCommand::Finished { submission_id });
                            });
                        }
                        EngineCommand::Cancel { submission_id } => {
                            if let Some(token) = in_flight.remove(&submission_id) {
                                engine_info!("Cancelling submission {}", submission_id);
                                token.cancel();
                            }
                        }
                        EngineCommand::Finished { submission_id } => {
                            in_flight.remove(&submission_id);
                        }
                        EngineCommand::SendFeedback { message, email } => {
                            let feedback = feedback.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = feedback.send(&message, email.as_deref()).await;
                                let _ = event_tx.send(EngineEvent::FeedbackCompleted { result });
                            });
                        }
                        EngineCommand::Shutdown => break,
                    }
                }

                for token in in_flight.values() {
                    token.cancel();
                }
                engine_debug!("Engine loop stopped");
                runtime.shutdown_timeout(Duration::from_secs(1));
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, submission_id: SubmissionId, payload: UploadPayload) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission_id,
            payload,
        });
    }

    pub fn cancel(&self, submission_id: SubmissionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { submission_id });
    }

    pub fn send_feedback(&self, message: impl Into<String>, email: Option<String>) {
        let _ = self.cmd_tx.send(EngineCommand::SendFeedback {
            message: message.into(),
            email,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}
