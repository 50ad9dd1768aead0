use std::path::PathBuf;
use std::sync::mpsc;

use bugzap_core::{AnalysisReport, Effect, Msg};
use bugzap_engine::{
    report_filename, EngineEvent, EngineHandle, ProbeConfig, ProbeError, ProbeSuccess,
    ReportWriter, UploadPayload,
};
use bugzap_logging::{engine_info, engine_warn};
use chrono::Utc;

/// Executes core effects against the engine and feeds results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    report_dir: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        config: ProbeConfig,
        report_dir: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(config)?,
            report_dir,
            msg_tx,
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitLog {
                    submission_id,
                    path,
                    contents,
                    engine_hint,
                } => {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "crash.log".to_string());
                    engine_info!(
                        "SubmitLog submission_id={} file={} bytes={}",
                        submission_id,
                        file_name,
                        contents.len()
                    );
                    let payload =
                        UploadPayload::new(file_name, contents, to_engine_hint(engine_hint));
                    self.engine.submit(submission_id, payload);
                }
                Effect::CancelSubmission { submission_id } => {
                    self.engine.cancel(submission_id);
                }
                Effect::SaveReport { contents } => {
                    let writer = ReportWriter::new(self.report_dir.clone());
                    let filename = report_filename(Utc::now().timestamp_millis());
                    let result = writer
                        .save(&filename, &contents)
                        .map_err(|err| err.to_string());
                    if let Err(err) = &result {
                        engine_warn!("Failed to save report in {:?}: {}", writer.dir(), err);
                    }
                    let _ = self.msg_tx.send(Msg::ReportSaved(result));
                }
                Effect::SendFeedback { message, email } => {
                    self.engine.send_feedback(message, email);
                }
            }
        }
    }

    /// Moves every pending engine event onto the message channel.
    pub fn forward_engine_events(&self) {
        while let Some(event) = self.engine.try_recv() {
            let _ = self.msg_tx.send(map_event(event));
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ProbeCompleted {
            submission_id,
            result: Ok(success),
        } => Msg::AnalysisSucceeded {
            submission_id,
            report: to_report(success),
        },
        EngineEvent::ProbeCompleted {
            submission_id,
            result: Err(err),
        } => {
            if err != ProbeError::Cancelled {
                engine_warn!("Submission {} failed: {}", submission_id, err);
            }
            Msg::AnalysisFailed {
                submission_id,
                message: err.to_string(),
            }
        }
        EngineEvent::FeedbackCompleted { result } => {
            Msg::FeedbackDone(result.map(|_| ()).map_err(|err| err.to_string()))
        }
    }
}

fn to_report(success: ProbeSuccess) -> AnalysisReport {
    let result = success.result;
    let owned = |items: Vec<&str>| items.into_iter().map(str::to_string).collect::<Vec<_>>();
    AnalysisReport {
        source_url: success.url,
        summary: result.summary().to_string(),
        engine: result.engine().map(str::to_string),
        root_cause: result.root_cause().map(str::to_string),
        evidence: owned(result.evidence()),
        recommendations: owned(result.recommendations()),
        code_patch: result.code_patch().map(str::to_string),
        confidence: result.confidence(),
        detected_signatures: owned(result.detected_signatures()),
        raw_json: result.to_pretty_json(),
    }
}

pub(crate) fn to_engine_hint(hint: bugzap_core::EngineHint) -> bugzap_engine::EngineHint {
    match hint {
        bugzap_core::EngineHint::Unity => bugzap_engine::EngineHint::Unity,
        bugzap_core::EngineHint::Unreal => bugzap_engine::EngineHint::Unreal,
        bugzap_core::EngineHint::Auto => bugzap_engine::EngineHint::Auto,
    }
}

pub(crate) fn to_core_hint(hint: bugzap_engine::EngineHint) -> bugzap_core::EngineHint {
    match hint {
        bugzap_engine::EngineHint::Unity => bugzap_core::EngineHint::Unity,
        bugzap_engine::EngineHint::Unreal => bugzap_core::EngineHint::Unreal,
        bugzap_engine::EngineHint::Auto => bugzap_core::EngineHint::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugzap_engine::AnalysisResult;

    #[test]
    fn probe_success_becomes_display_report() {
        let result = AnalysisResult::from_value(serde_json::json!({
            "summary": "null pointer",
            "evidence": ["Player.cs:42"],
            "confidence": 0.75
        }))
        .unwrap();
        let msg = map_event(EngineEvent::ProbeCompleted {
            submission_id: 4,
            result: Ok(ProbeSuccess {
                url: "https://api.example.com/analyze-crash".into(),
                result,
            }),
        });
        match msg {
            Msg::AnalysisSucceeded {
                submission_id,
                report,
            } => {
                assert_eq!(submission_id, 4);
                assert_eq!(report.summary, "null pointer");
                assert_eq!(report.evidence, vec!["Player.cs:42".to_string()]);
                assert_eq!(report.confidence, Some(0.75));
                assert!(report.raw_json.contains("\"summary\": \"null pointer\""));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn probe_error_becomes_readable_failure() {
        let msg = map_event(EngineEvent::ProbeCompleted {
            submission_id: 1,
            result: Err(ProbeError::MissingBaseUrl),
        });
        match msg {
            Msg::AnalysisFailed { message, .. } => assert!(message.contains("BUGZAP_API_URL")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hints_map_both_ways() {
        for hint in [
            bugzap_engine::EngineHint::Unity,
            bugzap_engine::EngineHint::Unreal,
            bugzap_engine::EngineHint::Auto,
        ] {
            assert_eq!(to_engine_hint(to_core_hint(hint)), hint);
        }
    }
}
