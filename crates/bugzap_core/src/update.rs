use crate::{AppState, Effect, FeedbackStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LogSelected { path, contents } => {
            // Swapping files under an in-flight probe would attach its result to the wrong log.
            if state.in_flight().is_none() {
                state.select_log(path, contents);
            }
            Vec::new()
        }
        Msg::EngineHintChanged(hint) => {
            state.set_engine_hint(hint);
            Vec::new()
        }
        Msg::SubmitClicked => {
            if !state.can_submit() {
                return (state, Vec::new());
            }
            let Some((path, contents)) = state
                .selected()
                .map(|log| (log.path.clone(), log.contents.clone()))
            else {
                return (state, Vec::new());
            };
            let engine_hint = state.engine_hint();
            let submission_id = state.begin_submission();
            vec![Effect::SubmitLog {
                submission_id,
                path,
                contents,
                engine_hint,
            }]
        }
        Msg::CancelClicked => match state.in_flight() {
            Some(submission_id) => {
                state.abandon_submission();
                vec![Effect::CancelSubmission { submission_id }]
            }
            None => Vec::new(),
        },
        Msg::ResetClicked => {
            let in_flight = state.in_flight();
            state.reset();
            in_flight
                .map(|submission_id| Effect::CancelSubmission { submission_id })
                .into_iter()
                .collect()
        }
        Msg::SaveClicked => match state.report() {
            Some(report) => vec![Effect::SaveReport {
                contents: report.raw_json.clone(),
            }],
            None => Vec::new(),
        },
        Msg::FeedbackSubmitted { message, email } => {
            if message.trim().is_empty()
                || matches!(state.feedback_status(), Some(FeedbackStatus::Sending))
            {
                return (state, Vec::new());
            }
            state.set_feedback(FeedbackStatus::Sending);
            vec![Effect::SendFeedback { message, email }]
        }
        Msg::AnalysisSucceeded {
            submission_id,
            report,
        } => {
            if state.in_flight() == Some(submission_id) {
                state.finish_with_report(report);
            }
            Vec::new()
        }
        Msg::AnalysisFailed {
            submission_id,
            message,
        } => {
            if state.in_flight() == Some(submission_id) {
                state.finish_with_error(message);
            }
            Vec::new()
        }
        Msg::ReportSaved(result) => {
            state.record_saved(result);
            Vec::new()
        }
        Msg::FeedbackDone(result) => {
            state.set_feedback(match result {
                Ok(()) => FeedbackStatus::Sent,
                Err(message) => FeedbackStatus::Failed(message),
            });
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
