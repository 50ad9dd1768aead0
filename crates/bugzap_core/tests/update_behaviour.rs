use std::path::PathBuf;
use std::sync::Once;

use bugzap_core::{
    update, AnalysisReport, AppState, Effect, EngineHint, FeedbackStatus, Msg, Phase,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(bugzap_logging::initialize_for_tests);
}

const LOG: &[u8] = b"NullReferenceException\n  at Player.Update()\n";

fn with_log(state: AppState) -> AppState {
    let (state, _) = update(
        state,
        Msg::LogSelected {
            path: PathBuf::from("logs/Editor.log"),
            contents: LOG.to_vec(),
        },
    );
    state
}

fn report(summary: &str) -> AnalysisReport {
    AnalysisReport {
        source_url: "https://api.example.com/analyze-crash".to_string(),
        summary: summary.to_string(),
        engine: Some("unity".to_string()),
        confidence: Some(0.9),
        raw_json: format!("{{\n  \"summary\": \"{summary}\"\n}}"),
        ..AnalysisReport::default()
    }
}

fn submitted() -> (AppState, u64) {
    let (state, effects) = update(with_log(AppState::new()), Msg::SubmitClicked);
    let submission_id = match effects.as_slice() {
        [Effect::SubmitLog { submission_id, .. }] => *submission_id,
        other => panic!("expected a single submit effect, got {other:?}"),
    };
    (state, submission_id)
}

#[test]
fn submit_without_log_does_nothing() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert!(!state.consume_dirty());
}

#[test]
fn submit_emits_effect_with_path_and_hint() {
    init_logging();
    let state = with_log(AppState::new());
    let (state, _) = update(state, Msg::EngineHintChanged(EngineHint::Unreal));
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(
        effects,
        vec![Effect::SubmitLog {
            submission_id: 1,
            path: PathBuf::from("logs/Editor.log"),
            contents: LOG.to_vec(),
            engine_hint: EngineHint::Unreal,
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting { submission_id: 1 });
    assert!(view.busy);
    assert!(!view.can_submit);
    assert_eq!(view.file_name.as_deref(), Some("Editor.log"));
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
    init_logging();
    let (state, _) = submitted();
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Submitting { submission_id: 1 });
}

#[test]
fn success_shows_report_and_clears_error() {
    init_logging();
    let (state, id) = submitted();
    let (mut state, _) = update(
        state,
        Msg::AnalysisSucceeded {
            submission_id: id,
            report: report("null pointer"),
        },
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Succeeded);
    assert!(view.error.is_none());
    let shown = view.report.expect("report shown");
    assert_eq!(shown.summary, "null pointer");
    assert_eq!(shown.confidence_percent, Some(90));
    assert!(state.is_settled());
    assert!(state.consume_dirty());
}

#[test]
fn failure_never_leaves_a_previous_report_on_screen() {
    init_logging();
    let (state, id) = submitted();
    let (state, _) = update(
        state,
        Msg::AnalysisSucceeded {
            submission_id: id,
            report: report("first"),
        },
    );

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(effects.len(), 1);
    assert!(state.view().report.is_none());

    let (state, _) = update(
        state,
        Msg::AnalysisFailed {
            submission_id: 2,
            message: "HTTP 500 from https://api.example.com/analyze-crash: db down".into(),
        },
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Failed);
    assert!(view.report.is_none());
    assert!(view.error.unwrap().contains("db down"));
}

#[test]
fn cancel_returns_to_idle_and_drops_late_result() {
    init_logging();
    let (state, id) = submitted();
    let (state, effects) = update(state, Msg::CancelClicked);

    assert_eq!(effects, vec![Effect::CancelSubmission { submission_id: id }]);
    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.can_submit());

    let (state, _) = update(
        state,
        Msg::AnalysisSucceeded {
            submission_id: id,
            report: report("too late"),
        },
    );
    assert_eq!(state.phase(), Phase::Idle);
    assert!(state.view().report.is_none());
}

#[test]
fn result_for_superseded_submission_is_ignored() {
    init_logging();
    let (state, first) = submitted();
    let (state, _) = update(state, Msg::CancelClicked);
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(matches!(
        effects.as_slice(),
        [Effect::SubmitLog { submission_id: 2, .. }]
    ));

    let (state, _) = update(
        state,
        Msg::AnalysisFailed {
            submission_id: first,
            message: "analysis cancelled".into(),
        },
    );
    assert_eq!(state.phase(), Phase::Submitting { submission_id: 2 });
    assert!(state.view().error.is_none());
}

#[test]
fn reset_clears_everything_and_cancels_in_flight() {
    init_logging();
    let (state, id) = submitted();
    let (state, effects) = update(state, Msg::ResetClicked);

    assert_eq!(effects, vec![Effect::CancelSubmission { submission_id: id }]);
    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(view.file_name.is_none());
    assert!(view.preview.is_none());
    assert!(!view.can_submit);
}

#[test]
fn log_cannot_be_swapped_while_submitting() {
    init_logging();
    let (state, _) = submitted();
    let (state, _) = update(
        state,
        Msg::LogSelected {
            path: PathBuf::from("other.log"),
            contents: Vec::new(),
        },
    );
    assert_eq!(state.view().file_name.as_deref(), Some("Editor.log"));
}

#[test]
fn save_emits_raw_json_only_when_report_exists() {
    init_logging();
    let (_, effects) = update(with_log(AppState::new()), Msg::SaveClicked);
    assert!(effects.is_empty());

    let (state, id) = submitted();
    let (state, _) = update(
        state,
        Msg::AnalysisSucceeded {
            submission_id: id,
            report: report("saved"),
        },
    );
    let (state, effects) = update(state, Msg::SaveClicked);
    assert_eq!(
        effects,
        vec![Effect::SaveReport {
            contents: "{\n  \"summary\": \"saved\"\n}".to_string()
        }]
    );

    let (state, _) = update(
        state,
        Msg::ReportSaved(Ok(PathBuf::from("out/bugzap_crash_report_1.json"))),
    );
    assert_eq!(
        state.view().saved,
        Some(Ok(PathBuf::from("out/bugzap_crash_report_1.json")))
    );
}

#[test]
fn feedback_is_sent_once_until_it_settles() {
    init_logging();
    let msg = || Msg::FeedbackSubmitted {
        message: "root cause was wrong".into(),
        email: None,
    };
    let (state, effects) = update(AppState::new(), msg());
    assert_eq!(
        effects,
        vec![Effect::SendFeedback {
            message: "root cause was wrong".into(),
            email: None,
        }]
    );

    let (state, effects) = update(state, msg());
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::FeedbackDone(Err("HTTP 503".into())));
    assert_eq!(
        state.view().feedback,
        Some(FeedbackStatus::Failed("HTTP 503".into()))
    );

    let (_, effects) = update(
        state,
        Msg::FeedbackSubmitted {
            message: "   ".into(),
            email: None,
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn preview_shows_first_lines_of_selected_log() {
    init_logging();
    let text: String = (1..=30).map(|n| format!("frame {n}\n")).collect();
    let (state, _) = update(
        AppState::new(),
        Msg::LogSelected {
            path: PathBuf::from("crash.txt"),
            contents: text.into_bytes(),
        },
    );

    let preview = state.view().preview.unwrap();
    assert_eq!(preview.lines().count(), 12);
    assert!(preview.ends_with("frame 12"));
}

#[test]
fn preview_tolerates_invalid_utf8_but_upload_keeps_raw_bytes() {
    init_logging();
    let contents = b"Fatal error \xff\xfe in UE4Editor\r\nstack".to_vec();
    let (state, _) = update(
        AppState::new(),
        Msg::LogSelected {
            path: PathBuf::from("UE4Minidump.log"),
            contents: contents.clone(),
        },
    );
    assert_eq!(
        state.view().preview.as_deref(),
        Some("Fatal error \u{fffd}\u{fffd} in UE4Editor\nstack")
    );

    let (_, effects) = update(state, Msg::SubmitClicked);
    match effects.as_slice() {
        [Effect::SubmitLog { contents: sent, .. }] => assert_eq!(sent, &contents),
        other => panic!("expected a single submit effect, got {other:?}"),
    }
}
