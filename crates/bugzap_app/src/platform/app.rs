use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use bugzap_core::{update, AppState, AppViewModel, FeedbackStatus, Msg, Phase};
use bugzap_engine::{EndpointProber, ProbeConfig, RouteSource};
use bugzap_logging::{engine_debug, engine_info, engine_warn};

use super::cli::{AnalyzeArgs, FeedbackArgs};
use super::effects::{to_core_hint, EffectRunner};
use super::render::{render, render_preview, status_line};

const TICK: Duration = Duration::from_millis(75);

/// Owns the core state and drives it with messages from the engine and the terminal.
struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    last_phase: Phase,
}

impl Session {
    fn new(config: ProbeConfig, report_dir: PathBuf) -> anyhow::Result<Self> {
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
        let runner = EffectRunner::new(config, report_dir, msg_tx.clone())
            .context("failed to start the analysis engine")?;
        Ok(Self {
            state: AppState::new(),
            runner,
            msg_tx,
            msg_rx,
            last_phase: Phase::Idle,
        })
    }

    fn dispatch(&mut self, msg: Msg) {
        engine_debug!("dispatch {:?}", msg_label(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;
        if changed {
            self.announce();
        }
        self.runner.run(effects);
    }

    /// Narrates phase transitions on stderr; stdout carries only the report.
    fn announce(&mut self) {
        let view = self.state.view();
        if let Some(line) = status_line(self.last_phase, &view) {
            eprintln!("{line}");
        }
        self.last_phase = view.phase;
    }

    /// Pumps engine events and queued messages until `done` holds.
    fn run_until(&mut self, done: impl Fn(&AppState) -> bool) {
        while !done(&self.state) {
            self.runner.forward_engine_events();
            match self.msg_rx.recv_timeout(TICK) {
                Ok(msg) => self.dispatch(msg),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Ctrl-C becomes a cancel message; the listener lives until the process exits.
    fn cancel_on_interrupt(&self) {
        let msg_tx = self.msg_tx.clone();
        let spawned = thread::Builder::new()
            .name("bugzap-interrupt".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        engine_warn!("Ctrl-C handling unavailable: {}", err);
                        return;
                    }
                };
                if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
                    engine_info!("Interrupted; cancelling analysis");
                    let _ = msg_tx.send(Msg::CancelClicked);
                }
            });
        if let Err(err) = spawned {
            engine_warn!("Ctrl-C handling unavailable: {}", err);
        }
    }

    fn view(&self) -> AppViewModel {
        self.state.view()
    }
}

pub(crate) fn analyze(config: ProbeConfig, args: AnalyzeArgs) -> anyhow::Result<i32> {
    let contents = fs::read(&args.log)
        .with_context(|| format!("failed to read crash log {}", args.log.display()))?;

    let report_dir = args.save_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut session = Session::new(config, report_dir)?;
    session.dispatch(Msg::LogSelected {
        path: args.log.clone(),
        contents,
    });
    session.dispatch(Msg::EngineHintChanged(to_core_hint(args.engine)));

    if args.preview {
        if let Some(preview) = render_preview(&session.view()) {
            eprintln!("{preview}");
        }
    }

    session.dispatch(Msg::SubmitClicked);
    if session.state.in_flight().is_none() {
        bail!("could not start an analysis for {}", args.log.display());
    }

    session.cancel_on_interrupt();
    session.run_until(|state| state.in_flight().is_none());

    match session.state.phase() {
        Phase::Succeeded => {}
        Phase::Idle => return Ok(1),
        Phase::Failed | Phase::Submitting { .. } => {
            eprint!("{}", render(&session.view()));
            return Ok(1);
        }
    }

    if args.save_dir.is_some() {
        session.dispatch(Msg::SaveClicked);
        session.run_until(|state| state.view().saved.is_some());
    }

    let view = session.view();
    if args.json {
        if let Some(report) = session.state.report() {
            println!("{}", report.raw_json);
        }
        if let Some(saved) = &view.saved {
            match saved {
                Ok(path) => eprintln!("Saved report to {}", path.display()),
                Err(err) => eprintln!("Could not save report: {err}"),
            }
        }
    } else {
        print!("{}", render(&view));
    }

    Ok(match view.saved {
        Some(Err(_)) => 1,
        _ => 0,
    })
}

pub(crate) fn feedback(config: ProbeConfig, args: FeedbackArgs) -> anyhow::Result<i32> {
    if args.message.trim().is_empty() {
        bail!("feedback message is empty");
    }

    let mut session = Session::new(config, PathBuf::from("."))?;
    session.dispatch(Msg::FeedbackSubmitted {
        message: args.message,
        email: args.email,
    });
    session.run_until(|state| {
        !matches!(state.feedback_status(), Some(FeedbackStatus::Sending) | None)
    });

    let view = session.view();
    print!("{}", render(&view));
    Ok(match view.feedback {
        Some(FeedbackStatus::Sent) => 0,
        _ => 1,
    })
}

pub(crate) fn routes(config: ProbeConfig) -> anyhow::Result<i32> {
    let source = match config.registry.source() {
        RouteSource::Builtin => "built-in list",
        RouteSource::ConfigFile => "config file",
        RouteSource::Override => "BUGZAP_CRASH_PATH",
    };

    match config.resolved_base() {
        Ok(base) => println!("Base URL: {base}"),
        Err(err) => println!("Base URL: not configured ({err})"),
    }
    println!("Routes ({source}):");

    let prober = EndpointProber::new(config.clone());
    match prober.candidate_urls() {
        Ok(urls) => {
            for url in urls {
                println!("  {url}");
            }
        }
        Err(_) => {
            for route in config.registry.routes() {
                println!("  {route}");
            }
        }
    }
    Ok(0)
}

fn msg_label(msg: &Msg) -> &'static str {
    match msg {
        Msg::LogSelected { .. } => "LogSelected",
        Msg::EngineHintChanged(_) => "EngineHintChanged",
        Msg::SubmitClicked => "SubmitClicked",
        Msg::CancelClicked => "CancelClicked",
        Msg::ResetClicked => "ResetClicked",
        Msg::SaveClicked => "SaveClicked",
        Msg::FeedbackSubmitted { .. } => "FeedbackSubmitted",
        Msg::AnalysisSucceeded { .. } => "AnalysisSucceeded",
        Msg::AnalysisFailed { .. } => "AnalysisFailed",
        Msg::ReportSaved(_) => "ReportSaved",
        Msg::FeedbackDone(_) => "FeedbackDone",
        Msg::Tick => "Tick",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_without_base_url_fails_cleanly() {
        let temp = tempfile::TempDir::new().unwrap();
        let log = temp.path().join("Editor.log");
        fs::write(&log, "NullReferenceException\n  at Player.Update ()\n").unwrap();

        let args = AnalyzeArgs {
            log,
            engine: bugzap_engine::EngineHint::Unity,
            save_dir: None,
            preview: false,
            json: false,
        };
        let code = analyze(ProbeConfig::default(), args).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn analyze_missing_file_is_an_error() {
        let args = AnalyzeArgs {
            log: PathBuf::from("/definitely/not/here.log"),
            engine: bugzap_engine::EngineHint::Auto,
            save_dir: None,
            preview: false,
            json: true,
        };
        let err = analyze(ProbeConfig::default(), args).unwrap_err();
        assert!(err.to_string().contains("failed to read crash log"));
    }

    #[test]
    fn feedback_without_base_url_reports_failure() {
        let args = FeedbackArgs {
            message: "great tool".into(),
            email: None,
        };
        assert_eq!(feedback(ProbeConfig::default(), args).unwrap(), 1);
    }

    #[test]
    fn blank_feedback_is_rejected_locally() {
        let args = FeedbackArgs {
            message: "   ".into(),
            email: None,
        };
        assert!(feedback(ProbeConfig::default(), args).is_err());
    }
}
