use std::fmt::Write as _;

use bugzap_core::{AppViewModel, EngineHint, FeedbackStatus, Phase, ReportView};

/// Renders the current view as plain text for stdout.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    if let Some(report) = &view.report {
        render_report(&mut out, report);
    }

    if let Some(error) = &view.error {
        section(&mut out, "Error");
        let _ = writeln!(out, "{error}");
    }

    match &view.saved {
        Some(Ok(path)) => {
            let _ = writeln!(out, "\nSaved report to {}", path.display());
        }
        Some(Err(err)) => {
            let _ = writeln!(out, "\nCould not save report: {err}");
        }
        None => {}
    }

    if let Some(status) = &view.feedback {
        let _ = writeln!(out, "{}", feedback_line(status));
    }

    out
}

/// Shown on stderr before upload when `--preview` is set.
pub fn render_preview(view: &AppViewModel) -> Option<String> {
    let preview = view.preview.as_ref()?;
    let name = view.file_name.as_deref().unwrap_or("log");
    Some(format!("--- {name} (first lines) ---\n{preview}\n---"))
}

/// One stderr line for a phase change worth narrating, if any.
pub fn status_line(previous: Phase, view: &AppViewModel) -> Option<String> {
    match (previous, view.phase) {
        (Phase::Submitting { .. }, Phase::Submitting { .. }) => None,
        (_, Phase::Submitting { .. }) => Some(format!(
            "Analyzing {} (engine: {})...",
            view.file_name.as_deref().unwrap_or("log"),
            engine_label(view.engine_hint)
        )),
        (Phase::Submitting { .. }, Phase::Idle) => Some("Analysis cancelled.".to_string()),
        _ => None,
    }
}

fn engine_label(hint: EngineHint) -> &'static str {
    match hint {
        EngineHint::Unity => "Unity",
        EngineHint::Unreal => "Unreal",
        EngineHint::Auto => "auto-detect",
    }
}

fn render_report(out: &mut String, report: &ReportView) {
    section(out, "Summary");
    let _ = writeln!(out, "{}", report.summary);
    let _ = write!(out, "Engine: {}", report.engine);
    if let Some(percent) = report.confidence_percent {
        let _ = write!(out, " | Confidence: {percent}%");
    }
    out.push('\n');

    if let Some(root_cause) = &report.root_cause {
        section(out, "Root Cause");
        let _ = writeln!(out, "{root_cause}");
    }
    bullets(out, "Evidence", &report.evidence);
    numbered(out, "Recommendations", &report.recommendations);
    bullets(out, "Detected Signatures", &report.detected_signatures);
    if let Some(patch) = &report.code_patch {
        section(out, "Example Patch");
        let _ = writeln!(out, "{}", patch.trim_end());
    }

    let _ = writeln!(out, "\nSource: {}", report.source_url);
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn bullets(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section(out, title);
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn numbered(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section(out, title);
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", index + 1);
    }
}

fn feedback_line(status: &FeedbackStatus) -> String {
    match status {
        FeedbackStatus::Sending => "Sending feedback...".to_string(),
        FeedbackStatus::Sent => "Thanks! Your feedback was sent.".to_string(),
        FeedbackStatus::Failed(err) => format!("Feedback failed: {err}"),
    }
}
