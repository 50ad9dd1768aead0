//! Command-line surface of the `bugzap` binary.

use std::path::PathBuf;

use bugzap_engine::EngineHint;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bugzap",
    version,
    about = "Turn Unity/Unreal crash logs into actionable fixes",
    long_about = "Upload a crash log to the BugZap analysis backend and print its findings.\n\n\
                  The backend base URL comes from --api-url, BUGZAP_API_URL \
                  (or BUGZAP_API_BASE_URL), or api_base_url in bugzap.ron."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// RON config file (default: ./bugzap.ron when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL; wins over the environment and the config file.
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q errors only, -qq silent).
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Also write logs to this file.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn verbosity(&self) -> i8 {
        let verbose = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let quiet = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        verbose.saturating_sub(quiet)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a crash log (.log, .txt, .crash, ...).
    Analyze(AnalyzeArgs),

    /// Send feedback about an analysis to the backend.
    Feedback(FeedbackArgs),

    /// Show the effective base URL and the routes that would be probed.
    Routes,
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Crash log to upload.
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Engine that produced the log: unity, unreal or auto.
    #[arg(long, value_name = "ENGINE", default_value = "unity")]
    pub engine: EngineHint,

    /// Save the report as bugzap_crash_report_<millis>.json in this directory.
    #[arg(long = "save-dir", value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Print the first lines of the log before uploading.
    #[arg(long)]
    pub preview: bool,

    /// Print the backend's JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct FeedbackArgs {
    /// Features, accuracy, bugs: anything.
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Optional contact address.
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,
}
