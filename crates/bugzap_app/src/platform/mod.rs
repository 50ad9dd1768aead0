mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod render;

use clap::Parser;

use cli::{Cli, Command};

/// Parses arguments, runs one command, and returns the process exit code.
pub fn run_app() -> i32 {
    let cli = Cli::parse();
    logging::initialize(
        bugzap_logging::level_for_verbosity(cli.verbosity()),
        cli.log_file.as_deref(),
    );

    match run_command(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<i32> {
    let config = config::load_probe_config(cli.config.as_deref(), cli.api_url.as_deref())?;
    match cli.command {
        Command::Analyze(args) => app::analyze(config, args),
        Command::Feedback(args) => app::feedback(config, args),
        Command::Routes => app::routes(config),
    }
}
