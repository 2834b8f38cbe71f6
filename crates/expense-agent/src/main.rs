//! Submits expense claims from the bundled (or configured) expenses file.

#[macro_use]
extern crate tracing;

use std::io::{self as std_io, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use expense_agent::{AzureConnector, Config, Console, Orchestrator, Outcome, Stage};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, BufReader};

const EXIT_CONFIG_ERROR: u8 = 2;

/// Standard output that hides the spinner while writing.
struct SpinnerAwareStdout(ProgressBar);

impl Write for SpinnerAwareStdout {
    fn write(&mut self, buf: &[u8]) -> std_io::Result<usize> {
        self.0.suspend(|| std_io::stdout().write(buf))
    }

    fn flush(&mut self) -> std_io::Result<()> {
        self.0.suspend(|| std_io::stdout().flush())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(err) = dotenvy::dotenv() {
        // A missing `.env` file is fine.
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std_io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    debug!("using config: {config:?}");

    if std_io::stdout().is_terminal() {
        print!("\x1B[2J\x1B[1;1H");
        std_io::stdout().flush().ok();
    }

    let progress_bar = ProgressBar::hidden();
    match ProgressStyle::with_template("{spinner} {wide_msg}") {
        Ok(style) => {
            progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        Err(err) => warn!("invalid progress style: {err}"),
    }

    let console = Console::from_writer(SpinnerAwareStdout(progress_bar.clone()));
    let orchestrator = Orchestrator::new(config, AzureConnector).on_stage({
        let progress_bar = progress_bar.clone();
        move |stage| match stage {
            Stage::PromptCollected => {
                progress_bar.set_draw_target(ProgressDrawTarget::stderr());
                progress_bar.set_message("🤔 Thinking...");
                progress_bar.enable_steady_tick(Duration::from_millis(100));
            }
            Stage::ResponseReceived | Stage::Failed => {
                progress_bar.finish_and_clear();
            }
            _ => {}
        }
    });

    let mut stdin = BufReader::new(io::stdin());
    match orchestrator.run(&mut stdin, &console).await {
        Ok(Outcome::ResponseReceived(_)) => ExitCode::SUCCESS,
        Ok(Outcome::Failed(err)) => {
            debug!("run ended with a remote failure: {err:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            progress_bar.finish_and_clear();
            eprintln!("{}", err.to_string().bright_red());
            ExitCode::FAILURE
        }
    }
}
