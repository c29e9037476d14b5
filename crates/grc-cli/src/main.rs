//! # grc CLI entry point
//!
//! Parses command-line arguments, loads the snapshot, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grc_cli::posture::{run_gaps, run_scorecard, GapsArgs, ScorecardArgs};
use grc_cli::remediation::{run_remediation, RemediationArgs};
use grc_cli::{OutputFormat, Session};

/// Compliance posture reports over a GRC snapshot.
#[derive(Parser, Debug)]
#[command(name = "grc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON or YAML snapshot of the control library and remediation data.
    #[arg(long, env = "GRC_SNAPSHOT")]
    snapshot: PathBuf,

    /// Compute as of this date (YYYY-MM-DD) instead of the system clock.
    #[arg(long, global = true)]
    today: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compliance scorecard per framework.
    Scorecard(ScorecardArgs),

    /// Requirements with no or partial control coverage.
    Gaps(GapsArgs),

    /// Remediation dashboard and tracker lifecycle.
    Remediation(RemediationArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let session = match Session::open(&cli.snapshot, cli.today.as_deref(), cli.format) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Scorecard(args) => run_scorecard(&args, &session, &mut out),
        Commands::Gaps(args) => run_gaps(&args, &session, &mut out),
        Commands::Remediation(args) => run_remediation(&args, &session, &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
