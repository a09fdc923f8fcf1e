mod commands;
mod output;

use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xascalc::XasCalcError;

const DEFAULT_LOG_FILTER: &str = "warn";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match parse_and_dispatch(args, &mut out) {
        Ok(()) => 0,
        Err(CliError::Usage(message)) => {
            eprint!("{message}");
            2
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

fn parse_and_dispatch(args: Vec<String>, out: &mut impl Write) -> Result<(), CliError> {
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(out, "{err}").map_err(anyhow::Error::from)?;
                return Ok(());
            }
            _ => return Err(CliError::Usage(err.to_string())),
        },
    };

    init_tracing(cli.log_level.as_deref());

    match cli.command {
        CliCommand::Calc(args) => commands::run_calc_command(&args, out),
        CliCommand::Batch(args) => commands::run_batch_command(&args, out),
        CliCommand::Elements(args) => commands::run_elements_command(&args, out),
    }
}

/// Logs go to stderr so JSON on stdout stays machine readable.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "xascalc",
    version,
    about = "X-ray absorption and transmission of layered samples near an absorption edge"
)]
struct Cli {
    /// Log filter, e.g. `info` or `xascalc=debug` (defaults to RUST_LOG, then `warn`)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compute absorption around one edge
    Calc(commands::CalcArgs),
    /// Compute every edge listed in a JSON request
    Batch(commands::BatchArgs),
    /// List element symbols and atomic numbers
    Elements(commands::ElementsArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Compute(#[from] XasCalcError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}
