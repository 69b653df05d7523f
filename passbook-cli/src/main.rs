use clap::Parser;
use passbook_core::Mode;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod config;
mod output;
mod run;

use output::OutputFormat;
use run::Settings;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PASSBOOK_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "passbook",
    version,
    long_version = LONG_VERSION,
    about = "Extract transactions from bank statements"
)]
struct Cli {
    /// Statement to read (.pdf, or a .json page dump)
    input: PathBuf,

    /// Where to write the transactions
    output: PathBuf,

    /// auto, standard, or a bank: axis, yesbank, kotak, jk, hdfc
    #[arg(long, default_value = "auto")]
    mode: Mode,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Output format (default from config, else json)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (default: ~/.passbook/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{e:#}"), "could not load config");
            println!("transactions:0");
            return ExitCode::FAILURE;
        }
    };

    let settings = Settings {
        mode: cli.mode,
        format: cli.format.unwrap_or(cfg.output.format),
        write_empty: cfg.output.write_empty,
        extractor: cfg.extractor(),
    };

    let outcome = run::process(&cli.input, &cli.output, &settings);
    println!("transactions:{}", outcome.count());
    ExitCode::from(outcome.exit_code())
}
