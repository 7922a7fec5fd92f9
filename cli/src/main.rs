use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use retrotb::{build, ControlFile, ControlFuturebase};

/// Builds an endgame tablebase by retrograde analysis from a control file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the JSON control file describing the configuration to build.
    control_file: PathBuf,
    /// Additional futurebase files, merged with any listed in the control file.
    #[arg(long = "futurebase")]
    futurebases: Vec<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count, default_value_t = 2)]
    verbose: u8,
    #[arg(
        long,
        help = "If set, logs will not include a timestamp",
        action = clap::ArgAction::SetTrue
    )]
    no_time: bool,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose, args.no_time);

    let json = match std::fs::read_to_string(&args.control_file) {
        Ok(s) => s,
        Err(e) => {
            log::error!("could not read {}: {e}", args.control_file.display());
            return ExitCode::FAILURE;
        }
    };
    let mut control = match ControlFile::parse(&json) {
        Ok(c) => c,
        Err(e) => {
            log::error!("malformed control file: {e}");
            return ExitCode::FAILURE;
        }
    };
    control
        .futurebases
        .extend(args.futurebases.into_iter().map(|path| ControlFuturebase { path, prune: None }));

    match build(&control) {
        Ok(report) => {
            log::info!(
                "done: {} legal positions, {} resolved wins, {} unresolved draws",
                report.legal_positions,
                report.resolved_wins,
                report.unresolved_draws
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("build failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, no_time: bool) {
    let mut builder = Builder::new();
    builder
        .filter(
            None,
            match verbose {
                0 => LevelFilter::Error,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            },
        )
        .default_format()
        .target(Target::Stdout);
    if no_time {
        builder.format_timestamp(None);
    }
    builder.init();
}
