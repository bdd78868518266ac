use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use strata::{convert_paths, ConverterConfig};
use strata_logger::{log, set_min_severity, LogSeverity};
use tokio_util::sync::CancellationToken;

/// Decompresses region files into one raw voxel file per cell.
#[derive(Parser, Debug)]
#[command(name = "strata", version)]
struct Cli {
    /// JSON file overriding the default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long)]
    quiet: bool,

    /// Region files (.mca or .mcr) to convert
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    set_min_severity(if cli.verbose {
        LogSeverity::Debug
    } else if cli.quiet {
        LogSeverity::Warning
    } else {
        LogSeverity::Info
    });

    let config = match &cli.config {
        Some(path) => match ConverterConfig::load(path).await {
            Ok(config) => config,
            Err(e) => {
                log(
                    format!("Failed to load {}: {}", path.display(), e),
                    LogSeverity::Fatal,
                );
                return ExitCode::FAILURE;
            }
        },
        None => ConverterConfig::default(),
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log("Interrupted, finishing current cells".to_owned(), LogSeverity::Warning);
            interrupt.cancel();
        }
    });

    log("Strata init".to_owned(), LogSeverity::Info);
    let failed = convert_paths(&cli.paths, &config, cancel).await;
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
