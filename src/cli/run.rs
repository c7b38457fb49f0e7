use clap::{ArgAction, Args};
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Project directory containing the Cargo.toml to run against
    #[arg(short = 'd', long, help = "Project working directory")]
    pub working_dir: Option<PathBuf>,

    /// Where the aggregated coverage report is written
    #[arg(short, long, help = "Coverage report output path")]
    pub output: Option<PathBuf>,

    /// Report format emitted by grcov
    #[arg(short, long, help = "Report format: lcov or html")]
    pub format: Option<String>,

    /// Custom grcov location
    #[arg(long, help = "Path to the grcov binary")]
    pub grcov_binary: Option<PathBuf>,

    /// Only show the instrumented command, don't run it
    #[arg(long, help = "Output the command without executing", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Path to a TOML config file
    #[arg(long, help = "Path to TOML config file")]
    pub config: Option<PathBuf>,

    /// Cargo command to wrap
    #[arg(
        help = "Cargo command to wrap, e.g. 'test --workspace' or 'run --release'",
        raw = true
    )]
    pub cargo_command: Vec<String>,
}
