use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Default)]
pub struct ReportArgs {
    /// Project directory containing the instrumentation artifacts
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

    /// Path to a TOML config file
    #[arg(long, help = "Path to TOML config file")]
    pub config: Option<PathBuf>,
}
