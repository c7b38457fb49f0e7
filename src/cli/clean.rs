use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Debug, Default)]
pub struct CleanArgs {
    /// Project directory whose build output is scanned for artifacts
    #[arg(short = 'd', long, help = "Project working directory")]
    pub working_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, help = "Path to TOML config file")]
    pub config: Option<PathBuf>,
}
