use clap::{Parser, Subcommand};

mod clean;
pub mod config;
mod constants;
mod report;
mod run;

pub use clean::CleanArgs;
pub use config::{Config, ConfigMerge, CoverageConfig, MiscConfig, TargetConfig};
pub use constants::{COVERAGE_OUTPUT, DEFAULT_CARGO_COMMAND};
pub use report::ReportArgs;
pub use run::RunArgs;

/// Command-line interface for the cargo coverage orchestrator
#[derive(Parser, Debug, Clone)]
#[command(name = "Cargo Coverage Orchestrator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run an instrumented cargo command and collect coverage on exit
    Run(RunArgs),
    /// Remove stale instrumentation artifacts from the build output
    Clean(CleanArgs),
    /// Aggregate already-present instrumentation artifacts into a report
    Report(ReportArgs),
}
