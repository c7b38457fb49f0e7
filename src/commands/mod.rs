pub mod clean;
pub mod report;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::coverage::collector::{CoverageRecord, RunConfig, RunContext, RunnerSettings};
use crate::coverage::grcov::GrcovTool;

pub trait Command {
    /// Execute the command
    ///
    /// # Errors
    /// * If the command could not be executed
    fn execute(&self) -> Result<()>;
}

/// Resolves the working directory, falling back to the current directory
///
/// # Errors
/// * If the current directory cannot be determined
pub(crate) fn resolve_working_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

/// Builds the collection context from merged arguments. Pieces that fail to
/// resolve stay `None`; the collector's resolution chain handles the misses.
pub(crate) fn build_run_context(
    working_dir: &Path,
    grcov_binary: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<&str>,
) -> RunContext {
    RunContext {
        run_config: Some(RunConfig {
            settings: Some(RunnerSettings {
                working_dir: working_dir.to_path_buf(),
            }),
            grcov: GrcovTool::find(grcov_binary).ok(),
            coverage: CoverageRecord::from_section(
                output.as_deref().and_then(Path::to_str),
                format,
            ),
        }),
    }
}
