use anyhow::{Context, Result};
use glob::glob;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extension of the counter files emitted by a `-Zprofile` instrumented binary
pub const ARTIFACT_EXTENSION: &str = "gcda";

/// Build output directory relative to the working directory
pub const OUTPUT_DIR: &str = "target";

/// Removes stale instrumentation artifacts left behind by a previous run.
///
/// Counters from an earlier run would otherwise be merged into the next
/// report, so the cleaner runs as a barrier before every launch.
#[derive(Debug, Clone)]
pub struct ArtifactCleaner {
    working_dir: PathBuf,
}

impl ArtifactCleaner {
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// Deletes every `.gcda` file under the build output directory and
    /// returns the number of files removed.
    ///
    /// A missing output directory is a first run, not an error: the cleaner
    /// performs zero deletions and returns immediately. Deletion is batched;
    /// the first failed delete aborts the batch.
    ///
    /// # Errors
    /// * If the artifact glob pattern cannot be built
    /// * If any selected file could not be deleted
    pub fn clean(&self) -> Result<usize> {
        let output_dir = self.working_dir.join(OUTPUT_DIR);
        if !output_dir.is_dir() {
            return Ok(0);
        }

        let stale = Self::find_artifacts(&output_dir)?;
        if stale.is_empty() {
            return Ok(0);
        }

        stale
            .par_iter()
            .map(|path| {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to delete artifact: {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(stale.len())
    }

    /// Recursively selects all instrumentation artifacts under `output_dir`
    fn find_artifacts(output_dir: &Path) -> Result<Vec<PathBuf>> {
        let pattern = output_dir.join(format!("**/*.{ARTIFACT_EXTENSION}"));
        let paths = glob(
            pattern
                .to_str()
                .with_context(|| format!("Non-UTF-8 output directory: {}", output_dir.display()))?,
        )?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect();

        Ok(paths)
    }
}
