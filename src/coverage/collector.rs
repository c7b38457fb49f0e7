use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::coverage::grcov::{GrcovTool, ReportFormat};
use crate::system_utils::ensure_parent_dir;

/// Coverage settings attached to a run configuration.
///
/// Constructed from the raw `[coverage]` config section; a section with an
/// unrecognized report format does not produce a record at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    pub output_path: Option<PathBuf>,
    pub format: ReportFormat,
}

impl CoverageRecord {
    /// Builds a record from raw config values. Returns `None` when the
    /// section is not of the recognized shape (unknown report format).
    pub fn from_section(output_path: Option<&str>, format: Option<&str>) -> Option<Self> {
        let format = match format {
            Some(raw) => raw.parse::<ReportFormat>().ok()?,
            None => ReportFormat::default(),
        };
        Some(Self {
            output_path: output_path.filter(|p| !p.is_empty()).map(PathBuf::from),
            format,
        })
    }
}

/// Settings describing how the supervised process was launched
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub working_dir: PathBuf,
}

/// The run's saved configuration, as far as collection is concerned
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: Option<RunnerSettings>,
    pub grcov: Option<GrcovTool>,
    pub coverage: Option<CoverageRecord>,
}

/// Execution context handed to the collector when the run terminates
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub run_config: Option<RunConfig>,
}

/// Owns a launched grcov process and its output-streaming thread.
///
/// The handle is returned to the caller directly; whoever consumes the
/// report waits on it, so two runs can never fight over a shared slot.
#[derive(Debug)]
pub struct CollectorHandle {
    child: Child,
    reader: Option<JoinHandle<()>>,
    report_path: PathBuf,
}

impl CollectorHandle {
    pub fn report_path(&self) -> &PathBuf {
        &self.report_path
    }

    /// Waits for grcov to finish and returns its exit status
    ///
    /// # Errors
    /// * If waiting on the child process fails
    pub fn wait(mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .context("Failed to wait for grcov to finish")?;
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        Ok(status)
    }
}

/// Invokes grcov against the instrumentation output of a completed run.
///
/// Collection is best-effort: the run it belongs to has already finished,
/// so every missing piece of configuration skips collection with a debug
/// trace instead of surfacing an error.
pub struct CoverageCollector;

impl CoverageCollector {
    /// Runs the resolution chain and, if every stage resolves, launches the
    /// aggregation process. Returns `None` whenever collection is skipped
    /// or the spawn fails; neither case is an error for the caller.
    pub fn collect(ctx: &RunContext) -> Option<CollectorHandle> {
        let config = Self::resolve_run_config(ctx)?;
        let settings = Self::resolve_settings(config)?;
        let tool = Self::resolve_tool(config)?;
        let record = Self::resolve_record(config);
        let output_path = Self::resolve_output_path(&record)?;

        Self::launch(tool, settings, &record, output_path)
    }

    fn resolve_run_config(ctx: &RunContext) -> Option<&RunConfig> {
        if ctx.run_config.is_none() {
            debug!("No run configuration in context, skipping coverage collection");
        }
        ctx.run_config.as_ref()
    }

    fn resolve_settings(config: &RunConfig) -> Option<&RunnerSettings> {
        if config.settings.is_none() {
            debug!("No runner settings on run configuration, skipping coverage collection");
        }
        config.settings.as_ref()
    }

    fn resolve_tool(config: &RunConfig) -> Option<&GrcovTool> {
        if config.grcov.is_none() {
            debug!("No grcov tool in toolchain settings, skipping coverage collection");
        }
        config.grcov.as_ref()
    }

    /// Resolves the coverage record, creating a default one if the run
    /// configuration carries none
    fn resolve_record(config: &RunConfig) -> CoverageRecord {
        config.coverage.clone().unwrap_or_default()
    }

    fn resolve_output_path(record: &CoverageRecord) -> Option<PathBuf> {
        if record.output_path.is_none() {
            debug!("No coverage output path configured, skipping coverage collection");
        }
        record.output_path.clone()
    }

    fn launch(
        tool: &GrcovTool,
        settings: &RunnerSettings,
        record: &CoverageRecord,
        output_path: PathBuf,
    ) -> Option<CollectorHandle> {
        if let Err(e) = ensure_parent_dir(&output_path) {
            error!("Failed to prepare coverage output location: {e:#}");
            return None;
        }

        let mut command = tool.command_line(&settings.working_dir, &output_path, record.format);
        command.stdout(Stdio::piped());

        match command.spawn() {
            Ok(mut child) => {
                let reader = child.stdout.take().map(Self::stream_output);
                Some(CollectorHandle {
                    child,
                    reader,
                    report_path: output_path,
                })
            }
            Err(e) => {
                // Collection failure never propagates to the finished run
                error!(
                    "Failed to launch {} for coverage aggregation: {e}",
                    tool.binary().display()
                );
                None
            }
        }
    }

    /// Streams the aggregation tool's stdout line by line to the debug log
    fn stream_output(stdout: std::process::ChildStdout) -> JoinHandle<()> {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => debug!("grcov: {line}"),
                    Err(_) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::tempdir;

    /// Writes a fake grcov that records each invocation next to itself
    fn fake_grcov(dir: &Path) -> PathBuf {
        let script = dir.join("grcov");
        let mut file = fs::File::create(&script).unwrap();
        file.write_all(b"#!/bin/sh\necho \"run\" >> \"$(dirname \"$0\")/calls.log\"\necho \"parsed 1 files\"\nexit 0\n")
            .unwrap();
        drop(file);

        let mut perms = fs::metadata(&script).unwrap().permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(&script, perms).unwrap();
        script
    }

    fn full_context(bin_dir: &Path, work_dir: &Path) -> RunContext {
        RunContext {
            run_config: Some(RunConfig {
                settings: Some(RunnerSettings {
                    working_dir: work_dir.to_path_buf(),
                }),
                grcov: Some(GrcovTool::from_binary(fake_grcov(bin_dir))),
                coverage: Some(CoverageRecord {
                    output_path: Some(work_dir.join("coverage/lcov.info")),
                    format: ReportFormat::Lcov,
                }),
            }),
        }
    }

    fn call_count(bin_dir: &Path) -> usize {
        fs::read_to_string(bin_dir.join("calls.log"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    #[test]
    fn test_record_from_section() {
        let record = CoverageRecord::from_section(Some("lcov.info"), Some("lcov")).unwrap();
        assert_eq!(record.output_path, Some(PathBuf::from("lcov.info")));
        assert_eq!(record.format, ReportFormat::Lcov);

        // Missing pieces still form a (default) record
        let record = CoverageRecord::from_section(None, None).unwrap();
        assert!(record.output_path.is_none());

        // Empty path counts as absent
        let record = CoverageRecord::from_section(Some(""), None).unwrap();
        assert!(record.output_path.is_none());
    }

    #[test]
    fn test_record_rejects_unknown_format() {
        assert!(CoverageRecord::from_section(Some("out"), Some("cobertura")).is_none());
    }

    #[test]
    fn test_full_resolution_launches_exactly_once() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let ctx = full_context(bin.path(), work.path());

        let handle = CoverageCollector::collect(&ctx).expect("collector should launch");
        let status = handle.wait().unwrap();
        assert!(status.success());
        assert_eq!(call_count(bin.path()), 1);
    }

    #[test]
    fn test_missing_run_config_skips() {
        let ctx = RunContext { run_config: None };
        assert!(CoverageCollector::collect(&ctx).is_none());
    }

    #[test]
    fn test_missing_settings_skips() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let mut ctx = full_context(bin.path(), work.path());
        ctx.run_config.as_mut().unwrap().settings = None;

        assert!(CoverageCollector::collect(&ctx).is_none());
        assert_eq!(call_count(bin.path()), 0);
    }

    #[test]
    fn test_missing_tool_skips() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let mut ctx = full_context(bin.path(), work.path());
        ctx.run_config.as_mut().unwrap().grcov = None;

        assert!(CoverageCollector::collect(&ctx).is_none());
        assert_eq!(call_count(bin.path()), 0);
    }

    #[test]
    fn test_missing_output_path_skips() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let mut ctx = full_context(bin.path(), work.path());
        ctx.run_config
            .as_mut()
            .unwrap()
            .coverage
            .as_mut()
            .unwrap()
            .output_path = None;

        assert!(CoverageCollector::collect(&ctx).is_none());
        assert_eq!(call_count(bin.path()), 0);
    }

    #[test]
    fn test_absent_record_defaults_and_skips_on_path() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let mut ctx = full_context(bin.path(), work.path());
        // Record gets created on the fly, but the default has no output path
        ctx.run_config.as_mut().unwrap().coverage = None;

        assert!(CoverageCollector::collect(&ctx).is_none());
        assert_eq!(call_count(bin.path()), 0);
    }

    #[test]
    fn test_spawn_failure_is_swallowed() {
        let work = tempdir().unwrap();
        let ctx = RunContext {
            run_config: Some(RunConfig {
                settings: Some(RunnerSettings {
                    working_dir: work.path().to_path_buf(),
                }),
                grcov: Some(GrcovTool::from_binary("/nonexistent/grcov")),
                coverage: Some(CoverageRecord {
                    output_path: Some(work.path().join("lcov.info")),
                    format: ReportFormat::Lcov,
                }),
            }),
        };

        // No panic, no error, just a skipped collection
        assert!(CoverageCollector::collect(&ctx).is_none());
    }

    #[test]
    fn test_output_parent_dir_is_created() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let ctx = full_context(bin.path(), work.path());

        let handle = CoverageCollector::collect(&ctx).unwrap();
        assert!(handle.report_path().parent().unwrap().is_dir());
        handle.wait().unwrap();
    }
}
