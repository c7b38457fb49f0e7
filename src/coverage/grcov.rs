use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
};

use anyhow::Result;

use crate::system_utils::find_binary_in_path;

/// Environment variable overriding the grcov binary location
pub const GRCOV_PATH_VAR: &str = "GRCOV_PATH";

/// Structured report formats grcov can emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// lcov tracefile, consumable by genhtml and most CI services
    #[default]
    Lcov,
    /// Self-contained HTML report tree
    Html,
}

impl ReportFormat {
    /// Value passed to grcov's `-t` flag
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lcov => "lcov",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lcov" | "LCOV" => Ok(Self::Lcov),
            "html" | "HTML" => Ok(Self::Html),
            _ => Err(format!("Unknown report format: {s}")),
        }
    }
}

/// Handle to an installed grcov executable
#[derive(Debug, Clone)]
pub struct GrcovTool {
    binary: PathBuf,
}

impl GrcovTool {
    /// Locates the grcov binary: explicit path, then `GRCOV_PATH`, then PATH
    ///
    /// # Errors
    /// * If no grcov binary could be found
    pub fn find<P: Into<PathBuf>>(custom_path: Option<P>) -> Result<Self> {
        let binary = find_binary_in_path("grcov", GRCOV_PATH_VAR, custom_path)?;
        Ok(Self { binary })
    }

    pub fn from_binary<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Checks that the located binary actually executes
    pub fn is_installed(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Builds the aggregation command line for a finished run.
    ///
    /// grcov scans the working directory for `.gcda`/`.gcno` pairs, resolves
    /// sources relative to it and writes the report to `output_path`.
    pub fn command_line(
        &self,
        working_dir: &Path,
        output_path: &Path,
        format: ReportFormat,
    ) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(working_dir)
            .arg("-s")
            .arg(working_dir)
            .arg("-t")
            .arg(format.as_str())
            .arg("--branch")
            .arg("--ignore-not-existing")
            .arg("-o")
            .arg(output_path)
            .current_dir(working_dir);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("lcov".parse::<ReportFormat>().unwrap(), ReportFormat::Lcov);
        assert_eq!("HTML".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ReportFormat::Lcov.to_string(), "lcov");
        assert_eq!(ReportFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_command_line_shape() {
        let tool = GrcovTool::from_binary("/usr/bin/grcov");
        let cmd = tool.command_line(
            Path::new("/proj"),
            Path::new("/proj/lcov.info"),
            ReportFormat::Lcov,
        );

        let args: Vec<_> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "/proj");
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "lcov"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "-o" && w[1] == "/proj/lcov.info"));
        assert_eq!(cmd.get_program().to_string_lossy(), "/usr/bin/grcov");
    }

    #[test]
    fn test_missing_binary_is_not_installed() {
        let tool = GrcovTool::from_binary("/nonexistent/grcov");
        assert!(!tool.is_installed());
    }
}
