mod coverage;
mod misc;
mod target;

pub use coverage::CoverageConfig;
pub use misc::MiscConfig;
pub use target::TargetConfig;

use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct Config {
    /// Target configuration
    #[serde(default)]
    pub target: TargetConfig,
    /// Coverage configuration
    #[serde(default)]
    pub coverage: CoverageConfig,
    /// Miscellaneous configuration
    #[serde(default)]
    pub misc: MiscConfig,
}

pub trait ConfigMerge<T> {
    fn merge_with_config(&self, config: &Config) -> T;
}

fn merge_path(
    opt: Option<std::path::PathBuf>,
    cfg_str: Option<String>,
) -> Option<std::path::PathBuf> {
    opt.or_else(|| {
        cfg_str
            .filter(|p| !p.is_empty())
            .map(std::path::PathBuf::from)
    })
}

impl ConfigMerge<Self> for crate::cli::RunArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        Self {
            working_dir: merge_path(self.working_dir.clone(), config.target.dir.clone()),
            output: merge_path(self.output.clone(), config.coverage.output_path.clone())
                .or_else(|| Some(std::path::PathBuf::from(crate::cli::COVERAGE_OUTPUT))),
            format: self
                .format
                .clone()
                .or_else(|| config.coverage.format.clone().filter(|f| !f.is_empty())),
            grcov_binary: merge_path(
                self.grcov_binary.clone(),
                config.coverage.grcov_binary.clone(),
            ),
            dry_run: self.dry_run || config.misc.dry_run.unwrap_or(false),
            config: self.config.clone(),
            cargo_command: if self.cargo_command.is_empty() {
                config
                    .target
                    .command
                    .clone()
                    .filter(|cmd| !cmd.is_empty())
                    .unwrap_or_else(|| vec![crate::cli::DEFAULT_CARGO_COMMAND.to_string()])
            } else {
                self.cargo_command.clone()
            },
        }
    }
}

impl ConfigMerge<Self> for crate::cli::CleanArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        Self {
            working_dir: merge_path(self.working_dir.clone(), config.target.dir.clone()),
            config: self.config.clone(),
        }
    }
}

impl ConfigMerge<Self> for crate::cli::ReportArgs {
    fn merge_with_config(&self, config: &Config) -> Self {
        Self {
            working_dir: merge_path(self.working_dir.clone(), config.target.dir.clone()),
            output: merge_path(self.output.clone(), config.coverage.output_path.clone())
                .or_else(|| Some(std::path::PathBuf::from(crate::cli::COVERAGE_OUTPUT))),
            format: self
                .format
                .clone()
                .or_else(|| config.coverage.format.clone().filter(|f| !f.is_empty())),
            grcov_binary: merge_path(
                self.grcov_binary.clone(),
                config.coverage.grcov_binary.clone(),
            ),
            config: self.config.clone(),
        }
    }
}
