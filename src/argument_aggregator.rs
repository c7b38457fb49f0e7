use crate::cli::{CleanArgs, Config, ConfigMerge, ReportArgs, RunArgs};
use anyhow::{bail, Context, Result};
use std::{env, fs, path::PathBuf};

static DEFAULT_CONFIG: &str = "covor_cfg.toml";

/// Loads the optional TOML config once and merges it under the CLI
/// arguments of each subcommand (explicit arguments always win)
#[derive(Debug)]
pub struct ArgumentAggregator {
    config: Option<Config>,
    default_config_path: PathBuf,
}

impl Default for ArgumentAggregator {
    fn default() -> Self {
        let default_path = env::current_dir().unwrap_or_default().join(DEFAULT_CONFIG);
        Self {
            config: None,
            default_config_path: default_path,
        }
    }
}

impl ArgumentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config from the provided path
    ///
    /// # Errors
    /// * If the config file cannot be read or parsed
    pub fn load(&mut self, config_path: Option<&PathBuf>) -> Result<()> {
        let path = config_path.unwrap_or(&self.default_config_path);
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            self.config = Some(
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            );
        } else if config_path.is_some() {
            bail!("Config file not found: {}", path.display());
        }
        Ok(())
    }

    /// Merge the provided run arguments with the config
    pub fn merge_run_args(&self, args: &RunArgs) -> RunArgs {
        args.merge_with_config(&self.config.clone().unwrap_or_default())
    }

    /// Merge the provided clean arguments with the config
    pub fn merge_clean_args(&self, args: &CleanArgs) -> CleanArgs {
        args.merge_with_config(&self.config.clone().unwrap_or_default())
    }

    /// Merge the provided report arguments with the config
    pub fn merge_report_args(&self, args: &ReportArgs) -> ReportArgs {
        args.merge_with_config(&self.config.clone().unwrap_or_default())
    }
}
