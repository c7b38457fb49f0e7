use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct CoverageConfig {
    /// Coverage report output path
    pub output_path: Option<String>,
    /// lcov- or html-based coverage report
    pub format: Option<String>,
    /// Custom grcov binary location
    pub grcov_binary: Option<String>,
}
