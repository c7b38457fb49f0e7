use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct TargetConfig {
    /// Project working directory
    pub dir: Option<String>,
    /// Cargo command tokens to wrap, e.g. ["test", "--workspace"]
    pub command: Option<Vec<String>>,
}
