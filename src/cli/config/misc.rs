use serde::Deserialize;

#[derive(Deserialize, Default, Debug, Clone)]
pub struct MiscConfig {
    /// Only show the instrumented command, don't run it
    pub dry_run: Option<bool>,
}
