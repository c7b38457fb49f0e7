use anyhow::Result;

use crate::{
    argument_aggregator::ArgumentAggregator,
    cli::CleanArgs,
    commands::{resolve_working_dir, Command},
    coverage::cleaner::ArtifactCleaner,
};

pub struct CleanCommand<'a> {
    args: &'a CleanArgs,
    aggregator: &'a ArgumentAggregator,
}

impl<'a> CleanCommand<'a> {
    pub fn new(args: &'a CleanArgs, aggregator: &'a ArgumentAggregator) -> Self {
        Self { args, aggregator }
    }
}

impl Command for CleanCommand<'_> {
    fn execute(&self) -> Result<()> {
        let merged = self.aggregator.merge_clean_args(self.args);
        let working_dir = resolve_working_dir(merged.working_dir)?;

        let deleted = ArtifactCleaner::new(&working_dir).clean()?;
        println!("[+] Removed {deleted} stale coverage artifact(s)");
        Ok(())
    }
}
