use anyhow::{bail, Result};

use crate::{
    argument_aggregator::ArgumentAggregator,
    cli::ReportArgs,
    commands::{build_run_context, resolve_working_dir, Command},
    coverage::collector::CoverageCollector,
};

pub struct ReportCommand<'a> {
    args: &'a ReportArgs,
    aggregator: &'a ArgumentAggregator,
}

impl<'a> ReportCommand<'a> {
    pub fn new(args: &'a ReportArgs, aggregator: &'a ArgumentAggregator) -> Self {
        Self { args, aggregator }
    }
}

impl Command for ReportCommand<'_> {
    fn execute(&self) -> Result<()> {
        let merged = self.aggregator.merge_report_args(self.args);
        let working_dir = resolve_working_dir(merged.working_dir)?;

        let ctx = build_run_context(
            &working_dir,
            merged.grcov_binary,
            merged.output,
            merged.format.as_deref(),
        );

        println!("[*] Aggregating coverage data with grcov");
        let Some(collector) = CoverageCollector::collect(&ctx) else {
            bail!(
                "Coverage aggregation could not start: check that grcov is installed, \
                 the report format is valid and an output path is configured"
            );
        };

        let report_path = collector.report_path().clone();
        let status = collector.wait()?;
        if !status.success() {
            bail!("grcov exited with: {status}");
        }
        println!("[+] Coverage report written to: {}", report_path.display());
        Ok(())
    }
}
