use anyhow::{bail, Result};

use crate::{
    argument_aggregator::ArgumentAggregator,
    cargo_cmd::{CargoCmd, CargoProfile},
    cli::RunArgs,
    commands::{build_run_context, resolve_working_dir, Command},
    supervisor::{RequestedAction, Supervisor},
};

pub struct RunCommand<'a> {
    args: &'a RunArgs,
    aggregator: &'a ArgumentAggregator,
}

impl<'a> RunCommand<'a> {
    pub fn new(args: &'a RunArgs, aggregator: &'a ArgumentAggregator) -> Self {
        Self { args, aggregator }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self) -> Result<()> {
        let merged = self.aggregator.merge_run_args(self.args);
        let working_dir = resolve_working_dir(merged.working_dir.clone())?;

        let profile = CargoProfile::new(merged.cargo_command.clone());
        if !Supervisor::can_handle(RequestedAction::CollectCoverage, &profile) {
            bail!(
                "Cannot collect coverage for '{}': only the 'run' and 'test' cargo commands are supported",
                merged.cargo_command.join(" ")
            );
        }
        let verb = profile.verb().unwrap_or_default().to_string();

        let mut cmd = CargoCmd::new(&working_dir, profile.args_after_program());
        if merged.dry_run {
            // Show the command as it would be spawned, patches included
            cmd.with_env_patch(Box::new(|env| env.patched()));
            println!("{}", cmd.assemble());
            return Ok(());
        }

        let ctx = build_run_context(
            &working_dir,
            merged.grcov_binary.clone(),
            merged.output.clone(),
            merged.format.as_deref(),
        );

        println!("[*] Running instrumented 'cargo {verb}'");
        let Some(handle) = Supervisor::execute(cmd, &profile, ctx)? else {
            bail!("Coverage run was not started");
        };

        let outcome = handle.wait()?;
        match outcome.collector {
            Some(collector) => {
                println!("[*] Aggregating coverage data with grcov");
                let report_path = collector.report_path().clone();
                let status = collector.wait()?;
                if status.success() {
                    println!("[+] Coverage report written to: {}", report_path.display());
                } else {
                    println!("[-] grcov exited with: {status}");
                }
            }
            None => println!("[-] Coverage collection was skipped"),
        }

        // The coverage outcome never masks the underlying cargo result
        if !outcome.status.success() {
            bail!("cargo {verb} exited with: {}", outcome.status);
        }
        Ok(())
    }
}
