use anyhow::Result;
use argument_aggregator::ArgumentAggregator;
use clap::Parser;
use cli::{Cli, Commands};
use commands::{clean::CleanCommand, report::ReportCommand, run::RunCommand, Command};
use tracing_subscriber::EnvFilter;

pub mod argument_aggregator;
pub mod cargo_cmd;
pub mod cli;
pub mod commands;
pub mod coverage;
pub mod supervisor;
pub mod system_utils;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli_args = Cli::parse();
    let mut aggregator = ArgumentAggregator::new();

    // Load config based on command
    match &cli_args.cmd {
        Commands::Run(args) => aggregator.load(args.config.as_ref()),
        Commands::Clean(args) => aggregator.load(args.config.as_ref()),
        Commands::Report(args) => aggregator.load(args.config.as_ref()),
    }?;

    // Execute command
    match &cli_args.cmd {
        Commands::Run(args) => RunCommand::new(args, &aggregator).execute(),
        Commands::Clean(args) => CleanCommand::new(args, &aggregator).execute(),
        Commands::Report(args) => ReportCommand::new(args, &aggregator).execute(),
    }
}
