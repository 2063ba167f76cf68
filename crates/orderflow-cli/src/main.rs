//! # orderflow CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use orderflow_cli::config::{LogFormat, OrderflowConfig};

/// orderflow — observable order lifecycle toolkit.
#[derive(Parser, Debug)]
#[command(name = "orderflow", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Drive one order through email changes and lifecycle advances.
    Run(orderflow_cli::run::RunArgs),
    /// Print the lifecycle transition table.
    States(orderflow_cli::states::StatesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = OrderflowConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("loading config {:?}", cli.config))?;

    orderflow_cli::logging::init(
        &config.log_filter,
        cli.log_format.unwrap_or(config.log_format),
    );

    let output = match cli.command {
        Commands::Run(args) => {
            let report = orderflow_cli::run::execute(&args, &config)?;
            orderflow_cli::run::render(&report, args.format)?
        }
        Commands::States(args) => orderflow_cli::states::render(args.format)?,
    };
    print!("{output}");

    Ok(())
}
