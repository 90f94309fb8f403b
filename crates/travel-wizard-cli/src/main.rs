//! Travel Wizard CLI: drive the travel-insurance purchase wizard
//!
//! ## Usage
//!
//! ```bash
//! travel-wizard run                            # Headless Chrome, keyboard dates
//! travel-wizard run --browser edge --headed    # Visible Edge window
//! travel-wizard plan --today 2026-10-19        # Show the range a run would pick
//! travel-wizard config --config wizard.yaml    # Print the effective configuration
//! ```

use clap::Parser;
use std::process::ExitCode;
use travel_wizard_cli::{handlers, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    config.init_tracing();

    match cli.command {
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::Plan(args) => handlers::execute_plan(&config, &args),
        Commands::Config(args) => handlers::execute_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
}
