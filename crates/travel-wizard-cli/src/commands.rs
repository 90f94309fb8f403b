//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Drive the travel-insurance purchase wizard end to end
#[derive(Parser, Debug)]
#[command(name = "travel-wizard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the purchase wizard scenario in a real browser
    Run(RunArgs),

    /// Print the date range and summary a run would select
    Plan(PlanArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Options shared by every command that resolves a configuration
#[derive(Parser, Debug, Default, Clone)]
pub struct ConfigSource {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Date strategy (keyboard, text-entry)
    #[arg(short, long)]
    pub strategy: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: ConfigSource,

    /// Browser (chrome, chromium, edge). Firefox is rejected: sessions
    /// run over the Chrome DevTools Protocol, which Gecko does not speak
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Landing page URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory for failure screenshots and page sources
    #[arg(long)]
    pub artifacts: Option<PathBuf>,
}

/// Arguments for the plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: ConfigSource,

    /// Anchor date (YYYY-MM-DD); defaults to the local date
    #[arg(long)]
    pub today: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration source
    #[command(flatten)]
    pub source: ConfigSource,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
