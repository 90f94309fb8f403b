//! Travel Wizard CLI Library
//!
//! Command-line interface for the travel-insurance purchase wizard suite.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ConfigSource, PlanArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
