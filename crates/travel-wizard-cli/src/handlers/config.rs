//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::CliResult;

use super::resolve_config;

/// Print the effective configuration as YAML
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(&args.source)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
