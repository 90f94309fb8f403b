//! Command handlers
//!
//! Every command resolves one effective [`WizardConfig`]: built-in defaults,
//! then the YAML file, then `TRAVEL_WIZARD_*` variables, then flags.

pub mod config;
pub mod plan;
pub mod run;

pub use config::execute_config;
pub use plan::{execute_plan, render_plan};
pub use run::execute_run;

use travel_wizard::{RangeStrategy, WizardConfig};

use crate::commands::ConfigSource;
use crate::error::CliResult;

/// Resolve the effective configuration using the process environment
pub fn resolve_config(source: &ConfigSource) -> CliResult<WizardConfig> {
    resolve_config_with(source, |name| std::env::var(name).ok())
}

/// Resolve the effective configuration with an explicit environment lookup
pub fn resolve_config_with(
    source: &ConfigSource,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<WizardConfig> {
    let mut config = match &source.config {
        Some(path) => WizardConfig::load(path)?,
        None => WizardConfig::default(),
    };
    config.apply_env_from(lookup)?;
    if let Some(strategy) = &source.strategy {
        config.date.strategy = strategy.parse::<RangeStrategy>()?;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use travel_wizard::BrowserKind;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = resolve_config_with(&ConfigSource::default(), no_env).unwrap();
        assert_eq!(config.date.strategy, RangeStrategy::Keyboard);
        assert!(config.headless);
    }

    #[test]
    fn test_file_then_env_then_flag() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "browser: chromium\ndate:\n  strategy: keyboard\n  duration_days: 10").unwrap();
        let source = ConfigSource {
            config: Some(file.path().to_path_buf()),
            strategy: Some("text-entry".to_string()),
        };
        let config = resolve_config_with(&source, |name| {
            (name == "TRAVEL_WIZARD_BROWSER").then(|| "edge".to_string())
        })
        .unwrap();
        assert_eq!(config.browser, BrowserKind::Edge);
        assert_eq!(config.date.strategy, RangeStrategy::TextEntry);
        assert_eq!(config.date.duration_days, 10);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let source = ConfigSource {
            config: None,
            strategy: Some("mouse".to_string()),
        };
        let err = resolve_config_with(&source, no_env).unwrap_err();
        assert!(err.to_string().contains("mouse"));
    }
}
