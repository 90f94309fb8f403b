//! Plan command handler
//!
//! Shows what the date step would select without opening a browser.

use chrono::NaiveDate;
use travel_wizard::{DateRange, WizardConfig};

use crate::commands::PlanArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

use super::resolve_config;

/// Execute the plan command
pub fn execute_plan(config: &CliConfig, args: &PlanArgs) -> CliResult<()> {
    let mut wizard = resolve_config(&args.source)?;
    if let Some(today) = &args.today {
        wizard.date.today = Some(parse_today(today)?);
    }
    let range = wizard.date.target()?;
    if config.verbosity.is_verbose() {
        println!("Destination: {}", wizard.destination);
    }
    print!("{}", render_plan(&wizard, &range));
    Ok(())
}

/// Parse a `YYYY-MM-DD` anchor date
pub fn parse_today(value: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        CliError::invalid_argument(format!("--today expects YYYY-MM-DD, got '{value}': {e}"))
    })
}

/// Human-readable plan
#[must_use]
pub fn render_plan(config: &WizardConfig, range: &DateRange) -> String {
    format!(
        "Strategy: {}\nToday:    {}\nStart:    {} ({})\nEnd:      {} ({})\nSummary:  {}\n",
        config.date.strategy,
        config.date.today(),
        range.start,
        range.start_input(),
        range.end,
        range.end_input(),
        config.date.expected_summary(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use travel_wizard::{DateRangeSelector, RangeStrategy};

    fn config(strategy: RangeStrategy) -> WizardConfig {
        WizardConfig {
            date: DateRangeSelector::new(strategy)
                .with_today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
            ..WizardConfig::default()
        }
    }

    #[test]
    fn test_parse_today() {
        assert_eq!(
            parse_today("2026-10-19").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert!(parse_today("19/10/2026").is_err());
    }

    #[test]
    fn test_render_keyboard_plan() {
        let config = config(RangeStrategy::Keyboard);
        let plan = render_plan(&config, &config.date.target().unwrap());
        assert!(plan.contains("Strategy: keyboard"));
        assert!(plan.contains("Start:    2026-10-26 (26/10/2026)"));
        assert!(plan.contains("End:      2026-11-25 (25/11/2026)"));
        assert!(plan.contains("סה\"כ: 30 ימים"));
    }

    #[test]
    fn test_render_text_entry_plan() {
        let config = config(RangeStrategy::TextEntry);
        let plan = render_plan(&config, &config.date.target().unwrap());
        assert!(plan.contains("End:      2026-11-24 (24/11/2026)"));
    }
}
