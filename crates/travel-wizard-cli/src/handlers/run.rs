//! Run command handler

use console::style;
use travel_wizard::{ScenarioOutcome, WizardConfig};

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

use super::resolve_config;

/// Scenario name used in reports
pub const SCENARIO_NAME: &str = "travel insurance purchase wizard";

/// Execute the run command
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let mut wizard = resolve_config(&args.source)?;
    apply_run_flags(&mut wizard, args)?;
    if config.verbosity.is_verbose() {
        println!(
            "Running {} in {} ({}) with {} dates",
            SCENARIO_NAME,
            wizard.browser,
            if wizard.headless { "headless" } else { "headed" },
            wizard.date.strategy
        );
    }
    let outcome = run_browser_scenario(&wizard)?;
    report_outcome(config, &outcome);
    if outcome.status.is_passed() {
        Ok(())
    } else {
        Err(CliError::scenario_failed(outcome.summary()))
    }
}

/// Apply run-only flag overrides
pub fn apply_run_flags(wizard: &mut WizardConfig, args: &RunArgs) -> CliResult<()> {
    if let Some(browser) = &args.browser {
        wizard.browser = browser.parse()?;
    }
    if args.headed {
        wizard.headless = false;
    }
    if let Some(url) = &args.base_url {
        wizard.base_url.clone_from(url);
    }
    if let Some(dir) = &args.artifacts {
        wizard.artifacts_dir.clone_from(dir);
    }
    wizard.validate()?;
    Ok(())
}

#[cfg(feature = "browser")]
fn run_browser_scenario(wizard: &WizardConfig) -> CliResult<ScenarioOutcome> {
    use travel_wizard::{run_with_provider, CdpProvider, DirectorySink, TravelFlow};

    let mut sink = DirectorySink::create(&wizard.artifacts_dir)?;
    tracing::info!(dir = %sink.dir().display(), "writing artifacts");
    let provider = CdpProvider::new(wizard);
    let outcome = run_with_provider(SCENARIO_NAME, &provider, &mut sink, |session| {
        TravelFlow::new(wizard).run(session).map(|_| ())
    })?;
    Ok(outcome)
}

#[cfg(not(feature = "browser"))]
fn run_browser_scenario(_wizard: &WizardConfig) -> CliResult<ScenarioOutcome> {
    Err(CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}

fn report_outcome(config: &CliConfig, outcome: &ScenarioOutcome) {
    if config.verbosity.is_quiet() && outcome.status.is_passed() {
        return;
    }
    let label = if outcome.status.is_passed() {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };
    let label = label.force_styling(config.color.should_color());
    println!("{label} {} ({}ms)", outcome.name, outcome.duration_ms);
    if let Some(error) = &outcome.error {
        println!("  {error}");
    }
    for attachment in &outcome.attachments {
        println!("  attached: {attachment}");
    }
}
