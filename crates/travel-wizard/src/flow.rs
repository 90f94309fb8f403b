//! The purchase-wizard flow.
//!
//! ```text
//! home ──open/first purchase──▶ destination ──choose/next──▶ date ──range/next──▶ travelers
//! ```
//!
//! Every step builds a fresh page object, confirms its screen is loaded and
//! performs its actions. The first error aborts the flow and is returned
//! unchanged; nothing is retried at this level.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::WizardConfig;
use crate::date_range::DateRange;
use crate::page_object::PageObject;
use crate::pages::{DatePage, DestinationPage, HomePage, TravelersPage};
use crate::result::WizardResult;
use crate::session::BrowserSession;

/// A completed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    /// Page the step ran on
    pub page: String,
    /// What was done
    pub action: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// What a successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowReport {
    /// Steps in execution order
    pub steps: Vec<FlowStep>,
    /// Date range the date step selected
    pub range: Option<DateRange>,
}

impl FlowReport {
    /// Pages visited, in order
    #[must_use]
    pub fn pages(&self) -> Vec<&str> {
        let mut pages: Vec<&str> = Vec::new();
        for step in &self.steps {
            if pages.last() != Some(&step.page.as_str()) {
                pages.push(&step.page);
            }
        }
        pages
    }

    /// Total duration
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.steps.iter().map(|s| s.duration_ms).sum())
    }

    fn record<T>(
        &mut self,
        page: &str,
        action: &str,
        step: impl FnOnce() -> WizardResult<T>,
    ) -> WizardResult<T> {
        let started = Instant::now();
        let _span = tracing::info_span!("step", page, action).entered();
        let value = step()?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(page, action, duration_ms, "step completed");
        self.steps.push(FlowStep {
            page: page.to_string(),
            action: action.to_string(),
            duration_ms,
        });
        Ok(value)
    }
}

/// Drives the wizard from the landing page to the travelers step.
#[derive(Debug, Clone)]
pub struct TravelFlow<'c> {
    config: &'c WizardConfig,
}

impl<'c> TravelFlow<'c> {
    /// Flow using `config`
    #[must_use]
    pub const fn new(config: &'c WizardConfig) -> Self {
        Self { config }
    }

    /// Run every step against `session`.
    ///
    /// # Errors
    ///
    /// Returns the first page-object error
    pub fn run<S: BrowserSession + ?Sized>(&self, session: &S) -> WizardResult<FlowReport> {
        let mut report = FlowReport::default();
        self.home(session, &mut report)?;
        self.destination(session, &mut report)?;
        let range = self.dates(session, &mut report)?;
        report.range = Some(range);
        self.travelers(session, &mut report)?;
        tracing::info!(steps = report.steps.len(), "travel flow reached the travelers step");
        Ok(report)
    }

    fn home<S: BrowserSession + ?Sized>(&self, session: &S, report: &mut FlowReport) -> WizardResult<()> {
        let home = HomePage::new(session, self.config.base_url.clone(), self.config.timeouts.home());
        report.record(home.page_name(), "open", || home.open())?;
        report.record(home.page_name(), "is_loaded", || home.is_loaded())?;
        report.record(home.page_name(), "click_first_purchase", || home.click_first_purchase())
    }

    fn destination<S: BrowserSession + ?Sized>(
        &self,
        session: &S,
        report: &mut FlowReport,
    ) -> WizardResult<()> {
        let page = DestinationPage::new(session, self.config.timeouts.destination());
        report.record(page.page_name(), "is_loaded", || page.is_loaded())?;
        report.record(page.page_name(), "choose_destination", || {
            page.choose_destination(&self.config.destination)
        })?;
        report.record(page.page_name(), "click_next", || page.click_next())
    }

    fn dates<S: BrowserSession + ?Sized>(
        &self,
        session: &S,
        report: &mut FlowReport,
    ) -> WizardResult<DateRange> {
        let page = DatePage::new(session, self.config.timeouts.date());
        report.record(page.page_name(), "is_loaded", || page.is_loaded())?;
        let range = report.record(page.page_name(), "select_range", || {
            page.select_range(&self.config.date)
        })?;
        report.record(page.page_name(), "click_next", || page.click_next())?;
        Ok(range)
    }

    fn travelers<S: BrowserSession + ?Sized>(
        &self,
        session: &S,
        report: &mut FlowReport,
    ) -> WizardResult<()> {
        let page = TravelersPage::new(session, self.config.timeouts.travelers());
        report.record(page.page_name(), "is_loaded", || page.is_loaded())
    }
}
