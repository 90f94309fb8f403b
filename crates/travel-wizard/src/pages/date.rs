//! Date step: choose the trip's date range.

use crate::calendar::{KeyboardCalendar, TextEntryForm};
use crate::date_range::{DateRange, DateRangeSelector, RangeStrategy};
use crate::locator::{Locator, LocatorChain};
use crate::page_object::{confirm_loaded, PageObject};
use crate::result::WizardResult;
use crate::session::BrowserSession;
use crate::wait::{WaitOptions, Waiter};

pub(crate) const DATE_FRAGMENT: &str = "/wizard/date";
pub(crate) const SUMMARY_CSS: &str = "#root > div > div.jss700 > div.MuiContainer-root.jss697 > div.jss896 > div.MuiGrid-root.MuiGrid-container.MuiGrid-spacing-xs-3 > div";
pub(crate) const CALENDAR_CSS: &str = "#root > div > div.jss700 > div.MuiContainer-root.jss697 > div.jss896 > div.MuiGrid-root.MuiGrid-container.MuiGrid-spacing-xs-3 > div > div > div > div";
pub(crate) const TODAY_CSS: &str = "button[aria-current='date']";
pub(crate) const FALLBACK_DAY_XPATH: &str = "//*[@id='root']/div/div[2]/div[2]/div[2]/div[1]/div/div/div/div/div[2]/div[1]/div/div/div[2]/div/div[5]/div[2]/div/button/span/span";
pub(crate) const FOCUSED_DAY_CSS: &str = "button[tabindex='0']";
pub(crate) const START_INPUT_CSS: &str = "input[name='startDate']";
pub(crate) const END_INPUT_CSS: &str = "input[name='endDate']";
pub(crate) const NEXT_BUTTON_ID: &str = "nextButton";

/// Date range screen
#[derive(Debug)]
pub struct DatePage<'s, S: BrowserSession + ?Sized> {
    waiter: Waiter<'s, S>,
    calendar: Locator,
    summary: Locator,
    next: Locator,
}

impl<'s, S: BrowserSession + ?Sized> DatePage<'s, S> {
    /// Create the page object
    pub fn new(session: &'s S, options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::new(session, options),
            calendar: Locator::css(CALENDAR_CSS).named("calendar"),
            summary: Locator::css(SUMMARY_CSS).named("total days"),
            next: Locator::id(NEXT_BUTTON_ID).named("date next"),
        }
    }

    /// Select the range described by `selector` and verify the summary.
    ///
    /// Returns the range the widget was driven to.
    pub fn select_range(&self, selector: &DateRangeSelector) -> WizardResult<DateRange> {
        let range = selector.target()?;
        let expected = selector.expected_summary();
        tracing::info!(strategy = %selector.strategy, range = %range, expected = %expected, "selecting dates");
        let summary = match selector.strategy {
            RangeStrategy::TextEntry => TextEntryForm::new(
                &self.waiter,
                Locator::css(START_INPUT_CSS).named("start date"),
                Locator::css(END_INPUT_CSS).named("end date"),
                self.summary.clone(),
            )
            .fill(&range, &expected)?,
            RangeStrategy::Keyboard => KeyboardCalendar::new(
                &self.waiter,
                Self::anchor_chain(),
                Locator::css(FOCUSED_DAY_CSS).first().named("focused day"),
                self.summary.clone(),
            )
            .with_settle_ms(selector.settle_ms)
            .with_confirm_settle_ms(selector.confirm_settle_ms)
            .with_signal_timeout_ms(selector.signal_timeout_ms)
            .select(selector.start_offset_days, selector.duration_days, &expected)?,
        };
        tracing::debug!(summary = %summary, "date summary confirmed");
        Ok(range)
    }

    /// Continue to the travelers step.
    pub fn click_next(&self) -> WizardResult<()> {
        let button = self.waiter.wait_clickable(&self.next)?;
        self.waiter.session().click(&button)
    }

    fn anchor_chain() -> LocatorChain {
        LocatorChain::new("calendar anchor")
            .then(Locator::css(TODAY_CSS).first().named("today"))
            .then(Locator::xpath(FALLBACK_DAY_XPATH).first().named("structural day"))
            .then_within(
                Locator::css(CALENDAR_CSS).named("calendar"),
                Locator::css("button").first().named("first day"),
            )
    }
}

impl<S: BrowserSession + ?Sized> PageObject for DatePage<'_, S> {
    fn page_name(&self) -> &str {
        "date"
    }

    fn url_fragment(&self) -> &str {
        DATE_FRAGMENT
    }

    fn load_timeout_ms(&self) -> u64 {
        self.waiter.options().timeout_ms
    }

    fn is_loaded(&self) -> WizardResult<()> {
        confirm_loaded(&self.waiter, self.page_name(), DATE_FRAGMENT, || {
            self.waiter.wait_visible(&self.calendar)
        })
    }
}
