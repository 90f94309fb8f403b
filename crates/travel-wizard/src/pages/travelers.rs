//! Travelers step; the flow ends once it is shown.

use crate::locator::Locator;
use crate::page_object::{confirm_loaded, PageObject};
use crate::result::WizardResult;
use crate::session::BrowserSession;
use crate::wait::{WaitOptions, Waiter};

pub(crate) const TRAVELERS_FRAGMENT: &str = "/wizard/travelers";
pub(crate) const TRAVELERS_HEADING_XPATH: &str = "//*[@id='root']/div/div[2]/div[2]/div[2]/h2";
pub(crate) const TRAVELERS_HEADING_TEXT: &str = "נשמח להכיר את הנוסעים שנבטח הפעם";

/// Travelers details screen
#[derive(Debug)]
pub struct TravelersPage<'s, S: BrowserSession + ?Sized> {
    waiter: Waiter<'s, S>,
    heading: Locator,
}

impl<'s, S: BrowserSession + ?Sized> TravelersPage<'s, S> {
    /// Create the page object
    pub fn new(session: &'s S, options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::new(session, options),
            heading: Locator::xpath(TRAVELERS_HEADING_XPATH).named("travelers heading"),
        }
    }

    /// Heading text as rendered, once it is shown and equals the expected greeting
    pub fn heading(&self) -> WizardResult<String> {
        let _ = self.waiter.wait_visible(&self.heading)?;
        self.waiter
            .wait_text_equals(&self.heading, TRAVELERS_HEADING_TEXT)
    }
}

impl<S: BrowserSession + ?Sized> PageObject for TravelersPage<'_, S> {
    fn page_name(&self) -> &str {
        "travelers"
    }

    fn url_fragment(&self) -> &str {
        TRAVELERS_FRAGMENT
    }

    fn load_timeout_ms(&self) -> u64 {
        self.waiter.options().timeout_ms
    }

    fn is_loaded(&self) -> WizardResult<()> {
        confirm_loaded(&self.waiter, self.page_name(), TRAVELERS_FRAGMENT, || {
            self.heading()
        })
    }
}
