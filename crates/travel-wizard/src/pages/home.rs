//! Landing page of the travel policy product.

use crate::locator::Locator;
use crate::page_object::{confirm_loaded, PageObject};
use crate::result::WizardResult;
use crate::session::BrowserSession;
use crate::wait::{WaitOptions, Waiter};

pub(crate) const HOME_FRAGMENT: &str = "/travel-policy";
pub(crate) const FIRST_PURCHASE_XPATH: &str =
    "//*[@id='root']/div/div/div[1]/div[1]/div/div/div[1]/div/button";

/// Landing page with the "first purchase" entry point.
#[derive(Debug)]
pub struct HomePage<'s, S: BrowserSession + ?Sized> {
    waiter: Waiter<'s, S>,
    base_url: String,
    first_purchase: Locator,
}

impl<'s, S: BrowserSession + ?Sized> HomePage<'s, S> {
    /// Page object for the landing page at `base_url`
    pub fn new(session: &'s S, base_url: impl Into<String>, options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::new(session, options),
            base_url: base_url.into(),
            first_purchase: Locator::xpath(FIRST_PURCHASE_XPATH).named("first purchase"),
        }
    }

    /// Navigate to the base URL.
    pub fn open(&self) -> WizardResult<()> {
        tracing::info!(url = %self.base_url, "opening landing page");
        self.waiter.session().navigate(&self.base_url)
    }

    /// Start a first-time purchase.
    pub fn click_first_purchase(&self) -> WizardResult<()> {
        let button = self.waiter.wait_clickable(&self.first_purchase)?;
        self.waiter.session().click(&button)
    }
}

impl<S: BrowserSession + ?Sized> PageObject for HomePage<'_, S> {
    fn page_name(&self) -> &str {
        "home"
    }

    fn url_fragment(&self) -> &str {
        HOME_FRAGMENT
    }

    fn load_timeout_ms(&self) -> u64 {
        self.waiter.options().timeout_ms
    }

    fn is_loaded(&self) -> WizardResult<()> {
        confirm_loaded(&self.waiter, self.page_name(), HOME_FRAGMENT, || {
            self.waiter.wait_visible(&self.first_purchase)
        })
    }
}
