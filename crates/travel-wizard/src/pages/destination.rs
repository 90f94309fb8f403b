//! Destination step.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Locator;
use crate::page_object::{confirm_loaded, PageObject};
use crate::result::WizardResult;
use crate::session::BrowserSession;
use crate::wait::{WaitOptions, Waiter};

pub(crate) const DESTINATION_FRAGMENT: &str = "/wizard/destination";
pub(crate) const SCREEN_TITLE_ID: &str = "screen_title";
pub(crate) const SCREEN_TITLE_TEXT: &str = "בחרו יעד נסיעה";
pub(crate) const DESTINATION_NEXT_XPATH: &str =
    "//*[@id='root']/div/div[2]/div[2]/div[2]/div[3]/div/button";

/// A destination tile on the destination screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// DOM id of the tile (e.g. `destination-6`)
    pub element_id: String,
    /// Display name for logs
    pub name: String,
}

impl Destination {
    /// Destination by tile id
    #[must_use]
    pub fn new(element_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            name: name.into(),
        }
    }

    /// The Australia tile
    #[must_use]
    pub fn australia() -> Self {
        Self::new("destination-6", "Australia")
    }

    /// Clickable icon inside the tile
    #[must_use]
    pub fn icon_css(&self) -> String {
        format!("#{} > svg", self.element_id)
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::australia()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.element_id)
    }
}

/// Destination choice screen
#[derive(Debug)]
pub struct DestinationPage<'s, S: BrowserSession + ?Sized> {
    waiter: Waiter<'s, S>,
    title: Locator,
    next: Locator,
}

impl<'s, S: BrowserSession + ?Sized> DestinationPage<'s, S> {
    /// Create the page object
    pub fn new(session: &'s S, options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::new(session, options),
            title: Locator::id(SCREEN_TITLE_ID).named("screen title"),
            next: Locator::xpath(DESTINATION_NEXT_XPATH).named("destination next"),
        }
    }

    /// Click a destination tile.
    pub fn choose_destination(&self, destination: &Destination) -> WizardResult<()> {
        let tile = Locator::css(destination.icon_css()).named(destination.name.clone());
        let icon = self.waiter.wait_clickable(&tile)?;
        tracing::info!(destination = %destination, "destination chosen");
        self.waiter.session().click(&icon)
    }

    /// Continue to the date step.
    pub fn click_next(&self) -> WizardResult<()> {
        let button = self.waiter.wait_clickable(&self.next)?;
        self.waiter.session().click(&button)
    }
}

impl<S: BrowserSession + ?Sized> PageObject for DestinationPage<'_, S> {
    fn page_name(&self) -> &str {
        "destination"
    }

    fn url_fragment(&self) -> &str {
        DESTINATION_FRAGMENT
    }

    fn load_timeout_ms(&self) -> u64 {
        self.waiter.options().timeout_ms
    }

    fn is_loaded(&self) -> WizardResult<()> {
        confirm_loaded(&self.waiter, self.page_name(), DESTINATION_FRAGMENT, || {
            let _ = self.waiter.wait_visible(&self.title)?;
            self.waiter.wait_text_contains(&self.title, SCREEN_TITLE_TEXT)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_hidden_title_is_not_loaded() {
        use crate::mock::{MockElement, MockPage, MockSession};

        let session = MockSession::new();
        session.add_page(
            MockPage::new(DESTINATION_FRAGMENT).with(
                MockElement::new("screen-title")
                    .id(SCREEN_TITLE_ID)
                    .text(SCREEN_TITLE_TEXT)
                    .hidden(),
            ),
        );
        session.set_url(format!("https://travel.test{DESTINATION_FRAGMENT}"));
        let options = WaitOptions::new().with_timeout(60).with_poll_interval(5);
        let err = DestinationPage::new(&session, options).is_loaded().unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("not displayed"), "{err}");
    }

    #[test]
    fn test_australia_icon_selector() {
        let d = Destination::australia();
        assert_eq!(d.icon_css(), "#destination-6 > svg");
        assert_eq!(d.to_string(), "Australia (destination-6)");
    }
}
