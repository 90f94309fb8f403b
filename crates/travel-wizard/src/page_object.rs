//! Page Object Model Support
//!
//! Each wizard screen is a page object: private locators, a load check, and
//! the actions a user takes on that screen. Page objects hold no state besides
//! their [`Waiter`], so a fresh one is built for every step.
//!
//! ## Load checks
//!
//! `is_loaded` fails loudly. It confirms the navigation URL first and the
//! screen's marker element second, and returns the underlying
//! [`WizardError::Timeout`](crate::WizardError::Timeout) when either never
//! shows up instead of collapsing it into `false`.

use crate::result::WizardResult;
use crate::session::BrowserSession;
use crate::wait::{Waiter, DEFAULT_WAIT_TIMEOUT_MS};

/// Trait for page objects representing one screen of the wizard.
pub trait PageObject {
    /// Name used in logs and reports
    fn page_name(&self) -> &str;

    /// Fragment the navigation URL contains while this screen is shown
    fn url_fragment(&self) -> &str;

    /// Budget for each load-check wait (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        DEFAULT_WAIT_TIMEOUT_MS
    }

    /// Confirm the screen is shown and ready for interaction.
    ///
    /// Repeated calls without an intervening navigation return the same
    /// result.
    fn is_loaded(&self) -> WizardResult<()>;
}

/// Shared load check: one URL wait, then the screen-specific marker.
pub(crate) fn confirm_loaded<S, T>(
    waiter: &Waiter<'_, S>,
    page_name: &str,
    url_fragment: &str,
    marker: impl FnOnce() -> WizardResult<T>,
) -> WizardResult<()>
where
    S: BrowserSession + ?Sized,
{
    let url = waiter.wait_url_contains(url_fragment)?;
    let _ = marker()?;
    tracing::info!(page = page_name, url = %url, "page loaded");
    Ok(())
}
