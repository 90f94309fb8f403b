//! Wait Mechanisms
//!
//! Turns "eventually true" DOM predicates into blocking calls with a bounded
//! timeout. Every wait polls the session at a fixed interval on the calling
//! thread until its condition holds or the budget elapses, and then fails
//! with [`WizardError::Timeout`] carrying the condition and the last
//! observation.
//!
//! Stale-element failures during evaluation are swallowed and retried until
//! the timeout; every other error propagates on the spot.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

use crate::locator::{text_contains, text_matches_exactly, Locator};
use crate::result::{WizardError, WizardResult};
use crate::session::{BrowserSession, ElementHandle};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (20 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT CONDITIONS
// =============================================================================

/// Predicate over the browser's current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Element rendered with non-zero size
    Visible(Locator),
    /// Visible, enabled and not covered
    Clickable(Locator),
    /// Trimmed text equals the expected string byte-for-byte
    TextEquals(Locator, String),
    /// Trimmed text contains the expected string
    TextContains(Locator, String),
    /// Navigation URL contains a fragment
    UrlContains(String),
    /// Caller-supplied predicate
    Custom(String),
}

impl WaitCondition {
    /// Description for logs and timeout errors
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Visible(l) => format!("visible({l})"),
            Self::Clickable(l) => format!("clickable({l})"),
            Self::TextEquals(l, t) => format!("text of {l} == '{t}'"),
            Self::TextContains(l, t) => format!("text of {l} contains '{t}'"),
            Self::UrlContains(f) => format!("url contains '{f}'"),
            Self::Custom(d) => d.clone(),
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// One evaluation of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation<T> {
    /// Condition holds
    Met(T),
    /// Condition does not hold yet; what was seen instead
    Pending(String),
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Blocking waiter bound to one session.
#[derive(Debug)]
pub struct Waiter<'s, S: BrowserSession + ?Sized> {
    session: &'s S,
    options: WaitOptions,
    url_waits: Cell<usize>,
}

impl<'s, S: BrowserSession + ?Sized> Waiter<'s, S> {
    /// Create a waiter with the given options
    pub fn new(session: &'s S, options: WaitOptions) -> Self {
        Self {
            session,
            options,
            url_waits: Cell::new(0),
        }
    }

    /// The session this waiter observes
    pub fn session(&self) -> &'s S {
        self.session
    }

    /// Options in effect
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Number of navigation-confirming waits performed
    pub fn url_waits(&self) -> usize {
        self.url_waits.get()
    }

    /// Poll `probe` until it reports [`Observation::Met`] or the timeout elapses.
    pub fn wait_until<T>(
        &self,
        condition: &WaitCondition,
        mut probe: impl FnMut() -> WizardResult<Observation<T>>,
    ) -> WizardResult<T> {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut last_observation = String::from("never evaluated");
        tracing::debug!(condition = %condition, timeout_ms = self.options.timeout_ms, "waiting");

        loop {
            match probe() {
                Ok(Observation::Met(value)) => {
                    tracing::debug!(
                        condition = %condition,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "condition met"
                    );
                    return Ok(value);
                }
                Ok(Observation::Pending(seen)) => last_observation = seen,
                Err(e) if e.is_stale() => {
                    tracing::debug!(condition = %condition, error = %e, "stale element, retrying");
                    last_observation = e.to_string();
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::warn!(condition = %condition, last = %last_observation, "wait timed out");
                return Err(WizardError::Timeout {
                    condition: condition.describe(),
                    timeout_ms: self.options.timeout_ms,
                    last_observation,
                });
            }
            std::thread::sleep(self.options.poll_interval().min(timeout - elapsed));
        }
    }

    /// Block until the locator matches a displayed element.
    pub fn wait_visible(&self, locator: &Locator) -> WizardResult<ElementHandle> {
        let condition = WaitCondition::Visible(locator.clone());
        self.wait_until(&condition, || self.observe_visible(locator))
    }

    /// Block until the locator matches a displayed, enabled element.
    pub fn wait_clickable(&self, locator: &Locator) -> WizardResult<ElementHandle> {
        let condition = WaitCondition::Clickable(locator.clone());
        self.wait_until(&condition, || match self.observe_visible(locator)? {
            Observation::Met(element) => {
                if self.session.is_enabled(&element)? {
                    Ok(Observation::Met(element))
                } else {
                    Ok(Observation::Pending("element disabled or covered".to_string()))
                }
            }
            Observation::Pending(seen) => Ok(Observation::Pending(seen)),
        })
    }

    /// Block until the navigation URL contains `fragment`.
    pub fn wait_url_contains(&self, fragment: &str) -> WizardResult<String> {
        self.url_waits.set(self.url_waits.get() + 1);
        let condition = WaitCondition::UrlContains(fragment.to_string());
        self.wait_until(&condition, || {
            let url = self.session.current_url()?;
            if url.contains(fragment) {
                Ok(Observation::Met(url))
            } else {
                Ok(Observation::Pending(format!("url was '{url}'")))
            }
        })
    }

    /// Block until the element's trimmed text equals `expected`.
    pub fn wait_text_equals(&self, locator: &Locator, expected: &str) -> WizardResult<String> {
        let condition = WaitCondition::TextEquals(locator.clone(), expected.to_string());
        self.wait_until(&condition, || {
            self.observe_text(locator, |actual| text_matches_exactly(actual, expected))
        })
    }

    /// Block until the element's trimmed text contains `expected`.
    pub fn wait_text_contains(&self, locator: &Locator, expected: &str) -> WizardResult<String> {
        let condition = WaitCondition::TextContains(locator.clone(), expected.to_string());
        self.wait_until(&condition, || {
            self.observe_text(locator, |actual| text_contains(actual, expected))
        })
    }

    /// Fixed pause for widgets that expose no observable state change.
    pub fn settle(&self, millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }

    fn observe_visible(&self, locator: &Locator) -> WizardResult<Observation<ElementHandle>> {
        let matches = self.session.find_elements(locator.selector())?;
        let count = matches.len();
        let Some(element) = locator.pick(matches) else {
            return Ok(Observation::Pending(format!("matched {count} elements")));
        };
        if self.session.is_displayed(&element)? {
            Ok(Observation::Met(element))
        } else {
            Ok(Observation::Pending("element not displayed".to_string()))
        }
    }

    fn observe_text(
        &self,
        locator: &Locator,
        accept: impl Fn(&str) -> bool,
    ) -> WizardResult<Observation<String>> {
        let matches = self.session.find_elements(locator.selector())?;
        let count = matches.len();
        let Some(element) = locator.pick(matches) else {
            return Ok(Observation::Pending(format!("matched {count} elements")));
        };
        let text = self.session.text(&element)?;
        if accept(&text) {
            Ok(Observation::Met(text.trim().to_string()))
        } else {
            Ok(Observation::Pending(format!("text was '{}'", text.trim())))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
