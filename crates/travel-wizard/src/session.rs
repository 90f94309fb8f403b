//! Browser session capability.
//!
//! Everything above this module talks to the browser through
//! [`BrowserSession`]. Two implementations ship with the crate:
//!
//! - [`MockSession`](crate::mock::MockSession): scriptable in-memory DOM for tests
//! - `CdpSession` (feature `browser`): Chromium/Edge over the `DevTools` protocol
//!
//! Sessions are blocking. A session is owned by exactly one scenario run and
//! shares no mutable state with other sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Selector;
use crate::result::WizardResult;

/// Opaque reference to an element resolved by a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    /// Create a handle from a session-specific id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Session-specific id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Non-text keys the wizard sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Move one cell forward
    ArrowRight,
    /// Move one cell back
    ArrowLeft,
    /// Confirm
    Enter,
    /// Move focus
    Tab,
    /// Dismiss
    Escape,
}

impl Key {
    /// DOM `KeyboardEvent.key` value
    #[must_use]
    pub const fn dom_key(self) -> &'static str {
        match self {
            Self::ArrowRight => "ArrowRight",
            Self::ArrowLeft => "ArrowLeft",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Escape => "Escape",
        }
    }

    /// Windows virtual key code
    #[must_use]
    pub const fn key_code(self) -> i64 {
        match self {
            Self::ArrowRight => 39,
            Self::ArrowLeft => 37,
            Self::Enter => 13,
            Self::Tab => 9,
            Self::Escape => 27,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_key())
    }
}

/// Blocking browser session.
///
/// `find_elements` returns an empty list, never an error, when nothing
/// matches. Element operations on an element detached since it was resolved
/// return [`WizardError::StaleElement`](crate::WizardError::StaleElement).
pub trait BrowserSession {
    /// Navigate to a URL
    fn navigate(&self, url: &str) -> WizardResult<()>;

    /// Find all elements in the document matching a selector
    fn find_elements(&self, selector: &Selector) -> WizardResult<Vec<ElementHandle>>;

    /// Find descendants of an element matching a selector
    fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> WizardResult<Vec<ElementHandle>>;

    /// Current navigation URL
    fn current_url(&self) -> WizardResult<String>;

    /// Click an element
    fn click(&self, element: &ElementHandle) -> WizardResult<()>;

    /// Clear an input element
    fn clear(&self, element: &ElementHandle) -> WizardResult<()>;

    /// Type text into an element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> WizardResult<()>;

    /// Press a key on whatever element currently has focus
    fn press_key(&self, key: Key) -> WizardResult<()>;

    /// Rendered text of an element
    fn text(&self, element: &ElementHandle) -> WizardResult<String>;

    /// Attribute value of an element
    fn attribute(&self, element: &ElementHandle, name: &str) -> WizardResult<Option<String>>;

    /// Whether the element is rendered with non-zero size
    fn is_displayed(&self, element: &ElementHandle) -> WizardResult<bool>;

    /// Whether the element is enabled and not covered by another element
    fn is_enabled(&self, element: &ElementHandle) -> WizardResult<bool>;

    /// PNG screenshot of the viewport
    fn screenshot(&self) -> WizardResult<Vec<u8>>;

    /// Serialized document markup
    fn page_source(&self) -> WizardResult<String>;

    /// Terminate the session
    fn quit(&mut self) -> WizardResult<()>;
}
