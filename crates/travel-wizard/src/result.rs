//! Result and error types for the wizard suite.

use thiserror::Error;

/// Result type for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;

/// Errors that can occur while driving the wizard
#[derive(Debug, Error)]
pub enum WizardError {
    /// A wait condition never became true within its budget
    #[error("Timed out after {timeout_ms}ms waiting for {condition} (last seen: {last_observation})")]
    Timeout {
        /// Condition description, including the locator
        condition: String,
        /// Budget that elapsed
        timeout_ms: u64,
        /// What the last poll observed
        last_observation: String,
    },

    /// Every tier of a locator fallback chain resolved to zero elements
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Description of the locator (or chain) that was exhausted
        locator: String,
    },

    /// Unrecognized configuration value
    #[error("Unsupported {field}: '{value}'")]
    UnsupportedInput {
        /// Configuration field
        field: String,
        /// Rejected value
        value: String,
    },

    /// Element was detached from the document after it was resolved
    #[error("Stale element reference: {element}")]
    StaleElement {
        /// Element id
        element: String,
    },

    /// Browser session failure
    #[error("Browser session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationFailed {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Screenshot or page source capture failed
    #[error("Capturing {what} failed: {message}")]
    Capture {
        /// What was being captured
        what: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl WizardError {
    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an unsupported-input error
    #[must_use]
    pub fn unsupported(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnsupportedInput {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the waiter may retry after this error
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
