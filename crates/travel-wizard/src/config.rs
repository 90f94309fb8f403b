//! Run configuration.
//!
//! Layers, lowest to highest precedence: built-in defaults, a YAML file,
//! `TRAVEL_WIZARD_*` environment variables, command-line flags (applied by
//! the caller on the returned struct).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::date_range::{DateRangeSelector, RangeStrategy};
use crate::pages::Destination;
use crate::result::{WizardError, WizardResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Production entry point of the wizard
pub const DEFAULT_BASE_URL: &str = "https://digital.harel-group.co.il/travel-policy";

/// Overrides `browser`
pub const ENV_BROWSER: &str = "TRAVEL_WIZARD_BROWSER";
/// Overrides `base_url`
pub const ENV_BASE_URL: &str = "TRAVEL_WIZARD_BASE_URL";
/// Overrides `headless`
pub const ENV_HEADLESS: &str = "TRAVEL_WIZARD_HEADLESS";

/// Browsers the `DevTools` backend can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BrowserKind {
    /// Google Chrome
    #[default]
    Chrome,
    /// Chromium
    Chromium,
    /// Microsoft Edge
    Edge,
}

impl BrowserKind {
    /// All supported kinds
    pub const ALL: [Self; 3] = [Self::Chrome, Self::Chromium, Self::Edge];

    /// Parse a case-insensitive browser id.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnsupportedInput`] for anything but
    /// `chrome`, `chromium` or `edge`
    pub fn parse(id: &str) -> WizardResult<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "chromium" => Ok(Self::Chromium),
            "edge" | "msedge" => Ok(Self::Edge),
            _ => Err(WizardError::unsupported("browser", id)),
        }
    }

    /// Configuration identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Edge => "edge",
        }
    }

    /// Well-known executable locations, most likely first
    #[must_use]
    pub const fn executable_candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Chrome => &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            ],
            Self::Chromium => &[
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ],
            Self::Edge => &[
                "/usr/bin/microsoft-edge",
                "/usr/bin/microsoft-edge-stable",
                "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
            ],
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BrowserKind {
    type Error = WizardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BrowserKind> for String {
    fn from(kind: BrowserKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Per-page wait budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Polling interval shared by every wait
    pub poll_interval_ms: u64,
    /// Landing page
    pub home_ms: u64,
    /// Destination step
    pub destination_ms: u64,
    /// Date step
    pub date_ms: u64,
    /// Travelers step
    pub travelers_ms: u64,
    /// Browser launch and page navigation
    pub launch_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            home_ms: DEFAULT_WAIT_TIMEOUT_MS,
            destination_ms: DEFAULT_WAIT_TIMEOUT_MS,
            date_ms: 25_000,
            travelers_ms: DEFAULT_WAIT_TIMEOUT_MS,
            launch_ms: 60_000,
        }
    }
}

impl TimeoutConfig {
    /// Every page budget set to `timeout_ms`
    #[must_use]
    pub const fn uniform(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            poll_interval_ms,
            home_ms: timeout_ms,
            destination_ms: timeout_ms,
            date_ms: timeout_ms,
            travelers_ms: timeout_ms,
            launch_ms: timeout_ms,
        }
    }

    fn options(self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Wait options for the landing page
    #[must_use]
    pub fn home(self) -> WaitOptions {
        self.options(self.home_ms)
    }

    /// Wait options for the destination step
    #[must_use]
    pub fn destination(self) -> WaitOptions {
        self.options(self.destination_ms)
    }

    /// Wait options for the date step
    #[must_use]
    pub fn date(self) -> WaitOptions {
        self.options(self.date_ms)
    }

    /// Wait options for the travelers step
    #[must_use]
    pub fn travelers(self) -> WaitOptions {
        self.options(self.travelers_ms)
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Landing page URL
    pub base_url: String,
    /// Browser to launch
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
    /// Wait budgets
    pub timeouts: TimeoutConfig,
    /// Date step
    pub date: DateRangeSelector,
    /// Destination tile
    pub destination: Destination,
    /// Where failure diagnostics are written
    pub artifacts_dir: PathBuf,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::default(),
            headless: true,
            timeouts: TimeoutConfig::default(),
            date: DateRangeSelector::default(),
            destination: Destination::australia(),
            artifacts_dir: PathBuf::from("target/travel-wizard"),
        }
    }
}

impl WizardConfig {
    /// Parse YAML; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or an unsupported browser/strategy id
    pub fn from_yaml_str(yaml: &str) -> WizardResult<Self> {
        let document: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml)?;
        check_identifiers(&document)?;
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> WizardResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            WizardError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Self::from_yaml_str(&yaml)
    }

    /// Serialize as YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> WizardResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `TRAVEL_WIZARD_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error when a variable holds an unsupported value
    pub fn apply_env(&mut self) -> WizardResult<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply `TRAVEL_WIZARD_*` variables from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns error when a variable holds an unsupported value
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> WizardResult<()> {
        if let Some(browser) = lookup(ENV_BROWSER) {
            self.browser = BrowserKind::parse(&browser)?;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            self.headless = parse_flag(ENV_HEADLESS, &headless)?;
        }
        self.validate()
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Config`] describing the first violation
    pub fn validate(&self) -> WizardResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(WizardError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.date.duration_days == 0 {
            return Err(WizardError::config("date.duration_days must be at least 1"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(WizardError::config("timeouts.poll_interval_ms must be positive"));
        }
        if self.destination.element_id.trim().is_empty() {
            return Err(WizardError::config("destination.element_id is empty"));
        }
        Ok(())
    }
}

/// Reject unknown browser and strategy ids with their own error; serde
/// would report them as [`WizardError::Yaml`].
fn check_identifiers(document: &serde_yaml_ng::Value) -> WizardResult<()> {
    if let Some(id) = document.get("browser").and_then(serde_yaml_ng::Value::as_str) {
        let _ = BrowserKind::parse(id)?;
    }
    if let Some(id) = document
        .get("date")
        .and_then(|date| date.get("strategy"))
        .and_then(serde_yaml_ng::Value::as_str)
    {
        let _ = id.parse::<RangeStrategy>()?;
    }
    Ok(())
}

fn parse_flag(field: &str, value: &str) -> WizardResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WizardError::unsupported(field, value)),
    }
}
