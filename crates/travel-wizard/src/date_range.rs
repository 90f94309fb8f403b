//! Date range arithmetic for the wizard's date step.
//!
//! The wizard asks for a trip that starts a week from today and reports the
//! trip length back as a localized summary (`סה"כ: 30 ימים`). Two input
//! strategies exist for the same widget family; exactly one is chosen per run
//! through configuration.

use chrono::{Days, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::result::{WizardError, WizardResult};

/// Days between today and the trip start
pub const DEFAULT_START_OFFSET_DAYS: u32 = 7;

/// Trip length
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Input format of the date fields
pub const INPUT_FORMAT: &str = "%d/%m/%Y";

/// Summary string the widget renders for a range of `days` days
#[must_use]
pub fn summary_text(days: i64) -> String {
    format!("סה\"כ: {days} ימים")
}

/// Parse the day count back out of a rendered summary
#[must_use]
pub fn summary_days(text: &str) -> Option<i64> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#"סה"כ:\s*(\d+)\s*ימים"#).ok())
        .as_ref()?;
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Format a date for the text inputs (`dd/mm/yyyy`)
#[must_use]
pub fn format_input(date: NaiveDate) -> String {
    date.format(INPUT_FORMAT).to_string()
}

/// Parse a `dd/mm/yyyy` input value
#[must_use]
pub fn parse_input(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), INPUT_FORMAT).ok()
}

/// Start and end date of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the trip
    pub start: NaiveDate,
    /// Last day of the trip
    pub end: NaiveDate,
}

impl DateRange {
    /// Range spanning `total_days` calendar days with both ends included.
    ///
    /// `inclusive(today, 7, 30)` ends on `today + 36`.
    pub fn inclusive(today: NaiveDate, start_offset: u32, total_days: u32) -> WizardResult<Self> {
        if total_days == 0 {
            return Err(WizardError::config("a trip must last at least one day"));
        }
        let start = add_days(today, start_offset)?;
        let end = add_days(start, total_days - 1)?;
        Ok(Self { start, end })
    }

    /// Range reached by traversing `duration_days` cells from the start.
    ///
    /// `traversal(today, 7, 30)` ends on `today + 37`.
    pub fn traversal(today: NaiveDate, start_offset: u32, duration_days: u32) -> WizardResult<Self> {
        let start = add_days(today, start_offset)?;
        let end = add_days(start, duration_days)?;
        Ok(Self { start, end })
    }

    /// Days from start to end, both included
    #[must_use]
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Start in input format
    #[must_use]
    pub fn start_input(&self) -> String {
        format_input(self.start)
    }

    /// End in input format
    #[must_use]
    pub fn end_input(&self) -> String {
        format_input(self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_input(), self.end_input())
    }
}

fn add_days(date: NaiveDate, days: u32) -> WizardResult<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| WizardError::config(format!("{date} + {days} days is out of range")))
}

/// How the date range reaches the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RangeStrategy {
    /// Type both dates into two text inputs; summary must match exactly
    TextEntry,
    /// Walk the calendar grid with arrow keys from today; summary must contain the total
    #[default]
    Keyboard,
}

impl RangeStrategy {
    /// Configuration identifier
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TextEntry => "text-entry",
            Self::Keyboard => "keyboard",
        }
    }
}

impl fmt::Display for RangeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeStrategy {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text-entry" | "text" => Ok(Self::TextEntry),
            "keyboard" | "calendar" => Ok(Self::Keyboard),
            _ => Err(WizardError::unsupported("date strategy", s)),
        }
    }
}

impl TryFrom<String> for RangeStrategy {
    type Error = WizardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RangeStrategy> for String {
    fn from(strategy: RangeStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Everything the date step needs to pick and verify a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRangeSelector {
    /// Input strategy
    pub strategy: RangeStrategy,
    /// Anchor date; the local calendar date when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<NaiveDate>,
    /// Days from today to the trip start
    pub start_offset_days: u32,
    /// Trip length
    pub duration_days: u32,
    /// Pause after each key press when the widget exposes no focus signal
    pub settle_ms: u64,
    /// Pause after each Enter on the calendar
    pub confirm_settle_ms: u64,
    /// Bound on waiting for the focus signal to move after a key press
    pub signal_timeout_ms: u64,
}

impl Default for DateRangeSelector {
    fn default() -> Self {
        Self {
            strategy: RangeStrategy::default(),
            today: None,
            start_offset_days: DEFAULT_START_OFFSET_DAYS,
            duration_days: DEFAULT_DURATION_DAYS,
            settle_ms: 50,
            confirm_settle_ms: 150,
            signal_timeout_ms: 2_000,
        }
    }
}

impl DateRangeSelector {
    /// Selector with defaults for the given strategy
    #[must_use]
    pub fn new(strategy: RangeStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Pin "today"
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Set offsets
    #[must_use]
    pub const fn with_offsets(mut self, start_offset_days: u32, duration_days: u32) -> Self {
        self.start_offset_days = start_offset_days;
        self.duration_days = duration_days;
        self
    }

    /// Anchor date
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// The range this selector will realize
    pub fn target(&self) -> WizardResult<DateRange> {
        match self.strategy {
            RangeStrategy::TextEntry => {
                DateRange::inclusive(self.today(), self.start_offset_days, self.duration_days)
            }
            RangeStrategy::Keyboard => {
                DateRange::traversal(self.today(), self.start_offset_days, self.duration_days)
            }
        }
    }

    /// Summary the widget must show after selection
    #[must_use]
    pub fn expected_summary(&self) -> String {
        summary_text(i64::from(self.duration_days))
    }
}
