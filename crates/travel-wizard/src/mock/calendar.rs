//! Calendar widget model for the mock session.

use chrono::{Days, NaiveDate};

use crate::date_range::{parse_input, summary_text};

/// How the widget counts a selected range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeCounting {
    /// `end - start` (nights)
    #[default]
    Nights,
    /// `end - start + 1` (calendar days, both ends included)
    Inclusive,
}

/// Keyboard-navigable date range picker.
///
/// Focus starts nowhere; a click effect focuses a date. `ArrowRight` moves
/// focus one day forward across month and year boundaries, `Enter` confirms
/// the start date first and the end date second. Typed inputs are parsed as
/// `dd/mm/yyyy`. Whenever both ends are known the summary element's text is
/// rewritten.
#[derive(Debug, Clone, Default)]
pub struct MockCalendar {
    pub(crate) focused: Option<NaiveDate>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) summary_key: String,
    pub(crate) highlight_key: Option<String>,
    pub(crate) start_input_key: Option<String>,
    pub(crate) end_input_key: Option<String>,
    pub(crate) counting: RangeCounting,
    pub(crate) summary_prefix: String,
}

impl MockCalendar {
    /// Calendar writing its summary into the element with `summary_key`
    #[must_use]
    pub fn new(summary_key: impl Into<String>) -> Self {
        Self {
            summary_key: summary_key.into(),
            ..Self::default()
        }
    }

    /// Mirror the focused date into the `aria-label` of this element
    #[must_use]
    pub fn with_highlight(mut self, key: impl Into<String>) -> Self {
        self.highlight_key = Some(key.into());
        self
    }

    /// Accept typed dates from these input elements
    #[must_use]
    pub fn with_inputs(mut self, start_key: impl Into<String>, end_key: impl Into<String>) -> Self {
        self.start_input_key = Some(start_key.into());
        self.end_input_key = Some(end_key.into());
        self
    }

    /// Counting rule
    #[must_use]
    pub const fn with_counting(mut self, counting: RangeCounting) -> Self {
        self.counting = counting;
        self
    }

    /// Text rendered before the total (e.g. "תאריכים | ")
    #[must_use]
    pub fn with_summary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.summary_prefix = prefix.into();
        self
    }

    /// Focused date
    #[must_use]
    pub const fn focused(&self) -> Option<NaiveDate> {
        self.focused
    }

    /// Confirmed start date
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Confirmed end date
    #[must_use]
    pub const fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub(crate) fn focus(&mut self, date: NaiveDate) {
        self.focused = Some(date);
    }

    pub(crate) fn arrow_right(&mut self) {
        self.focused = self.focused.and_then(|d| d.checked_add_days(Days::new(1)));
    }

    pub(crate) fn arrow_left(&mut self) {
        self.focused = self.focused.and_then(|d| d.checked_sub_days(Days::new(1)));
    }

    pub(crate) fn confirm(&mut self) {
        let Some(date) = self.focused else { return };
        match (self.start, self.end) {
            (None, _) | (Some(_), Some(_)) => {
                self.start = Some(date);
                self.end = None;
            }
            (Some(_), None) => self.end = Some(date),
        }
    }

    pub(crate) fn typed(&mut self, start: &str, end: &str) {
        self.start = parse_input(start);
        self.end = parse_input(end);
    }

    /// Summary text for the current selection, if both ends are set
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let (start, end) = (self.start?, self.end?);
        let nights = (end - start).num_days();
        let days = match self.counting {
            RangeCounting::Nights => nights,
            RangeCounting::Inclusive => nights + 1,
        };
        Some(format!("{}{}", self.summary_prefix, summary_text(days)))
    }
}
