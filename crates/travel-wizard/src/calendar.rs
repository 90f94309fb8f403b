//! Drivers for the date range widget.
//!
//! [`KeyboardCalendar`] walks a grid of day buttons with arrow keys from an
//! anchor cell; [`TextEntryForm`] types both dates into a pair of inputs.
//! Both verify the widget's summary text afterwards and neither clicks
//! "next".

use crate::date_range::DateRange;
use crate::locator::{Locator, LocatorChain};
use crate::result::WizardResult;
use crate::session::{BrowserSession, ElementHandle, Key};
use crate::wait::{Observation, WaitCondition, WaitOptions, Waiter};

/// Keyboard-driven range selection on a calendar grid.
///
/// The anchor is resolved through a fallback chain (today's cell, a
/// structural path, any day button inside the focused container). After each
/// arrow press the driver polls the focused cell's label until it changes; if
/// the grid exposes no focused-cell marker it pauses for `settle_ms` instead.
#[derive(Debug)]
pub struct KeyboardCalendar<'w, 's, S: BrowserSession + ?Sized> {
    waiter: &'w Waiter<'s, S>,
    anchor: LocatorChain,
    focus_marker: Locator,
    summary: Locator,
    settle_ms: u64,
    confirm_settle_ms: u64,
    signal_timeout_ms: u64,
}

impl<'w, 's, S: BrowserSession + ?Sized> KeyboardCalendar<'w, 's, S> {
    /// Create a driver
    pub fn new(
        waiter: &'w Waiter<'s, S>,
        anchor: LocatorChain,
        focus_marker: Locator,
        summary: Locator,
    ) -> Self {
        Self {
            waiter,
            anchor,
            focus_marker,
            summary,
            settle_ms: 50,
            confirm_settle_ms: 150,
            signal_timeout_ms: 2_000,
        }
    }

    /// Pause used when no focus marker is rendered
    #[must_use]
    pub const fn with_settle_ms(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Pause after Enter while the grid re-renders the selection
    #[must_use]
    pub const fn with_confirm_settle_ms(mut self, settle_ms: u64) -> Self {
        self.confirm_settle_ms = settle_ms;
        self
    }

    /// Bound on waiting for the focus marker to move
    #[must_use]
    pub const fn with_signal_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.signal_timeout_ms = timeout_ms;
        self
    }

    /// Resolve the anchor cell and click it to put keyboard focus in the grid.
    pub fn focus_anchor(&self) -> WizardResult<ElementHandle> {
        let found = self.anchor.resolve(self.waiter.session())?;
        tracing::info!(tier = found.tier, element = %found.element, "calendar anchor resolved");
        self.waiter.session().click(&found.element)?;
        Ok(found.element)
    }

    /// Move focus `days` cells to the right.
    pub fn advance(&self, days: u32) -> WizardResult<()> {
        for step in 0..days {
            let before = self.read_focus_marker()?;
            self.waiter.session().press_key(Key::ArrowRight)?;
            match before {
                Some(label) => self.await_focus_change(&label, step)?,
                None => self.waiter.settle(self.settle_ms),
            }
        }
        Ok(())
    }

    /// Confirm the focused cell.
    pub fn confirm(&self) -> WizardResult<()> {
        self.waiter.session().press_key(Key::Enter)?;
        self.waiter.settle(self.confirm_settle_ms);
        Ok(())
    }

    /// Select `start_offset` cells after the anchor as start and
    /// `duration` further cells as end, then wait for the summary to contain
    /// `expected_summary`.
    pub fn select(
        &self,
        start_offset: u32,
        duration: u32,
        expected_summary: &str,
    ) -> WizardResult<String> {
        self.waiter.wait_visible(&self.summary)?;
        self.focus_anchor()?;
        self.advance(start_offset)?;
        self.confirm()?;
        self.advance(duration)?;
        self.confirm()?;
        self.waiter.wait_text_contains(&self.summary, expected_summary)
    }

    fn read_focus_marker(&self) -> WizardResult<Option<String>> {
        let session = self.waiter.session();
        let Some(cell) = session
            .find_elements(self.focus_marker.selector())?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        let label = match session.attribute(&cell, "aria-label") {
            Ok(Some(label)) => Some(label),
            Ok(None) => Some(session.text(&cell)?),
            Err(e) if e.is_stale() => None,
            Err(e) => return Err(e),
        };
        Ok(label)
    }

    fn await_focus_change(&self, before: &str, step: u32) -> WizardResult<()> {
        let options = WaitOptions::new()
            .with_timeout(self.signal_timeout_ms)
            .with_poll_interval(self.waiter.options().poll_interval_ms.min(25));
        let signal = Waiter::new(self.waiter.session(), options);
        let condition =
            WaitCondition::Custom(format!("focused day to move past '{before}' (step {step})"));
        signal.wait_until(&condition, || match self.read_focus_marker()? {
            Some(now) if now != before => Ok(Observation::Met(())),
            Some(now) => Ok(Observation::Pending(format!("focus still on '{now}'"))),
            None => Ok(Observation::Pending("focused day not rendered".to_string())),
        })
    }
}

/// Direct entry into two date inputs.
#[derive(Debug)]
pub struct TextEntryForm<'w, 's, S: BrowserSession + ?Sized> {
    waiter: &'w Waiter<'s, S>,
    start_input: Locator,
    end_input: Locator,
    summary: Locator,
}

impl<'w, 's, S: BrowserSession + ?Sized> TextEntryForm<'w, 's, S> {
    /// Create a driver
    pub fn new(
        waiter: &'w Waiter<'s, S>,
        start_input: Locator,
        end_input: Locator,
        summary: Locator,
    ) -> Self {
        Self {
            waiter,
            start_input,
            end_input,
            summary,
        }
    }

    /// Type the range and wait for the summary to equal `expected_summary`.
    pub fn fill(&self, range: &DateRange, expected_summary: &str) -> WizardResult<String> {
        self.replace(&self.start_input, &range.start_input())?;
        self.replace(&self.end_input, &range.end_input())?;
        self.waiter.wait_text_equals(&self.summary, expected_summary)
    }

    fn replace(&self, input: &Locator, value: &str) -> WizardResult<()> {
        let session = self.waiter.session();
        let element = self.waiter.wait_clickable(input)?;
        session.clear(&element)?;
        session.send_keys(&element, value)?;
        tracing::debug!(input = %input, value, "date typed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::date_range::summary_text;
    use crate::mock::{MockCalendar, MockElement, MockPage, MockSession, RangeCounting};
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn grid(with_marker: bool) -> MockSession {
        let session = MockSession::new();
        let mut page = MockPage::new("/wizard/date")
            .with(MockElement::new("grid").css(".grid"))
            .with(
                MockElement::new("today")
                    .css("button[aria-current='date']")
                    .child_of("grid")
                    .focuses(today()),
            )
            .with(MockElement::new("summary").css(".summary"));
        if with_marker {
            page = page.with(MockElement::new("marker").css("button[tabindex='0']"));
        }
        session.add_page(page);
        let mut calendar = MockCalendar::new("summary");
        if with_marker {
            calendar = calendar.with_highlight("marker");
        }
        session.install_calendar(calendar);
        session.set_url("https://x/wizard/date");
        session
    }

    fn anchor() -> LocatorChain {
        LocatorChain::new("anchor")
            .then(Locator::css("button[aria-current='date']"))
            .then_within(Locator::css(".grid"), Locator::css("button").first())
    }

    fn keyboard<'w, 's>(waiter: &'w Waiter<'s, MockSession>) -> KeyboardCalendar<'w, 's, MockSession> {
        KeyboardCalendar::new(
            waiter,
            anchor(),
            Locator::css("button[tabindex='0']"),
            Locator::css(".summary"),
        )
        .with_settle_ms(1)
        .with_confirm_settle_ms(1)
        .with_signal_timeout_ms(200)
    }

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(300).with_poll_interval(5)
    }

    mod keyboard_tests {
        use super::*;

        #[test]
        fn test_full_selection_contains_summary() {
            let session = grid(true);
            let waiter = Waiter::new(&session, fast());
            let text = keyboard(&waiter).select(7, 30, &summary_text(30)).unwrap();
            assert!(text.contains("סה\"כ: 30 ימים"));
            let cal = session.calendar().unwrap();
            assert_eq!(cal.start(), Some(today() + Days::new(7)));
            assert_eq!(cal.end(), Some(today() + Days::new(37)));
        }

        #[test]
        fn test_key_sequence() {
            let session = grid(false);
            let waiter = Waiter::new(&session, fast());
            keyboard(&waiter).select(2, 1, &summary_text(1)).unwrap();
            assert_eq!(
                session.presses(),
                vec![Key::ArrowRight, Key::ArrowRight, Key::Enter, Key::ArrowRight, Key::Enter]
            );
            assert_eq!(session.clicks(), vec!["today".to_string()]);
        }

        #[test]
        fn test_confirm_uses_its_own_pause() {
            let session = grid(true);
            let waiter = Waiter::new(&session, fast());
            let calendar = keyboard(&waiter).with_settle_ms(0).with_confirm_settle_ms(40);
            calendar.focus_anchor().unwrap();
            let started = std::time::Instant::now();
            calendar.confirm().unwrap();
            calendar.confirm().unwrap();
            assert!(started.elapsed() >= std::time::Duration::from_millis(80));
            assert_eq!(session.presses(), vec![Key::Enter, Key::Enter]);
        }

        #[test]
        fn test_marker_that_never_moves_times_out() {
            let session = grid(true);
            session.install_calendar(MockCalendar::new("summary"));
            session.set_text("marker", "");
            let waiter = Waiter::new(&session, fast());
            let calendar = keyboard(&waiter);
            calendar.focus_anchor().unwrap();
            let err = calendar.advance(1).unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("focused day"));
        }

        #[test]
        fn test_no_anchor_sends_no_keys() {
            let session = MockSession::new();
            session.add_page(MockPage::new("/wizard/date").with(MockElement::new("grid").css(".grid")));
            session.set_url("https://x/wizard/date");
            let waiter = Waiter::new(&session, fast());
            let err = keyboard(&waiter).focus_anchor().unwrap_err();
            assert!(matches!(err, crate::WizardError::ElementNotFound { .. }));
            assert!(session.presses().is_empty());
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(61))]
            #[test]
            fn prop_traversal_lands_on_today_plus_n(n in 0u32..=60) {
                let session = grid(true);
                let waiter = Waiter::new(&session, fast());
                let calendar = keyboard(&waiter);
                calendar.focus_anchor().unwrap();
                calendar.advance(n).unwrap();
                let focused = session.calendar().unwrap().focused().unwrap();
                prop_assert_eq!(focused, today() + Days::new(u64::from(n)));
            }
        }
    }

    mod text_entry_tests {
        use super::*;
        use crate::date_range::DateRange;

        #[test]
        fn test_fill_types_both_inputs() {
            let session = MockSession::new();
            session.add_page(
                MockPage::new("/wizard/date")
                    .with(MockElement::new("start").css("input[name='startDate']").input())
                    .with(MockElement::new("end").css("input[name='endDate']").input())
                    .with(MockElement::new("summary").css(".summary")),
            );
            session.install_calendar(
                MockCalendar::new("summary")
                    .with_inputs("start", "end")
                    .with_counting(RangeCounting::Inclusive),
            );
            session.set_url("https://x/wizard/date");
            let waiter = Waiter::new(&session, fast());
            let form = TextEntryForm::new(
                &waiter,
                Locator::css("input[name='startDate']"),
                Locator::css("input[name='endDate']"),
                Locator::css(".summary"),
            );
            let range = DateRange::inclusive(today(), 7, 30).unwrap();
            form.fill(&range, &summary_text(30)).unwrap();
            assert_eq!(session.value("start"), "26/10/2026");
            assert_eq!(session.value("end"), "24/11/2026");
        }
    }
}
