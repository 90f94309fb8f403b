//! Ready-made four-screen travel wizard for flow tests.

use chrono::NaiveDate;

use super::calendar::{MockCalendar, RangeCounting};
use super::session::{MockElement, MockPage, MockSession};
use crate::pages::{
    CALENDAR_CSS, DATE_FRAGMENT, DESTINATION_FRAGMENT, DESTINATION_NEXT_XPATH, END_INPUT_CSS,
    FIRST_PURCHASE_XPATH, FOCUSED_DAY_CSS, HOME_FRAGMENT, NEXT_BUTTON_ID, SCREEN_TITLE_ID,
    SCREEN_TITLE_TEXT, START_INPUT_CSS, SUMMARY_CSS, TODAY_CSS, TRAVELERS_FRAGMENT,
    TRAVELERS_HEADING_TEXT, TRAVELERS_HEADING_XPATH,
};

/// Which date widget the mock date screen renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarMode {
    /// Day grid with today's cell marked `aria-current`; counts nights
    #[default]
    Keyboard,
    /// Day grid without the `aria-current` marker; today is the first button
    /// inside the calendar container
    KeyboardUnmarked,
    /// Start/end text inputs; counts both ends
    TextEntry,
}

/// Summary prefix rendered by the keyboard widget
pub const KEYBOARD_SUMMARY_PREFIX: &str = "תאריכי הנסיעה | ";

impl MockSession {
    /// Session rendering the whole purchase wizard under `base_url`.
    ///
    /// Element keys: `first-purchase`, `screen-title`, `destination-<n>`,
    /// `destination-next`, `calendar`, `today`, `focused-day`, `start-date`,
    /// `end-date`, `total-days`, `date-next`, `travelers-heading`.
    #[must_use]
    pub fn travel_wizard(base_url: &str, today: NaiveDate, mode: CalendarMode) -> Self {
        let base = base_url.trim_end_matches('/');
        let session = Self::new();

        session.add_page(
            MockPage::new(HOME_FRAGMENT).with(
                MockElement::new("first-purchase")
                    .xpath(FIRST_PURCHASE_XPATH)
                    .text("לרכישה ראשונה")
                    .navigates_to(format!("{base}{DESTINATION_FRAGMENT}")),
            ),
        );

        let mut destination = MockPage::new(DESTINATION_FRAGMENT).with(
            MockElement::new("screen-title")
                .id(SCREEN_TITLE_ID)
                .text(format!("{SCREEN_TITLE_TEXT}?")),
        );
        for n in 1..=8 {
            destination = destination.with(
                MockElement::new(format!("destination-{n}")).css(format!("#destination-{n} > svg")),
            );
        }
        session.add_page(
            destination.with(
                MockElement::new("destination-next")
                    .xpath(DESTINATION_NEXT_XPATH)
                    .text("להמשיך")
                    .navigates_to(format!("{base}{DATE_FRAGMENT}")),
            ),
        );

        let mut date = MockPage::new(DATE_FRAGMENT)
            .with(MockElement::new("calendar").css(CALENDAR_CSS))
            .with(MockElement::new("total-days").css(SUMMARY_CSS))
            .with(
                MockElement::new("date-next")
                    .id(NEXT_BUTTON_ID)
                    .navigates_to(format!("{base}{TRAVELERS_FRAGMENT}")),
            );
        let calendar = match mode {
            CalendarMode::Keyboard | CalendarMode::KeyboardUnmarked => {
                let mut cell = MockElement::new("today")
                    .css("button")
                    .child_of("calendar")
                    .focuses(today);
                if mode == CalendarMode::Keyboard {
                    cell = cell.css(TODAY_CSS);
                }
                date = date
                    .with(cell)
                    .with(MockElement::new("focused-day").css(FOCUSED_DAY_CSS));
                MockCalendar::new("total-days")
                    .with_highlight("focused-day")
                    .with_summary_prefix(KEYBOARD_SUMMARY_PREFIX)
            }
            CalendarMode::TextEntry => {
                date = date
                    .with(MockElement::new("start-date").css(START_INPUT_CSS).input())
                    .with(MockElement::new("end-date").css(END_INPUT_CSS).input());
                MockCalendar::new("total-days")
                    .with_inputs("start-date", "end-date")
                    .with_counting(RangeCounting::Inclusive)
            }
        };
        session.add_page(date);
        session.install_calendar(calendar);

        session.add_page(
            MockPage::new(TRAVELERS_FRAGMENT).with(
                MockElement::new("travelers-heading")
                    .xpath(TRAVELERS_HEADING_XPATH)
                    .text(format!(" {TRAVELERS_HEADING_TEXT} ")),
            ),
        );
        session
    }
}
