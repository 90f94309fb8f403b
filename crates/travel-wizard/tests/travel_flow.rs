//! End-to-end runs of the purchase wizard against the in-memory session.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{Days, NaiveDate};
use travel_wizard::mock::{CalendarMode, MockEvent, MockSession, KEYBOARD_SUMMARY_PREFIX};
use travel_wizard::{
    run_scenario, summary_text, BrowserSession, DatePage, DateRangeSelector, DestinationPage,
    HomePage, Key, MemorySink, PageObject, RangeStrategy, TestStatus, TimeoutConfig, TravelFlow,
    WizardConfig, WizardError,
};

const BASE_URL: &str = "https://travel.test/travel-policy";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn config(strategy: RangeStrategy) -> WizardConfig {
    let mut config = WizardConfig {
        base_url: BASE_URL.to_string(),
        timeouts: TimeoutConfig::uniform(400, 5),
        ..WizardConfig::default()
    };
    config.date = DateRangeSelector::new(strategy).with_today(today());
    config.date.settle_ms = 1;
    config.date.confirm_settle_ms = 1;
    config.date.signal_timeout_ms = 200;
    config
}

fn wizard(mode: CalendarMode) -> MockSession {
    MockSession::travel_wizard(BASE_URL, today(), mode)
}

mod flow_tests {
    use super::*;

    #[test]
    fn test_keyboard_flow_reaches_travelers() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let report = TravelFlow::new(&config).run(&session).unwrap();

        assert!(session.url().ends_with("/wizard/travelers"));
        assert_eq!(report.pages(), vec!["home", "destination", "date", "travelers"]);
        let range = report.range.unwrap();
        assert_eq!(range.start, today() + Days::new(7));
        assert_eq!(range.end, today() + Days::new(37));

        let calendar = session.calendar().unwrap();
        assert_eq!(calendar.start(), Some(range.start));
        assert_eq!(calendar.end(), Some(range.end));
        assert_eq!(
            calendar.summary().unwrap(),
            format!("{KEYBOARD_SUMMARY_PREFIX}{}", summary_text(30))
        );
    }

    #[test]
    fn test_text_entry_flow_reaches_travelers() {
        let session = wizard(CalendarMode::TextEntry);
        let config = config(RangeStrategy::TextEntry);
        let report = TravelFlow::new(&config).run(&session).unwrap();

        assert!(session.url().ends_with("/wizard/travelers"));
        let range = report.range.unwrap();
        assert_eq!(range.end, today() + Days::new(36));
        assert_eq!(session.value("start-date"), "26/10/2026");
        assert_eq!(session.value("end-date"), "24/11/2026");
        assert!(session.presses().is_empty());
    }

    #[test]
    fn test_one_url_wait_per_transition() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let _ = TravelFlow::new(&config).run(&session).unwrap();
        assert_eq!(session.url_reads(), 4);
    }

    #[test]
    fn test_actions_happen_on_the_page_that_owns_them() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let _ = TravelFlow::new(&config).run(&session).unwrap();

        let clicks: Vec<(String, String)> = session
            .events()
            .into_iter()
            .filter_map(|e| match e {
                MockEvent::Click { page, element } => Some((page, element)),
                _ => None,
            })
            .collect();
        let expect = |page: &str, element: &str| (page.to_string(), element.to_string());
        assert_eq!(
            clicks,
            vec![
                expect("/travel-policy", "first-purchase"),
                expect("/wizard/destination", "destination-6"),
                expect("/wizard/destination", "destination-next"),
                expect("/wizard/date", "today"),
                expect("/wizard/date", "date-next"),
            ]
        );
        for event in session.events() {
            if let MockEvent::Press { page, .. } = event {
                assert_eq!(page, "/wizard/date");
            }
        }
    }

    fn assert_confirmed_before_acting(session: &MockSession) {
        let events = session.events();
        let confirmed_at = |fragment: &str| {
            events
                .iter()
                .position(|e| matches!(e, MockEvent::UrlRead(url) if url.contains(fragment)))
        };
        for (at, event) in events.iter().enumerate() {
            let page = match event {
                MockEvent::Click { page, .. }
                | MockEvent::Clear { page, .. }
                | MockEvent::Type { page, .. }
                | MockEvent::Press { page, .. } => page,
                _ => continue,
            };
            let confirmed = confirmed_at(page)
                .unwrap_or_else(|| panic!("{page} acted on without a URL check: {event:?}"));
            assert!(confirmed < at, "{event:?} at {at} precedes the {page} URL check at {confirmed}");
        }
    }

    #[test]
    fn test_no_action_before_page_is_confirmed() {
        for (mode, strategy) in [
            (CalendarMode::Keyboard, RangeStrategy::Keyboard),
            (CalendarMode::KeyboardUnmarked, RangeStrategy::Keyboard),
            (CalendarMode::TextEntry, RangeStrategy::TextEntry),
        ] {
            let session = wizard(mode);
            let config = config(strategy);
            let _ = TravelFlow::new(&config).run(&session).unwrap();
            assert_confirmed_before_acting(&session);
        }
    }

    #[test]
    fn test_keyboard_sequence() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let _ = TravelFlow::new(&config).run(&session).unwrap();

        let mut expected = vec![Key::ArrowRight; 7];
        expected.push(Key::Enter);
        expected.extend(vec![Key::ArrowRight; 30]);
        expected.push(Key::Enter);
        assert_eq!(session.presses(), expected);
    }

    #[test]
    fn test_unmarked_grid_uses_container_fallback() {
        let session = wizard(CalendarMode::KeyboardUnmarked);
        let config = config(RangeStrategy::Keyboard);
        let report = TravelFlow::new(&config).run(&session).unwrap();

        assert_eq!(report.range.unwrap().end, today() + Days::new(37));
        let clicks = session.clicks();
        let calendar_at = clicks.iter().position(|c| c == "calendar").unwrap();
        let today_at = clicks.iter().position(|c| c == "today").unwrap();
        assert!(calendar_at < today_at);
    }

    #[test]
    fn test_year_rollover() {
        let late = NaiveDate::from_ymd_opt(2026, 12, 20).unwrap();
        let session = MockSession::travel_wizard(BASE_URL, late, CalendarMode::Keyboard);
        let mut config = config(RangeStrategy::Keyboard);
        config.date.today = Some(late);
        let report = TravelFlow::new(&config).run(&session).unwrap();
        assert_eq!(
            report.range.unwrap().end,
            NaiveDate::from_ymd_opt(2027, 1, 26).unwrap()
        );
    }

    #[test]
    fn test_strategy_mismatch_fails_before_any_key_press() {
        let session = wizard(CalendarMode::TextEntry);
        let config = config(RangeStrategy::Keyboard);
        let err = TravelFlow::new(&config).run(&session).unwrap_err();
        assert!(matches!(err, WizardError::ElementNotFound { .. }), "{err}");
        assert!(session.presses().is_empty());
        assert!(session.url().ends_with("/wizard/date"));
    }
}

mod page_tests {
    use super::*;

    #[test]
    fn test_is_loaded_is_repeatable() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let home = HomePage::new(&session, BASE_URL, config.timeouts.home());
        home.open().unwrap();
        home.is_loaded().unwrap();
        home.is_loaded().unwrap();
        assert_eq!(session.clicks().len(), 0);
    }

    #[test]
    fn test_is_loaded_fails_loudly_on_wrong_page() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        session.navigate(BASE_URL).unwrap();
        let page = DestinationPage::new(&session, config.timeouts.destination());
        let err = page.is_loaded().unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("/wizard/destination"));
        let again = page.is_loaded().unwrap_err();
        assert!(again.is_timeout());
    }

    #[test]
    fn test_date_page_reports_its_fragment() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let page = DatePage::new(&session, config.timeouts.date());
        assert_eq!(page.url_fragment(), "/wizard/date");
        assert_eq!(page.load_timeout_ms(), 400);
    }
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_passing_scenario_quits_once_without_attachments() {
        let session = wizard(CalendarMode::Keyboard);
        let config = config(RangeStrategy::Keyboard);
        let mut sink = MemorySink::new();
        let outcome = run_scenario("purchase wizard", session.clone(), &mut sink, |s| {
            TravelFlow::new(&config).run(s).map(|_| ())
        });
        assert_eq!(outcome.status, TestStatus::Passed);
        assert!(sink.attachments().is_empty());
        assert_eq!(session.quit_calls(), 1);
    }

    #[test]
    fn test_failing_scenario_captures_the_failing_page() {
        let session = wizard(CalendarMode::TextEntry);
        let config = config(RangeStrategy::Keyboard);
        let mut sink = MemorySink::new();
        let outcome = run_scenario("purchase wizard", session.clone(), &mut sink, |s| {
            TravelFlow::new(&config).run(s).map(|_| ())
        });
        assert_eq!(outcome.status, TestStatus::Failed);
        assert_eq!(sink.attachments().len(), 2);
        let source = sink.named("Page Source").next().unwrap();
        assert_eq!(source.mime_type, "text/html");
        assert!(String::from_utf8_lossy(&source.bytes).contains("/wizard/date"));
        assert_eq!(session.quit_calls(), 1);
    }

    #[test]
    fn test_panicking_scenario_still_quits() {
        let session = wizard(CalendarMode::Keyboard);
        let mut sink = MemorySink::new();
        let outcome = run_scenario("purchase wizard", session.clone(), &mut sink, |_| {
            panic!("layout changed")
        });
        assert_eq!(outcome.status, TestStatus::Broken);
        assert_eq!(session.quit_calls(), 1);
        assert!(session.current_url().is_err());
    }
}

/// Live run against the production site; needs a local Chrome.
#[cfg(feature = "browser")]
#[test]
#[ignore = "drives a real browser against the public site"]
fn live_purchase_wizard() {
    use travel_wizard::{run_with_provider, CdpProvider, DirectorySink};

    let mut config = WizardConfig::default();
    config.apply_env().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::create(artifacts.path()).unwrap();
    let provider = CdpProvider::new(&config);
    let outcome = run_with_provider("purchase wizard", &provider, &mut sink, |s| {
        TravelFlow::new(&config).run(s).map(|_| ())
    })
    .unwrap();
    assert_eq!(outcome.status, TestStatus::Passed, "{}", outcome.summary());
}
