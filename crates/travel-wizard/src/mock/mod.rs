//! Scriptable in-memory browser session.
//!
//! [`MockSession`] implements [`BrowserSession`](crate::session::BrowserSession)
//! over a small DOM model: pages keyed by URL fragment, elements with
//! selectors, text, attributes and click effects, plus a calendar widget
//! that reacts to arrow/enter keys and typed date inputs. Clones share
//! state, so a test can keep a handle while the fixture owns the session.
//!
//! ```rust,ignore
//! let session = MockSession::travel_wizard(BASE_URL, today, CalendarMode::Keyboard);
//! let report = TravelFlow::new(&config).run(&session)?;
//! assert_eq!(session.url_reads(), 4);
//! ```

mod calendar;
mod session;
mod wizard;

pub use calendar::{MockCalendar, RangeCounting};
pub use session::{ClickEffect, MockElement, MockEvent, MockPage, MockSession};
pub use wizard::{CalendarMode, KEYBOARD_SUMMARY_PREFIX};
