//! Travel Wizard: End-to-End Driver for the Travel-Insurance Purchase Wizard
//!
//! Walks a browser from the travel-policy landing page through destination
//! and date selection to the travelers step, synchronizing every interaction
//! on observable DOM state instead of fixed sleeps.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TRAVEL WIZARD Architecture                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ TravelFlow │───►│ Page       │───►│ Waiter     │            │
//! │   │ (fixture)  │    │ Objects    │    │ (polling)  │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │                          ┌──────────────────────────────┐       │
//! │                          │ BrowserSession               │       │
//! │                          │  MockSession │ CdpSession    │       │
//! │                          └──────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use travel_wizard::{run_scenario, DirectorySink, TravelFlow, WizardConfig};
//!
//! let config = WizardConfig::default();
//! let mut sink = DirectorySink::create(&config.artifacts_dir)?;
//! let session = CdpSession::launch(&LaunchOptions::from_config(&config))?;
//! let outcome = run_scenario("purchase wizard", session, &mut sink, |s| {
//!     TravelFlow::new(&config).run(s).map(|_| ())
//! });
//! ```

#![warn(missing_docs)]

mod calendar;
pub mod config;
mod date_range;
pub mod fixture;
mod flow;
mod locator;
pub mod mock;
mod page_object;
pub mod pages;
pub mod reporter;
mod result;
mod session;
pub mod wait;

/// Chrome `DevTools` Protocol backend
#[cfg(feature = "browser")]
#[allow(clippy::missing_const_for_fn)]
pub mod cdp;

pub use calendar::{KeyboardCalendar, TextEntryForm};
pub use config::{BrowserKind, TimeoutConfig, WizardConfig};
pub use date_range::{
    format_input, parse_input, summary_days, summary_text, DateRange, DateRangeSelector,
    RangeStrategy, DEFAULT_DURATION_DAYS, DEFAULT_START_OFFSET_DAYS,
};
pub use fixture::{run_scenario, run_with_provider, SessionGuard, SessionProvider};
pub use flow::{FlowReport, FlowStep, TravelFlow};
pub use locator::{
    text_contains, text_matches_exactly, Cardinality, ChainMatch, Locator, LocatorChain, Selector,
};
pub use page_object::PageObject;
pub use pages::{DatePage, Destination, DestinationPage, HomePage, TravelersPage};
pub use reporter::{DirectorySink, MemorySink, ReportSink, ScenarioOutcome, TestStatus};
pub use result::{WizardError, WizardResult};
pub use session::{BrowserSession, ElementHandle, Key};
pub use wait::{Observation, WaitCondition, WaitOptions, Waiter};

#[cfg(feature = "browser")]
pub use cdp::{CdpProvider, CdpSession, LaunchOptions};
