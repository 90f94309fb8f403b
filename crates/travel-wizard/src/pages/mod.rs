//! The four wizard screens.
//!
//! | Screen | URL fragment | Marker |
//! |--------|--------------|--------|
//! | [`HomePage`] | `/travel-policy` | first-purchase button |
//! | [`DestinationPage`] | `/wizard/destination` | screen title |
//! | [`DatePage`] | `/wizard/date` | calendar container |
//! | [`TravelersPage`] | `/wizard/travelers` | travelers heading |

mod date;
mod destination;
mod home;
mod travelers;

pub use date::DatePage;
pub use destination::{Destination, DestinationPage};
pub use home::HomePage;
pub use travelers::TravelersPage;

pub(crate) use date::{
    CALENDAR_CSS, DATE_FRAGMENT, END_INPUT_CSS, FALLBACK_DAY_XPATH, FOCUSED_DAY_CSS,
    NEXT_BUTTON_ID, START_INPUT_CSS, SUMMARY_CSS, TODAY_CSS,
};
pub(crate) use destination::{
    DESTINATION_FRAGMENT, DESTINATION_NEXT_XPATH, SCREEN_TITLE_ID, SCREEN_TITLE_TEXT,
};
pub(crate) use home::{FIRST_PURCHASE_XPATH, HOME_FRAGMENT};
pub(crate) use travelers::{TRAVELERS_FRAGMENT, TRAVELERS_HEADING_TEXT, TRAVELERS_HEADING_XPATH};
