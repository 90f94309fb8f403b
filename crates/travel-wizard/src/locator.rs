//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a declarative selector plus the cardinality the caller
//! expects. Locators never touch the browser on their own; the
//! [`Waiter`](crate::wait::Waiter) and [`LocatorChain`] resolve them against a
//! [`BrowserSession`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{WizardError, WizardResult};
use crate::session::{BrowserSession, ElementHandle};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selector {
    /// CSS selector (e.g., "button[aria-current='date']")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element id attribute
    Id(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// The CSS form of this selector, if it has one
    #[must_use]
    pub fn as_css(&self) -> Option<String> {
        match self {
            Self::Css(s) => Some(s.clone()),
            Self::Id(id) => Some(format!("#{id}")),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css '{s}'"),
            Self::XPath(s) => write!(f, "xpath '{s}'"),
            Self::Id(s) => write!(f, "id '{s}'"),
        }
    }
}

/// How many matches the caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cardinality {
    /// Exactly one element must match
    #[default]
    ExactlyOne,
    /// Any number may match; the first in document order is used
    First,
}

/// A named selector with an expected cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    name: Option<String>,
    cardinality: Cardinality,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            name: None,
            cardinality: Cardinality::ExactlyOne,
        }
    }

    /// CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::from_selector(Selector::xpath(expr))
    }

    /// Id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::id(id))
    }

    /// Attach a human-readable name used in diagnostics
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Accept several matches and act on the first
    #[must_use]
    pub const fn first(mut self) -> Self {
        self.cardinality = Cardinality::First;
        self
    }

    /// The underlying selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Expected cardinality
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Description for logs and error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.selector),
            None => self.selector.to_string(),
        }
    }

    /// Pick the element this locator designates out of a match list.
    ///
    /// Returns `None` when the match count violates the cardinality.
    #[must_use]
    pub fn pick(&self, mut matches: Vec<ElementHandle>) -> Option<ElementHandle> {
        match (self.cardinality, matches.len()) {
            (_, 0) => None,
            (Cardinality::ExactlyOne, 1) | (Cardinality::First, _) => Some(matches.swap_remove(0)),
            (Cardinality::ExactlyOne, _) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Where a chain tier searches.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Document,
    /// Inside the element matched by the container locator, after clicking it
    FocusedContainer(Locator),
}

/// A fallback chain tier.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tier {
    locator: Locator,
    scope: Scope,
}

/// Element resolved through a [`LocatorChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMatch {
    /// Index of the tier that matched
    pub tier: usize,
    /// Matched element
    pub element: ElementHandle,
}

/// Ordered list of candidate locators; the first non-empty tier wins.
///
/// A tier is evaluated only when every earlier tier resolved to zero
/// elements. A tier that resolves to elements is used even if a later tier
/// would have matched too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorChain {
    name: String,
    tiers: Vec<Tier>,
}

impl LocatorChain {
    /// Create an empty chain
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tiers: Vec::new(),
        }
    }

    /// Append a document-scoped tier
    #[must_use]
    pub fn then(mut self, locator: Locator) -> Self {
        self.tiers.push(Tier {
            locator,
            scope: Scope::Document,
        });
        self
    }

    /// Append a tier that clicks `container` to focus it and then searches
    /// for `locator` among its descendants
    #[must_use]
    pub fn then_within(mut self, container: Locator, locator: Locator) -> Self {
        self.tiers.push(Tier {
            locator,
            scope: Scope::FocusedContainer(container),
        });
        self
    }

    /// Number of tiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the chain has no tiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Resolve the chain once against the current document.
    pub fn resolve<S: BrowserSession + ?Sized>(&self, session: &S) -> WizardResult<ChainMatch> {
        for (index, tier) in self.tiers.iter().enumerate() {
            let matches = match &tier.scope {
                Scope::Document => session.find_elements(tier.locator.selector())?,
                Scope::FocusedContainer(container) => {
                    let found = session.find_elements(container.selector())?;
                    let Some(container_el) = container.pick(found) else {
                        tracing::debug!(tier = index, container = %container, "chain container absent");
                        continue;
                    };
                    session.click(&container_el)?;
                    session.find_within(&container_el, tier.locator.selector())?
                }
            };
            if matches.is_empty() {
                tracing::debug!(chain = %self.name, tier = index, locator = %tier.locator, "tier resolved to zero elements");
                continue;
            }
            if let Some(element) = tier.locator.clone().first().pick(matches) {
                tracing::debug!(chain = %self.name, tier = index, locator = %tier.locator, "tier matched");
                return Ok(ChainMatch {
                    tier: index,
                    element,
                });
            }
        }
        Err(WizardError::ElementNotFound {
            locator: format!("{} [{}]", self.name, self.describe_tiers()),
        })
    }

    fn describe_tiers(&self) -> String {
        self.tiers
            .iter()
            .map(|t| match &t.scope {
                Scope::Document => t.locator.describe(),
                Scope::FocusedContainer(c) => format!("{} within {}", t.locator, c),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Whitespace-trimmed, byte-for-byte equality
#[must_use]
pub fn text_matches_exactly(actual: &str, expected: &str) -> bool {
    actual.trim().as_bytes() == expected.trim().as_bytes()
}

/// Whitespace-trimmed substring match
#[must_use]
pub fn text_contains(actual: &str, expected: &str) -> bool {
    actual.trim().contains(expected.trim())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage, MockSession};

    mod selector_tests {
        use super::*;

        #[test]
        fn test_selector_display() {
            assert_eq!(Selector::css("#a").to_string(), "css '#a'");
            assert_eq!(Selector::xpath("//h2").to_string(), "xpath '//h2'");
            assert_eq!(Selector::id("nextButton").to_string(), "id 'nextButton'");
        }

        #[test]
        fn test_as_css() {
            assert_eq!(Selector::id("x").as_css().as_deref(), Some("#x"));
            assert_eq!(Selector::css("a > b").as_css().as_deref(), Some("a > b"));
            assert!(Selector::xpath("//a").as_css().is_none());
        }
    }

    mod locator_tests {
        use super::*;

        fn handles(n: usize) -> Vec<ElementHandle> {
            (0..n).map(|i| ElementHandle::new(format!("el-{i}"))).collect()
        }

        #[test]
        fn test_exactly_one_rejects_many() {
            let loc = Locator::css("button");
            assert!(loc.pick(handles(0)).is_none());
            assert_eq!(loc.pick(handles(1)).unwrap().id(), "el-0");
            assert!(loc.pick(handles(3)).is_none());
        }

        #[test]
        fn test_first_accepts_many() {
            let loc = Locator::css("button").first();
            assert_eq!(loc.cardinality(), Cardinality::First);
            assert_eq!(loc.pick(handles(3)).unwrap().id(), "el-0");
        }

        #[test]
        fn test_named_description() {
            let loc = Locator::id("nextButton").named("next");
            assert_eq!(loc.describe(), "next (id 'nextButton')");
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_rtl_exact_match_after_trim() {
            assert!(text_matches_exactly(
                "  נשמח להכיר את הנוסעים שנבטח הפעם\n",
                "נשמח להכיר את הנוסעים שנבטח הפעם"
            ));
            assert!(!text_matches_exactly("נשמח להכיר", "נשמח להכיר את"));
        }

        #[test]
        fn test_contains_tolerates_surroundings() {
            assert!(text_contains("תאריכים | סה\"כ: 30 ימים | עריכה", "סה\"כ: 30 ימים"));
            assert!(!text_contains("סה\"כ: 31 ימים", "סה\"כ: 30 ימים"));
        }
    }

    mod chain_tests {
        use super::*;

        fn chain() -> LocatorChain {
            LocatorChain::new("calendar anchor")
                .then(Locator::css("button[aria-current='date']"))
                .then(Locator::xpath("//div[@id='grid']/button"))
                .then_within(Locator::css("#grid"), Locator::css("button"))
        }

        #[test]
        fn test_primary_tier_wins() {
            let session = MockSession::new();
            session.add_page(
                MockPage::new("/wizard/date")
                    .with(MockElement::new("today").css("button[aria-current='date']"))
                    .with(MockElement::new("path").xpath("//div[@id='grid']/button")),
            );
            session.set_url("https://x/wizard/date");
            let found = chain().resolve(&session).unwrap();
            assert_eq!(found.tier, 0);
            assert_eq!(found.element, session.handle_of("today"));
        }

        #[test]
        fn test_secondary_used_when_primary_empty() {
            let session = MockSession::new();
            session.add_page(
                MockPage::new("/wizard/date")
                    .with(MockElement::new("path").xpath("//div[@id='grid']/button")),
            );
            session.set_url("https://x/wizard/date");
            let found = chain().resolve(&session).unwrap();
            assert_eq!(found.tier, 1);
            assert_eq!(found.element, session.handle_of("path"));
            assert_eq!(session.clicks(), Vec::<String>::new());
        }

        #[test]
        fn test_container_tier_clicks_container_first() {
            let session = MockSession::new();
            session.add_page(
                MockPage::new("/wizard/date")
                    .with(MockElement::new("grid").css("#grid"))
                    .with(MockElement::new("day-1").css("button").child_of("grid")),
            );
            session.set_url("https://x/wizard/date");
            let found = chain().resolve(&session).unwrap();
            assert_eq!(found.tier, 2);
            assert_eq!(found.element, session.handle_of("day-1"));
            assert_eq!(session.clicks(), vec!["grid".to_string()]);
        }

        #[test]
        fn test_exhausted_chain_is_element_not_found() {
            let session = MockSession::new();
            session.add_page(MockPage::new("/wizard/date").with(MockElement::new("grid").css("#grid")));
            session.set_url("https://x/wizard/date");
            let err = chain().resolve(&session).unwrap_err();
            match err {
                WizardError::ElementNotFound { locator } => {
                    assert!(locator.contains("calendar anchor"));
                    assert!(locator.contains("aria-current"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
