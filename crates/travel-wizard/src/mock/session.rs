//! In-memory DOM and the [`MockSession`] that drives it.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::calendar::MockCalendar;
use crate::locator::Selector;
use crate::result::{WizardError, WizardResult};
use crate::session::{BrowserSession, ElementHandle, Key};

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Navigate to a URL
    Navigate(String),
    /// Move calendar focus to a date
    FocusDate(NaiveDate),
}

/// A scripted element.
#[derive(Debug, Clone)]
pub struct MockElement {
    key: String,
    selectors: Vec<Selector>,
    parent: Option<String>,
    text: String,
    attributes: BTreeMap<String, String>,
    displayed: bool,
    enabled: bool,
    on_click: Option<ClickEffect>,
    appear_after: u32,
    stale_reads: u32,
    value: Option<String>,
}

impl MockElement {
    /// Create an element identified by `key` in logs and helpers
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            selectors: Vec::new(),
            parent: None,
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            on_click: None,
            appear_after: 0,
            stale_reads: 0,
            value: None,
        }
    }

    /// Match a CSS selector
    #[must_use]
    pub fn css(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(Selector::css(selector));
        self
    }

    /// Match an XPath expression
    #[must_use]
    pub fn xpath(mut self, expr: impl Into<String>) -> Self {
        self.selectors.push(Selector::xpath(expr));
        self
    }

    /// Match an id
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.selectors.push(Selector::id(id));
        self
    }

    /// Rendered text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Present in the DOM but zero-sized
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Disabled or covered
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Nest under another element
    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Clicking navigates
    #[must_use]
    pub fn navigates_to(mut self, url: impl Into<String>) -> Self {
        self.on_click = Some(ClickEffect::Navigate(url.into()));
        self
    }

    /// Clicking focuses a calendar date
    #[must_use]
    pub fn focuses(mut self, date: NaiveDate) -> Self {
        self.on_click = Some(ClickEffect::FocusDate(date));
        self
    }

    /// Invisible to the first `queries` document queries that would match it
    #[must_use]
    pub const fn appears_after(mut self, queries: u32) -> Self {
        self.appear_after = queries;
        self
    }

    /// The next `reads` operations on this element fail as stale
    #[must_use]
    pub const fn stale_times(mut self, reads: u32) -> Self {
        self.stale_reads = reads;
        self
    }

    /// Text input holding a value
    #[must_use]
    pub fn input(mut self) -> Self {
        self.value = Some(String::new());
        self
    }

    fn matches(&self, selector: &Selector) -> bool {
        self.selectors.iter().any(|s| {
            s == selector || (s.as_css().is_some() && s.as_css() == selector.as_css())
        })
    }
}

/// Elements rendered while the URL contains `fragment`.
#[derive(Debug, Clone)]
pub struct MockPage {
    fragment: String,
    elements: Vec<MockElement>,
}

impl MockPage {
    /// Page active whenever the URL contains `fragment`
    #[must_use]
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            elements: Vec::new(),
        }
    }

    /// Add an element
    #[must_use]
    pub fn with(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }
}

/// Observable side of the session, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// `navigate` was called
    Navigate(String),
    /// `current_url` was read
    UrlRead(String),
    /// An element was clicked
    Click {
        /// Active page fragment
        page: String,
        /// Element key
        element: String,
    },
    /// An input was cleared
    Clear {
        /// Active page fragment
        page: String,
        /// Element key
        element: String,
    },
    /// Text was typed
    Type {
        /// Active page fragment
        page: String,
        /// Element key
        element: String,
        /// Typed text
        text: String,
    },
    /// A key was pressed on the focused element
    Press {
        /// Active page fragment
        page: String,
        /// Key
        key: Key,
    },
    /// `quit` was called
    Quit,
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    pages: Vec<MockPage>,
    calendar: Option<MockCalendar>,
    events: Vec<MockEvent>,
    queries: HashMap<String, u32>,
    quit_calls: usize,
    closed: bool,
    fail_screenshot: bool,
    fail_page_source: bool,
}

impl MockState {
    fn active_page(&self) -> Option<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| self.url.contains(&p.fragment))
            .max_by_key(|(_, p)| p.fragment.len())
            .map(|(i, _)| i)
    }

    fn active_fragment(&self) -> String {
        self.active_page()
            .map(|i| self.pages[i].fragment.clone())
            .unwrap_or_default()
    }

    fn ensure_open(&self) -> WizardResult<()> {
        if self.closed {
            return Err(WizardError::session("session has been quit"));
        }
        Ok(())
    }

    fn handle(fragment: &str, key: &str) -> ElementHandle {
        ElementHandle::new(format!("{fragment}::{key}"))
    }

    /// Resolve a handle to a live element on the active page
    fn live(&mut self, handle: &ElementHandle) -> WizardResult<&mut MockElement> {
        self.ensure_open()?;
        let stale = || WizardError::StaleElement {
            element: handle.id().to_string(),
        };
        let (fragment, key) = handle.id().split_once("::").ok_or_else(stale)?;
        let page = self.active_page().ok_or_else(stale)?;
        if self.pages[page].fragment != fragment {
            return Err(stale());
        }
        let element = self.pages[page]
            .elements
            .iter_mut()
            .find(|e| e.key == key)
            .ok_or_else(stale)?;
        if element.stale_reads > 0 {
            element.stale_reads -= 1;
            return Err(stale());
        }
        Ok(element)
    }

    fn set_text(&mut self, key: &str, text: String) {
        for page in &mut self.pages {
            for element in &mut page.elements {
                if element.key == key {
                    element.text.clone_from(&text);
                }
            }
        }
    }

    fn set_attr(&mut self, key: &str, name: &str, value: String) {
        for page in &mut self.pages {
            for element in &mut page.elements {
                if element.key == key {
                    let _ = element.attributes.insert(name.to_string(), value.clone());
                }
            }
        }
    }

    fn value_of(&self, key: &str) -> String {
        self.pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .find(|e| e.key == key)
            .and_then(|e| e.value.clone())
            .unwrap_or_default()
    }

    fn sync_calendar(&mut self) {
        let Some(calendar) = self.calendar.clone() else { return };
        if let Some(highlight) = &calendar.highlight_key {
            if let Some(date) = calendar.focused {
                self.set_attr(highlight, "aria-label", date.format("%Y-%m-%d").to_string());
            }
        }
        if let Some(summary) = calendar.summary() {
            self.set_text(&calendar.summary_key, summary);
        }
    }

    fn sync_inputs(&mut self) {
        let Some(calendar) = self.calendar.as_ref() else { return };
        let (Some(start_key), Some(end_key)) =
            (calendar.start_input_key.clone(), calendar.end_input_key.clone())
        else {
            return;
        };
        let start = self.value_of(&start_key);
        let end = self.value_of(&end_key);
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.typed(&start, &end);
        }
        self.sync_calendar();
    }
}

/// Scriptable browser session; clones share one DOM.
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    /// Empty session at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let session = Self::default();
        session.lock().url = "about:blank".to_string();
        session
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a page
    pub fn add_page(&self, page: MockPage) {
        self.lock().pages.push(page);
    }

    /// Install a calendar widget
    pub fn install_calendar(&self, calendar: MockCalendar) {
        self.lock().calendar = Some(calendar);
    }

    /// Set the URL without recording a navigation
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Rewrite an element's text
    pub fn set_text(&self, key: &str, text: impl Into<String>) {
        self.lock().set_text(key, text.into());
    }

    /// Make `screenshot` fail
    pub fn fail_screenshot(&self) {
        self.lock().fail_screenshot = true;
    }

    /// Make `page_source` fail
    pub fn fail_page_source(&self) {
        self.lock().fail_page_source = true;
    }

    /// Handle for the element with `key`, wherever it lives
    #[must_use]
    pub fn handle_of(&self, key: &str) -> ElementHandle {
        let state = self.lock();
        let fragment = state
            .pages
            .iter()
            .find(|p| p.elements.iter().any(|e| e.key == key))
            .map(|p| p.fragment.clone())
            .unwrap_or_default();
        MockState::handle(&fragment, key)
    }

    /// Every recorded event
    #[must_use]
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Keys of clicked elements, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Click { element, .. } => Some(element.clone()),
                _ => None,
            })
            .collect()
    }

    /// Keys pressed, in order
    #[must_use]
    pub fn presses(&self) -> Vec<Key> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Press { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    /// Number of `current_url` reads
    #[must_use]
    pub fn url_reads(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| matches!(e, MockEvent::UrlRead(_)))
            .count()
    }

    /// Number of `quit` calls
    #[must_use]
    pub fn quit_calls(&self) -> usize {
        self.lock().quit_calls
    }

    /// Current value of an input element
    #[must_use]
    pub fn value(&self, key: &str) -> String {
        self.lock().value_of(key)
    }

    /// Snapshot of the calendar widget
    #[must_use]
    pub fn calendar(&self) -> Option<MockCalendar> {
        self.lock().calendar.clone()
    }

    /// URL the session is at
    #[must_use]
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    fn query(
        &self,
        selector: &Selector,
        parent: Option<&ElementHandle>,
    ) -> WizardResult<Vec<ElementHandle>> {
        let mut state = self.lock();
        state.ensure_open()?;
        let parent_key = match parent {
            Some(handle) => Some(state.live(handle)?.key.clone()),
            None => None,
        };
        let Some(page) = state.active_page() else {
            return Ok(Vec::new());
        };
        let fragment = state.pages[page].fragment.clone();
        let candidates: Vec<(String, u32)> = state.pages[page]
            .elements
            .iter()
            .filter(|e| e.matches(selector))
            .filter(|e| parent_key.is_none() || e.parent == parent_key)
            .map(|e| (e.key.clone(), e.appear_after))
            .collect();
        let mut found = Vec::new();
        for (key, appear_after) in candidates {
            let seen = state.queries.entry(key.clone()).or_insert(0);
            *seen += 1;
            if *seen > appear_after {
                found.push(MockState::handle(&fragment, &key));
            }
        }
        Ok(found)
    }
}

impl BrowserSession for MockSession {
    fn navigate(&self, url: &str) -> WizardResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.url = url.to_string();
        state.events.push(MockEvent::Navigate(url.to_string()));
        Ok(())
    }

    fn find_elements(&self, selector: &Selector) -> WizardResult<Vec<ElementHandle>> {
        self.query(selector, None)
    }

    fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> WizardResult<Vec<ElementHandle>> {
        self.query(selector, Some(parent))
    }

    fn current_url(&self) -> WizardResult<String> {
        let mut state = self.lock();
        state.ensure_open()?;
        let url = state.url.clone();
        state.events.push(MockEvent::UrlRead(url.clone()));
        Ok(url)
    }

    fn click(&self, element: &ElementHandle) -> WizardResult<()> {
        let mut state = self.lock();
        let page = state.active_fragment();
        let target = state.live(element)?;
        let key = target.key.clone();
        let effect = target.on_click.clone();
        state.events.push(MockEvent::Click { page, element: key });
        match effect {
            Some(ClickEffect::Navigate(url)) => state.url = url,
            Some(ClickEffect::FocusDate(date)) => {
                if let Some(calendar) = state.calendar.as_mut() {
                    calendar.focus(date);
                }
                state.sync_calendar();
            }
            None => {}
        }
        Ok(())
    }

    fn clear(&self, element: &ElementHandle) -> WizardResult<()> {
        let mut state = self.lock();
        let page = state.active_fragment();
        let target = state.live(element)?;
        let key = target.key.clone();
        if let Some(value) = target.value.as_mut() {
            value.clear();
        }
        state.events.push(MockEvent::Clear { page, element: key });
        state.sync_inputs();
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> WizardResult<()> {
        let mut state = self.lock();
        let page = state.active_fragment();
        let target = state.live(element)?;
        let key = target.key.clone();
        match target.value.as_mut() {
            Some(value) => value.push_str(text),
            None => return Err(WizardError::session(format!("element '{key}' is not an input"))),
        }
        state.events.push(MockEvent::Type {
            page,
            element: key,
            text: text.to_string(),
        });
        state.sync_inputs();
        Ok(())
    }

    fn press_key(&self, key: Key) -> WizardResult<()> {
        let mut state = self.lock();
        state.ensure_open()?;
        let page = state.active_fragment();
        state.events.push(MockEvent::Press { page, key });
        if let Some(calendar) = state.calendar.as_mut() {
            match key {
                Key::ArrowRight => calendar.arrow_right(),
                Key::ArrowLeft => calendar.arrow_left(),
                Key::Enter => calendar.confirm(),
                Key::Tab | Key::Escape => {}
            }
        }
        state.sync_calendar();
        Ok(())
    }

    fn text(&self, element: &ElementHandle) -> WizardResult<String> {
        let mut state = self.lock();
        Ok(state.live(element)?.text.clone())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> WizardResult<Option<String>> {
        let mut state = self.lock();
        Ok(state.live(element)?.attributes.get(name).cloned())
    }

    fn is_displayed(&self, element: &ElementHandle) -> WizardResult<bool> {
        let mut state = self.lock();
        Ok(state.live(element)?.displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> WizardResult<bool> {
        let mut state = self.lock();
        Ok(state.live(element)?.enabled)
    }

    fn screenshot(&self) -> WizardResult<Vec<u8>> {
        let state = self.lock();
        state.ensure_open()?;
        if state.fail_screenshot {
            return Err(WizardError::Capture {
                what: "screenshot".to_string(),
                message: "renderer unavailable".to_string(),
            });
        }
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    fn page_source(&self) -> WizardResult<String> {
        let state = self.lock();
        state.ensure_open()?;
        if state.fail_page_source {
            return Err(WizardError::Capture {
                what: "page source".to_string(),
                message: "document unavailable".to_string(),
            });
        }
        let mut html = format!("<html data-url=\"{}\"><body>", state.url);
        if let Some(page) = state.active_page() {
            for element in &state.pages[page].elements {
                html.push_str(&format!("<div data-key=\"{}\">{}</div>", element.key, element.text));
            }
        }
        html.push_str("</body></html>");
        Ok(html)
    }

    fn quit(&mut self) -> WizardResult<()> {
        let mut state = self.lock();
        state.quit_calls += 1;
        state.closed = true;
        state.events.push(MockEvent::Quit);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn session() -> MockSession {
        let session = MockSession::new();
        session.add_page(
            MockPage::new("/home")
                .with(MockElement::new("go").id("go").navigates_to("https://x/home/next"))
                .with(MockElement::new("late").css(".late").appears_after(2))
                .with(MockElement::new("flaky").css(".flaky").stale_times(1).text("ok")),
        );
        session.add_page(MockPage::new("/home/next").with(MockElement::new("h2").css("h2").text("hi")));
        session.set_url("https://x/home");
        session
    }

    #[test]
    fn test_zero_matches_is_empty_not_error() {
        let s = session();
        assert!(s.find_elements(&Selector::css(".nothing")).unwrap().is_empty());
    }

    #[test]
    fn test_id_selector_matches_css_hash() {
        let s = session();
        assert_eq!(s.find_elements(&Selector::css("#go")).unwrap().len(), 1);
    }

    #[test]
    fn test_appears_after_queries() {
        let s = session();
        let sel = Selector::css(".late");
        assert!(s.find_elements(&sel).unwrap().is_empty());
        assert!(s.find_elements(&sel).unwrap().is_empty());
        assert_eq!(s.find_elements(&sel).unwrap().len(), 1);
    }

    #[test]
    fn test_stale_once_then_ok() {
        let s = session();
        let el = s.find_elements(&Selector::css(".flaky")).unwrap().remove(0);
        assert!(s.text(&el).unwrap_err().is_stale());
        assert_eq!(s.text(&el).unwrap(), "ok");
    }

    #[test]
    fn test_click_navigates_and_detaches_old_elements() {
        let s = session();
        let go = s.find_elements(&Selector::id("go")).unwrap().remove(0);
        s.click(&go).unwrap();
        assert_eq!(s.url(), "https://x/home/next");
        assert!(s.text(&go).unwrap_err().is_stale());
        assert_eq!(s.find_elements(&Selector::css("h2")).unwrap().len(), 1);
        assert_eq!(s.clicks(), vec!["go".to_string()]);
    }

    #[test]
    fn test_quit_closes_session() {
        let mut s = session();
        s.quit().unwrap();
        assert_eq!(s.quit_calls(), 1);
        assert!(s.current_url().is_err());
    }

    #[test]
    fn test_capture_failures() {
        let s = session();
        assert!(s.screenshot().unwrap().starts_with(&[0x89, b'P']));
        s.fail_screenshot();
        s.fail_page_source();
        assert!(s.screenshot().is_err());
        assert!(s.page_source().is_err());
    }
}
