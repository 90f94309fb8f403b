//! Real browser sessions over the Chrome `DevTools` Protocol.
//!
//! [`CdpSession`] launches Chrome, Chromium or Edge through chromiumoxide and
//! exposes the blocking [`BrowserSession`] interface by driving an owned tokio
//! runtime. Resolved elements live in a per-session table keyed by
//! [`ElementHandle`] id; protocol errors that mean "this node is gone" are
//! reported as [`WizardError::StaleElement`].
//!
//! Waits poll `find_elements` many times on one document, so the table keeps
//! only the elements of the last [`RETAINED_LOOKUPS`] top-level lookups and
//! is emptied whenever the page URL changes. An evicted handle reads as
//! stale, which waits retry.

#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;

use crate::config::{BrowserKind, WizardConfig};
use crate::fixture::SessionProvider;
use crate::locator::Selector;
use crate::result::{WizardError, WizardResult};
use crate::session::{BrowserSession, ElementHandle, Key};

const IS_DISPLAYED_JS: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    const s = window.getComputedStyle(this); \
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }";

const IS_ENABLED_JS: &str = "function() { \
    if (this.disabled) return false; \
    const r = this.getBoundingClientRect(); \
    const top = document.elementFromPoint(r.x + r.width / 2, r.y + r.height / 2); \
    return !top || top === this || this.contains(top); }";

const CLEAR_JS: &str = "function() { \
    const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value'); \
    if (setter && setter.set) { setter.set.call(this, ''); } else { this.value = ''; } \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
    this.dispatchEvent(new Event('change', { bubbles: true })); }";

/// Top-level lookups whose elements stay addressable
pub const RETAINED_LOOKUPS: u64 = 8;

/// Handle-id table that forgets the elements of old lookups.
#[derive(Debug)]
struct ElementTable<T> {
    entries: HashMap<String, (u64, Arc<T>)>,
    generation: u64,
    next_id: u64,
    url: Option<String>,
}

impl<T> Default for ElementTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
            next_id: 0,
            url: None,
        }
    }
}

impl<T> ElementTable<T> {
    /// Start a top-level lookup and evict entries it makes unreachable
    fn begin_lookup(&mut self) {
        self.generation += 1;
        let oldest = self.generation.saturating_sub(RETAINED_LOOKUPS - 1);
        self.entries.retain(|_, (generation, _)| *generation >= oldest);
    }

    /// Record the document URL; a different one empties the table
    fn observe_url(&mut self, url: &str) {
        if self.url.as_deref() != Some(url) {
            if self.url.is_some() {
                self.entries.clear();
            }
            self.url = Some(url.to_string());
        }
    }

    fn insert(&mut self, element: T) -> ElementHandle {
        let id = format!("cdp-{}", self.next_id);
        self.next_id += 1;
        let _ = self
            .entries
            .insert(id.clone(), (self.generation, Arc::new(element)));
        ElementHandle::new(id)
    }

    fn get(&self, handle: &ElementHandle) -> Option<Arc<T>> {
        self.entries.get(handle.id()).map(|(_, element)| Arc::clone(element))
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.url = None;
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Messages Chromium uses for nodes that left the document
const DETACHED_MARKERS: [&str; 5] = [
    "No node with given id",
    "Could not find node",
    "Node is detached",
    "Cannot find context with specified id",
    "Cannot find object with id",
];

fn is_detached(error: &CdpError) -> bool {
    let message = error.to_string();
    DETACHED_MARKERS.iter().any(|m| message.contains(m))
}

fn session_error(error: &CdpError) -> WizardError {
    WizardError::session(error.to_string())
}

/// Browser launch settings derived from [`WizardConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Browser family
    pub browser: BrowserKind,
    /// Run without a window
    pub headless: bool,
    /// Launch and request timeout
    pub timeout: Duration,
}

impl LaunchOptions {
    /// Options from a run configuration
    #[must_use]
    pub fn from_config(config: &WizardConfig) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            timeout: Duration::from_millis(config.timeouts.launch_ms),
        }
    }

    fn executable(&self) -> Option<&'static str> {
        self.browser
            .executable_candidates()
            .iter()
            .copied()
            .find(|p| Path::new(p).exists())
    }
}

/// Blocking session over one Chromium-family browser tab.
pub struct CdpSession {
    runtime: Runtime,
    browser: Option<Browser>,
    handler: Option<tokio::task::JoinHandle<()>>,
    page: Page,
    elements: Mutex<ElementTable<Element>>,
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession")
            .field("open", &self.browser.is_some())
            .field("elements", &self.table().len())
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    /// Launch a browser and open a blank tab.
    pub fn launch(options: &LaunchOptions) -> WizardResult<Self> {
        let runtime = Runtime::new()?;

        let mut builder = CdpConfig::builder().request_timeout(options.timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        match options.executable() {
            Some(path) => builder = builder.chrome_executable(path),
            None if options.browser == BrowserKind::Edge => {
                return Err(WizardError::session("Microsoft Edge executable not found"));
            }
            None => {}
        }
        let cdp_config = builder.build().map_err(WizardError::session)?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(cdp_config)
                .await
                .map_err(|e| session_error(&e))?;
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| session_error(&e))?;
            Ok::<_, WizardError>((browser, page, handle))
        })?;
        tracing::info!(browser = %options.browser, headless = options.headless, "browser launched");

        Ok(Self {
            runtime,
            browser: Some(browser),
            handler: Some(handler),
            page,
            elements: Mutex::new(ElementTable::default()),
        })
    }

    fn table(&self) -> MutexGuard<'_, ElementTable<Element>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> WizardResult<()> {
        if self.browser.is_none() {
            return Err(WizardError::session("session has been quit"));
        }
        Ok(())
    }

    fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut table = self.table();
        found.into_iter().map(|element| table.insert(element)).collect()
    }

    /// Run `op` against a registered element, mapping detached-node errors.
    fn with_element<T, F, Fut>(&self, handle: &ElementHandle, op: F) -> WizardResult<T>
    where
        F: FnOnce(Arc<Element>) -> Fut,
        Fut: std::future::Future<Output = Result<T, CdpError>>,
    {
        self.ensure_open()?;
        let stale = || WizardError::StaleElement {
            element: handle.id().to_string(),
        };
        let element = self.table().get(handle).ok_or_else(stale)?;
        self.runtime.block_on(op(element)).map_err(|e| {
            if is_detached(&e) {
                stale()
            } else {
                session_error(&e)
            }
        })
    }

    fn js_bool(&self, handle: &ElementHandle, function: &'static str) -> WizardResult<bool> {
        let returned = self.with_element(handle, |el| async move {
            el.call_js_fn(function, false).await
        })?;
        Ok(returned
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn dispatch_key(&self, key: Key, kind: DispatchKeyEventType) -> WizardResult<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key.dom_key())
            .code(key.dom_key())
            .windows_virtual_key_code(key.key_code())
            .native_virtual_key_code(key.key_code());
        if key == Key::Enter && kind == DispatchKeyEventType::KeyDown {
            builder = builder.text("\r");
        }
        let params = builder.build().map_err(WizardError::session)?;
        self.runtime
            .block_on(self.page.execute(params))
            .map_err(|e| session_error(&e))?;
        Ok(())
    }
}

impl BrowserSession for CdpSession {
    fn navigate(&self, url: &str) -> WizardResult<()> {
        self.ensure_open()?;
        self.runtime
            .block_on(self.page.goto(url))
            .map_err(|e| WizardError::NavigationFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.table().clear();
        Ok(())
    }

    fn find_elements(&self, selector: &Selector) -> WizardResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        self.table().begin_lookup();
        let found = match selector {
            Selector::XPath(expr) => self.runtime.block_on(self.page.find_xpaths(expr.as_str())),
            other => {
                let css = other.as_css().unwrap_or_default();
                self.runtime.block_on(self.page.find_elements(css))
            }
        };
        match found {
            Ok(elements) => Ok(self.register(elements)),
            Err(e) if is_detached(&e) => Ok(Vec::new()),
            Err(e) => Err(session_error(&e)),
        }
    }

    fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> WizardResult<Vec<ElementHandle>> {
        let Some(css) = selector.as_css() else {
            return Err(WizardError::unsupported("scoped selector", selector.to_string()));
        };
        let found = self.with_element(parent, |el| async move { el.find_elements(css).await })?;
        Ok(self.register(found))
    }

    fn current_url(&self) -> WizardResult<String> {
        self.ensure_open()?;
        let url = self
            .runtime
            .block_on(self.page.url())
            .map_err(|e| session_error(&e))?
            .unwrap_or_default();
        self.table().observe_url(&url);
        Ok(url)
    }

    fn click(&self, element: &ElementHandle) -> WizardResult<()> {
        self.with_element(element, |el| async move {
            let _ = el.click().await?;
            Ok(())
        })
    }

    fn clear(&self, element: &ElementHandle) -> WizardResult<()> {
        let _ = self.with_element(element, |el| async move {
            el.call_js_fn(CLEAR_JS, false).await
        })?;
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> WizardResult<()> {
        self.with_element(element, |el| async move {
            let _ = el.focus().await?;
            let _ = el.type_str(text).await?;
            Ok(())
        })
    }

    fn press_key(&self, key: Key) -> WizardResult<()> {
        self.ensure_open()?;
        self.dispatch_key(key, DispatchKeyEventType::KeyDown)?;
        self.dispatch_key(key, DispatchKeyEventType::KeyUp)
    }

    fn text(&self, element: &ElementHandle) -> WizardResult<String> {
        let text = self.with_element(element, |el| async move { el.inner_text().await })?;
        Ok(text.unwrap_or_default())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> WizardResult<Option<String>> {
        self.with_element(element, |el| async move { el.attribute(name).await })
    }

    fn is_displayed(&self, element: &ElementHandle) -> WizardResult<bool> {
        self.js_bool(element, IS_DISPLAYED_JS)
    }

    fn is_enabled(&self, element: &ElementHandle) -> WizardResult<bool> {
        self.js_bool(element, IS_ENABLED_JS)
    }

    fn screenshot(&self) -> WizardResult<Vec<u8>> {
        self.ensure_open()?;
        let capture = |message: String| WizardError::Capture {
            what: "screenshot".to_string(),
            message,
        };
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .runtime
            .block_on(self.page.execute(params))
            .map_err(|e| capture(e.to_string()))?;
        BASE64.decode(&shot.data).map_err(|e| capture(e.to_string()))
    }

    fn page_source(&self) -> WizardResult<String> {
        self.ensure_open()?;
        self.runtime
            .block_on(self.page.content())
            .map_err(|e| WizardError::Capture {
                what: "page source".to_string(),
                message: e.to_string(),
            })
    }

    fn quit(&mut self) -> WizardResult<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        self.table().clear();
        let closed = self.runtime.block_on(async {
            browser.close().await?;
            let _ = browser.wait().await;
            Ok::<_, CdpError>(())
        });
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        tracing::info!("browser closed");
        closed.map_err(|e| session_error(&e))
    }
}

/// Launches one [`CdpSession`] per scenario
#[derive(Debug, Clone)]
pub struct CdpProvider {
    options: LaunchOptions,
}

impl CdpProvider {
    /// Provider for the browser named in `config`
    #[must_use]
    pub fn new(config: &WizardConfig) -> Self {
        Self {
            options: LaunchOptions::from_config(config),
        }
    }
}

impl SessionProvider for CdpProvider {
    type Session = CdpSession;

    fn acquire(&self) -> WizardResult<CdpSession> {
        CdpSession::launch(&self.options)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod element_table_tests {
        use super::*;

        #[test]
        fn test_repeated_lookups_stay_bounded() {
            let mut table = ElementTable::default();
            for poll in 0..500 {
                table.begin_lookup();
                let _ = table.insert(poll);
                let _ = table.insert(poll);
            }
            assert_eq!(table.len(), 2 * RETAINED_LOOKUPS as usize);
        }

        #[test]
        fn test_recent_handles_resolve_and_old_ones_do_not() {
            let mut table = ElementTable::default();
            table.begin_lookup();
            let old = table.insert("old");
            for _ in 0..RETAINED_LOOKUPS - 1 {
                table.begin_lookup();
            }
            assert_eq!(*table.get(&old).unwrap(), "old");
            table.begin_lookup();
            assert!(table.get(&old).is_none());
        }

        #[test]
        fn test_url_change_empties_table() {
            let mut table = ElementTable::default();
            table.observe_url("https://x/wizard/date");
            table.begin_lookup();
            let cell = table.insert(1);
            table.observe_url("https://x/wizard/date");
            assert!(table.get(&cell).is_some());
            table.observe_url("https://x/wizard/travelers");
            assert!(table.get(&cell).is_none());
            assert_eq!(table.len(), 0);
        }

        #[test]
        fn test_ids_are_not_reused_after_eviction() {
            let mut table = ElementTable::default();
            table.begin_lookup();
            let first = table.insert(1);
            table.clear();
            table.begin_lookup();
            let second = table.insert(2);
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_launch_options_from_config() {
        let mut config = WizardConfig::default();
        config.browser = BrowserKind::Edge;
        config.headless = false;
        let options = LaunchOptions::from_config(&config);
        assert_eq!(options.browser, BrowserKind::Edge);
        assert!(!options.headless);
        assert_eq!(options.timeout, Duration::from_millis(60_000));
    }
}
