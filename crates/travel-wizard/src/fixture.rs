//! Scoped Browser Sessions
//!
//! One session per scenario, released exactly once on every exit path.
//!
//! - [`SessionProvider`] acquires a fresh session; a failed acquisition is
//!   returned as-is because there is nothing to release.
//! - [`SessionGuard`] owns the session and quits it on [`SessionGuard::release`]
//!   or, failing that, on drop (including unwinding).
//! - [`run_scenario`] runs a scenario closure against the session, captures a
//!   failure screenshot and page source when it fails or panics, records the
//!   outcome and quits.
//!
//! Diagnostic capture never changes the outcome: capture errors are logged
//! and swallowed.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use crate::reporter::{ReportSink, ScenarioOutcome, MIME_HTML, MIME_PNG};
use crate::result::WizardResult;
use crate::session::BrowserSession;

/// Attachment name of the failure screenshot
pub const FAILURE_SCREENSHOT: &str = "Failure Screenshot";

/// Attachment name of the page source dump
pub const PAGE_SOURCE: &str = "Page Source";

/// Source of fresh browser sessions
pub trait SessionProvider {
    /// Session type produced
    type Session: BrowserSession;

    /// Start a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be launched
    fn acquire(&self) -> WizardResult<Self::Session>;
}

/// Owner of a session that quits it exactly once.
#[derive(Debug)]
pub struct SessionGuard<S: BrowserSession> {
    session: Option<S>,
}

impl<S: BrowserSession> SessionGuard<S> {
    /// Take ownership of a session
    pub const fn new(session: S) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The guarded session, until released
    pub const fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    /// Whether the session has been released
    pub const fn is_released(&self) -> bool {
        self.session.is_none()
    }

    /// Quit the session now.
    ///
    /// # Errors
    ///
    /// Returns the session's quit error; the session counts as released either way
    pub fn release(&mut self) -> WizardResult<()> {
        match self.session.take() {
            Some(mut session) => {
                tracing::debug!("releasing browser session");
                session.quit()
            }
            None => Ok(()),
        }
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::error!(error = %e, "failed to quit browser session");
        }
    }
}

/// Acquire a session from `provider` and run the scenario in it.
///
/// # Errors
///
/// Returns the acquisition error; every later failure is reported through
/// the outcome
pub fn run_with_provider<P, F>(
    name: &str,
    provider: &P,
    sink: &mut dyn ReportSink,
    scenario: F,
) -> WizardResult<ScenarioOutcome>
where
    P: SessionProvider,
    F: FnOnce(&P::Session) -> WizardResult<()>,
{
    let session = provider.acquire()?;
    Ok(run_scenario(name, session, sink, scenario))
}

/// Run `scenario` against `session` and release the session afterwards.
pub fn run_scenario<S, F>(
    name: &str,
    session: S,
    sink: &mut dyn ReportSink,
    scenario: F,
) -> ScenarioOutcome
where
    S: BrowserSession,
    F: FnOnce(&S) -> WizardResult<()>,
{
    let mut guard = SessionGuard::new(session);
    let started = Instant::now();
    tracing::info!(scenario = name, "scenario started");

    let result = match guard.session() {
        Some(session) => catch_unwind(AssertUnwindSafe(|| scenario(session))),
        None => Ok(Ok(())),
    };

    let elapsed = started.elapsed();
    let mut outcome = match result {
        Ok(Ok(())) => ScenarioOutcome::passed(name, elapsed),
        Ok(Err(e)) => ScenarioOutcome::failed(name, elapsed, e.to_string()),
        Err(panic) => ScenarioOutcome::broken(name, elapsed, panic_message(panic.as_ref())),
    };

    if outcome.status.is_failed() {
        tracing::warn!(scenario = name, error = ?outcome.error, "scenario failed");
        if let Some(session) = guard.session() {
            outcome = outcome.with_attachments(capture_diagnostics(session, sink));
        }
    } else {
        tracing::info!(scenario = name, duration_ms = outcome.duration_ms, "scenario passed");
    }

    if let Err(e) = guard.release() {
        tracing::error!(scenario = name, error = %e, "failed to quit browser session");
    }
    if let Err(e) = sink.record(&outcome) {
        tracing::error!(scenario = name, error = %e, "failed to record outcome");
    }
    outcome
}

/// Attach a screenshot and the page source, each at most once.
///
/// Returns the names of the attachments that were made.
pub fn capture_diagnostics<S>(session: &S, sink: &mut dyn ReportSink) -> Vec<String>
where
    S: BrowserSession + ?Sized,
{
    let mut made = Vec::new();

    match session.screenshot() {
        Ok(png) => match sink.attach(FAILURE_SCREENSHOT, MIME_PNG, &png) {
            Ok(()) => made.push(FAILURE_SCREENSHOT.to_string()),
            Err(e) => tracing::error!(error = %e, "failed to attach screenshot"),
        },
        Err(e) => tracing::error!(error = %e, "failed to capture screenshot"),
    }

    match session.page_source() {
        Ok(html) => match sink.attach(PAGE_SOURCE, MIME_HTML, html.as_bytes()) {
            Ok(()) => made.push(PAGE_SOURCE.to_string()),
            Err(e) => tracing::error!(error = %e, "failed to attach page source"),
        },
        Err(e) => tracing::error!(error = %e, "failed to capture page source"),
    }

    made
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: <non-string payload>".to_string()
    }
}
