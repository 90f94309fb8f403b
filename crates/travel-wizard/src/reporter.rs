//! Reporter - Scenario Outcomes and Attachments
//!
//! A [`ReportSink`] receives named binary attachments (failure screenshot,
//! page source) and the final [`ScenarioOutcome`] of each scenario run.
//!
//! - [`MemorySink`]: keeps everything in memory, for tests
//! - [`DirectorySink`]: writes one directory per run with each attachment as a
//!   file plus a `report.json` index

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::result::WizardResult;

/// MIME type of the failure screenshot
pub const MIME_PNG: &str = "image/png";

/// MIME type of the page source dump
pub const MIME_HTML: &str = "text/html";

/// Text attachments up to this size are embedded in `report.json`
pub const INLINE_LIMIT_BYTES: usize = 256 * 1024;

/// Scenario result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Scenario passed
    Passed,
    /// Scenario returned an error
    Failed,
    /// Scenario panicked
    Broken,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::Broken)
    }
}

/// Result of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Status
    pub status: TestStatus,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Error or panic message
    pub error: Option<String>,
    /// Names of the attachments made for this scenario
    pub attachments: Vec<String>,
}

impl ScenarioOutcome {
    /// Create a passing outcome
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            duration_ms: millis(duration),
            error: None,
            attachments: Vec::new(),
        }
    }

    /// Create a failing outcome
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            duration_ms: millis(duration),
            error: Some(error.into()),
            attachments: Vec::new(),
        }
    }

    /// Create an outcome for a scenario that panicked
    #[must_use]
    pub fn broken(name: impl Into<String>, duration: Duration, panic: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Broken,
            ..Self::failed(name, duration, panic)
        }
    }

    /// Record the attachments made
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.error {
            None => format!("PASS {} ({}ms)", self.name, self.duration_ms),
            Some(error) => format!("FAIL {} ({}ms): {error}", self.name, self.duration_ms),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Destination for diagnostics produced by a scenario run.
pub trait ReportSink {
    /// Attach a named blob
    fn attach(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> WizardResult<()>;

    /// Record a finished scenario
    fn record(&mut self, outcome: &ScenarioOutcome) -> WizardResult<()> {
        let _ = outcome;
        Ok(())
    }
}

/// An attachment held by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// Content
    pub bytes: Vec<u8>,
}

/// In-memory sink
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    attachments: Vec<Attachment>,
    outcomes: Vec<ScenarioOutcome>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attachments in arrival order
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Attachments with the given name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attachment> + 'a {
        self.attachments.iter().filter(move |a| a.name == name)
    }

    /// Recorded outcomes
    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }
}

impl ReportSink for MemorySink {
    fn attach(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> WizardResult<()> {
        self.attachments.push(Attachment {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn record(&mut self, outcome: &ScenarioOutcome) -> WizardResult<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }
}

/// Index entry in `report.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentEntry {
    /// Display name
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// File name relative to the run directory
    pub file: String,
    /// Size in bytes
    pub size: usize,
    /// Base64 content for small text attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

/// Contents of `report.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier (directory name)
    pub run_id: String,
    /// Recorded scenarios
    pub scenarios: Vec<ScenarioOutcome>,
    /// Attachments
    pub attachments: Vec<AttachmentEntry>,
}

/// Sink writing to `<root>/<run-id>/`
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    report: RunReport,
}

impl DirectorySink {
    /// Create a run directory with a fresh id under `root`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn create(root: &Path) -> WizardResult<Self> {
        let run_id = Uuid::new_v4().to_string();
        let dir = root.join(&run_id);
        std::fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "report directory created");
        let sink = Self {
            dir,
            report: RunReport {
                run_id,
                ..RunReport::default()
            },
        };
        sink.flush()?;
        Ok(sink)
    }

    /// Run directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Index written so far
    #[must_use]
    pub const fn report(&self) -> &RunReport {
        &self.report
    }

    fn flush(&self) -> WizardResult<()> {
        let json = serde_json::to_string_pretty(&self.report)?;
        std::fs::write(self.dir.join("report.json"), json)?;
        Ok(())
    }

    fn file_name(&self, name: &str, mime_type: &str) -> String {
        let stem = slug(name);
        let ext = extension(mime_type);
        let taken = self
            .report
            .attachments
            .iter()
            .filter(|a| a.file.starts_with(&stem))
            .count();
        if taken == 0 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}-{taken}.{ext}")
        }
    }
}

impl ReportSink for DirectorySink {
    fn attach(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> WizardResult<()> {
        let file = self.file_name(name, mime_type);
        std::fs::write(self.dir.join(&file), bytes)?;
        let inline = (mime_type.starts_with("text/") && bytes.len() <= INLINE_LIMIT_BYTES)
            .then(|| BASE64.encode(bytes));
        self.report.attachments.push(AttachmentEntry {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            file,
            size: bytes.len(),
            inline,
        });
        self.flush()
    }

    fn record(&mut self, outcome: &ScenarioOutcome) -> WizardResult<()> {
        self.report.scenarios.push(outcome.clone());
        self.flush()
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

fn extension(mime_type: &str) -> &'static str {
    match mime_type {
        MIME_PNG => "png",
        MIME_HTML => "html",
        "application/json" => "json",
        m if m.starts_with("text/") => "txt",
        _ => "bin",
    }
}
