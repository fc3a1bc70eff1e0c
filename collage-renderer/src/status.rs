//! User-facing export status.
//!
//! Success and failure messages stay visible for a fixed window, then the
//! board falls back to idle on its own.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::RenderResult;

/// How long a finished status stays visible.
pub const STATUS_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

/// Status of the most recent export.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum ExportStatus {
    /// Nothing to report.
    #[default]
    Idle,
    /// An export is running.
    InProgress,
    /// The last export finished.
    Success(String),
    /// The last export failed.
    Failure(String),
}

/// Tracks export progress and expires finished messages.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    status: ExportStatus,
    settled_at: Option<Instant>,
    display_window: Duration,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    /// Create an idle board with the default display window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_display_window(STATUS_DISPLAY_WINDOW)
    }

    /// Create an idle board with a custom display window.
    #[must_use]
    pub fn with_display_window(display_window: Duration) -> Self {
        Self {
            status: ExportStatus::Idle,
            settled_at: None,
            display_window,
        }
    }

    /// Mark an export as started.
    ///
    /// Returns false, leaving the board unchanged, if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.status == ExportStatus::InProgress {
            return false;
        }
        self.status = ExportStatus::InProgress;
        self.settled_at = None;
        true
    }

    /// Record a successful export.
    pub fn succeed(&mut self, message: impl Into<String>) {
        self.settle(ExportStatus::Success(message.into()));
    }

    /// Record a failed export.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.settle(ExportStatus::Failure(reason.into()));
    }

    /// Record the outcome of an export.
    pub fn finish<T>(&mut self, result: &RenderResult<T>, success_message: &str) {
        match result {
            Ok(_) => self.succeed(success_message),
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Status as seen now.
    #[must_use]
    pub fn current(&self) -> ExportStatus {
        self.current_at(Instant::now())
    }

    /// Status as seen at `now`.
    #[must_use]
    pub fn current_at(&self, now: Instant) -> ExportStatus {
        match self.settled_at {
            Some(at) if now.saturating_duration_since(at) >= self.display_window => {
                ExportStatus::Idle
            }
            _ => self.status.clone(),
        }
    }

    /// True while an export is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status == ExportStatus::InProgress
    }

    fn settle(&mut self, status: ExportStatus) {
        self.status = status;
        self.settled_at = Some(Instant::now());
    }
}
