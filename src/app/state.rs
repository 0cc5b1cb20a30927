//! Defines the state a front-end keeps while driving copy runs.

use crate::config::AppConfig;
use crate::core::{CopyEvent, CopySummary};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::events::UserEvent;

/// An append-only list of human-readable log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBook {
    entries: Vec<String>,
}

impl LogBook {
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the lines joined by newlines, verbatim.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.entries.join("\n"))
            .with_context(|| format!("Failed to write log to {:?}", path))?;
        tracing::info!("Saved {} log lines to {:?}", self.entries.len(), path);
        Ok(())
    }
}

/// Holds the options, log history and progress of the current session.
pub struct AppState {
    /// The options used to build the next job.
    pub config: AppConfig,
    /// Every log line received so far, across runs.
    pub log: LogBook,
    /// The last reported progress percentage.
    pub progress: u8,
    /// `true` while a copy run is in progress.
    pub is_copying: bool,
    /// The summary of the last finished run.
    pub last_summary: Option<CopySummary>,
    /// A handle to the currently running copy task.
    pub copy_task: Option<JoinHandle<()>>,
    /// A flag used to signal cancellation to the copy task.
    pub cancellation_flag: Arc<AtomicBool>,
}

impl AppState {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            log: LogBook::default(),
            progress: 0,
            is_copying: false,
            last_summary: None,
            copy_task: None,
            cancellation_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Resets per-run state and hands out a fresh cancellation flag.
    pub fn begin_copy(&mut self) -> Arc<AtomicBool> {
        self.progress = 0;
        self.is_copying = true;
        self.last_summary = None;
        self.cancellation_flag = Arc::new(AtomicBool::new(false));
        self.cancellation_flag.clone()
    }

    /// Folds one event into the state.
    pub fn apply_event(&mut self, event: &UserEvent) {
        match event {
            UserEvent::Copy(CopyEvent::Progress(progress)) => {
                self.progress = progress.percent();
            }
            UserEvent::Copy(CopyEvent::Log(line)) => self.log.push(line.clone()),
            UserEvent::Copy(CopyEvent::Finished(summary)) => {
                self.log.push("Copy process finished.");
                self.is_copying = false;
                self.copy_task = None;
                self.last_summary = Some(summary.clone());
            }
            UserEvent::ShowError(message) => {
                self.log.push(message.clone());
                self.is_copying = false;
                self.copy_task = None;
            }
        }
    }

    /// Signals the running copy task to stop after its current file.
    pub fn cancel_current_copy(&mut self) {
        if self.is_copying {
            tracing::info!("Cancelling current copy run");
            self.cancellation_flag.store(true, Ordering::SeqCst);
        } else {
            tracing::warn!("cancel_current_copy called, but no copy is running");
        }
    }
}
