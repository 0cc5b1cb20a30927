pub mod copier;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod preview;
pub mod scanner;
pub mod tree_generator;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// What to do when a mirrored file already exists in the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Replace the existing file.
    #[default]
    Overwrite,
    /// Leave the existing file untouched and log it.
    Skip,
    /// Treat the existing file as a per-file failure.
    Error,
}

/// A single mirror run. Constructed once and never mutated while running.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub filter: ExtensionFilter,
    pub keep_extensions: bool,
    pub copy_contents: bool,
    pub dry_run: bool,
    pub overwrite: OverwritePolicy,
}

impl CopyJob {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            filter: ExtensionFilter::default(),
            keep_extensions: true,
            copy_contents: true,
            dry_run: false,
            overwrite: OverwritePolicy::default(),
        }
    }

    /// Rejects jobs with missing inputs before any work starts.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source.as_os_str().is_empty() {
            return Err(CoreError::MissingInput("source"));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(CoreError::MissingInput("destination"));
        }
        if !self.source.is_dir() {
            return Err(CoreError::NotADirectory(self.source.clone()));
        }
        let source = fs::canonicalize(&self.source)
            .map_err(|e| CoreError::Io(e, self.source.clone()))?;
        if fs::canonicalize(&self.destination).is_ok_and(|dest| dest == source) {
            return Err(CoreError::SameFolder(self.destination.clone()));
        }
        Ok(())
    }
}

/// Files processed versus files matching the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub processed: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    pub fn advance(&mut self) {
        self.processed += 1;
    }

    /// `floor(processed / total * 100)`, or 100 when there is nothing to do.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let processed = self.processed.min(self.total);
        (processed * 100 / self.total) as u8
    }
}

/// Counters reported once a copy pass has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySummary {
    pub directories: usize,
    pub files_copied: usize,
    pub placeholders_created: usize,
    pub planned: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
    pub cancelled: bool,
}

/// Events emitted by a copy pass, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyEvent {
    /// Emitted after every processed file.
    Progress(ProgressState),
    /// A human-readable log line.
    Log(String),
    /// The last event of every run, cancelled or not.
    Finished(CopySummary),
}

/// One directory of a scanned tree with the names of its regular files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: PathBuf,
    pub files: Vec<String>,
}

pub use copier::run_copy;
pub use error::{CoreError, CoreResult};
pub use exporter::{StructureEntry, TreeExporter};
pub use filter::ExtensionFilter;
pub use preview::{list_tree, NodeKind, TreeNode};
pub use scanner::{count_matching, DirectoryScanner, TreeScan};
pub use tree_generator::TreeGenerator;
