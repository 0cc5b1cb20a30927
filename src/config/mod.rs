pub mod settings;

use crate::core::{CopyJob, CoreError, ExtensionFilter, OverwritePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The last-used options, persisted as a flat JSON object.
///
/// Missing keys fall back to their defaults, unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Comma separated extension allow-list, e.g. `".py,.txt"`.
    pub filter: String,
    pub keep_ext: bool,
    pub copy_content: bool,
    pub dry_run: bool,
    pub dark_mode: bool,
    pub preview_depth: usize,
    pub skip_preview: bool,
    pub overwrite: OverwritePolicy,
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
}

impl AppConfig {
    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::parse(&self.filter)
    }

    /// Builds the job for one run from these options.
    ///
    /// Fails with [`CoreError::MissingInput`] when no source or destination is set.
    pub fn to_job(&self) -> Result<CopyJob, CoreError> {
        let source = self
            .source
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(CoreError::MissingInput("source"))?;
        let destination = self
            .destination
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(CoreError::MissingInput("destination"))?;

        Ok(CopyJob {
            source,
            destination,
            filter: self.extension_filter(),
            keep_extensions: self.keep_ext,
            copy_contents: self.copy_content,
            dry_run: self.dry_run,
            overwrite: self.overwrite,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: String::new(),
            keep_ext: true,
            copy_content: true,
            dry_run: false,
            dark_mode: false,
            preview_depth: 3,
            skip_preview: false,
            overwrite: OverwritePolicy::Overwrite,
            source: None,
            destination: None,
        }
    }
}
