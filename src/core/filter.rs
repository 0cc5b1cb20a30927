//! The extension allow-list shared by counting, copying and previewing.

use std::path::Path;

/// A case-insensitive suffix allow-list. An empty list lets every file through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    /// Builds a filter from user-supplied suffixes, dropping blank entries.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { suffixes }
    }

    /// Parses the comma separated form used in settings, e.g. `".py, .txt"`.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Checks whether a file name ends with one of the listed suffixes.
    pub fn matches_name(&self, file_name: &str) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }
        let name = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Same as [`matches_name`](Self::matches_name), applied to the last path component.
    pub fn matches_path(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.matches_name(&name.to_string_lossy()),
            None => self.suffixes.is_empty(),
        }
    }

    /// Renders the filter back to its settings form.
    pub fn to_setting(&self) -> String {
        self.suffixes.join(",")
    }
}
