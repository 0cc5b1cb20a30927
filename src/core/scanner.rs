use super::{CoreError, CoreResult, DirListing, ExtensionFilter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A full walk of a source tree, grouped per directory in pre-order.
#[derive(Debug, Clone, Default)]
pub struct TreeScan {
    pub root: PathBuf,
    pub listings: Vec<DirListing>,
    /// Entries the walk could not read, with the error text.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl TreeScan {
    /// Number of files accepted by `filter` across all listings.
    pub fn count_matching(&self, filter: &ExtensionFilter) -> usize {
        self.listings
            .iter()
            .map(|listing| {
                listing
                    .files
                    .iter()
                    .filter(|name| filter.matches_name(name))
                    .count()
            })
            .sum()
    }

    /// Path of `dir` relative to the scanned root; the root itself is empty.
    pub fn relative<'a>(&self, dir: &'a Path) -> CoreResult<&'a Path> {
        Ok(dir.strip_prefix(&self.root)?)
    }
}

/// Walks source trees for the copy pass, counting and export.
///
/// This struct is stateless and provides methods as associated functions.
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Walks `root` once, without following symlinks, sorted by file name.
    ///
    /// Anything that is not a directory is listed as a file of its parent,
    /// except symlinks to directories, which are neither listed nor entered.
    pub fn scan(root: &Path) -> CoreResult<TreeScan> {
        if !root.is_dir() {
            return Err(CoreError::NotADirectory(root.to_path_buf()));
        }

        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

        let mut scan = TreeScan {
            root: root.to_path_buf(),
            ..Default::default()
        };
        let mut index: HashMap<PathBuf, usize> = HashMap::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    tracing::warn!("Skipping unreadable entry {:?}: {}", path, e);
                    scan.unreadable.push((path, e.to_string()));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                index.insert(entry.path().to_path_buf(), scan.listings.len());
                scan.listings.push(DirListing {
                    path: entry.path().to_path_buf(),
                    files: Vec::new(),
                });
                continue;
            }

            if entry.path_is_symlink() && entry.path().is_dir() {
                tracing::debug!("Not following directory link {:?}", entry.path());
                continue;
            }

            let slot = entry.path().parent().and_then(|parent| index.get(parent));
            if let Some(&slot) = slot {
                scan.listings[slot]
                    .files
                    .push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        tracing::debug!(
            "Scanned {:?}: {} directories, {} unreadable entries",
            root,
            scan.listings.len(),
            scan.unreadable.len()
        );
        Ok(scan)
    }
}

/// Counts the files under `root` accepted by `filter`.
///
/// This is the denominator for progress reporting during a copy pass.
pub fn count_matching(root: &Path, filter: &ExtensionFilter) -> CoreResult<usize> {
    let scan = DirectoryScanner::scan(root)?;
    Ok(scan.count_matching(filter))
}
