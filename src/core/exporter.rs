//! Full-depth structure export as JSON records or a branch-drawn text tree.

use super::preview::root_name;
use super::scanner::{DirectoryScanner, TreeScan};
use super::{CoreError, CoreResult, TreeGenerator, TreeNode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One directory of an exported structure. The root directory is `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntry {
    pub path: String,
    pub files: Vec<String>,
}

impl StructureEntry {
    /// The directory path relative to the exported root, empty for the root.
    pub fn relative_dir(&self) -> PathBuf {
        if self.path == "." {
            PathBuf::new()
        } else {
            self.path.split('/').collect()
        }
    }
}

/// A utility struct for exporting a source tree.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeExporter;

impl TreeExporter {
    /// Flat `{path, files}` records in pre-order.
    pub fn collect(root: &Path) -> CoreResult<Vec<StructureEntry>> {
        let scan = DirectoryScanner::scan(root)?;
        Self::entries_from_scan(&scan)
    }

    fn entries_from_scan(scan: &TreeScan) -> CoreResult<Vec<StructureEntry>> {
        scan.listings
            .iter()
            .map(|listing| {
                let relative = scan.relative(&listing.path)?;
                Ok(StructureEntry {
                    path: to_export_path(relative),
                    files: listing.files.clone(),
                })
            })
            .collect()
    }

    pub fn export_json(root: &Path) -> CoreResult<String> {
        let entries = Self::collect(root)?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    pub fn export_text(root: &Path) -> CoreResult<String> {
        let entries = Self::collect(root)?;
        let tree = Self::to_tree(&root_name(root), &entries);
        Ok(TreeGenerator::generate_tree(&tree))
    }

    /// Writes JSON when `target` ends in `.json`, the text tree otherwise.
    pub fn write_export(root: &Path, target: &Path) -> CoreResult<()> {
        let is_json = target
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let content = if is_json {
            Self::export_json(root)?
        } else {
            Self::export_text(root)?
        };
        fs::write(target, content).map_err(|e| CoreError::Io(e, target.to_path_buf()))?;
        tracing::info!("Folder structure of {:?} exported to {:?}", root, target);
        Ok(())
    }

    pub fn parse_json(content: &str) -> CoreResult<Vec<StructureEntry>> {
        Ok(serde_json::from_str(content)?)
    }

    /// Rebuilds the relative directory and file paths an export describes.
    pub fn relative_paths(entries: &[StructureEntry]) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for entry in entries {
            let dir = entry.relative_dir();
            for file in &entry.files {
                paths.push(dir.join(file));
            }
            if !dir.as_os_str().is_empty() {
                paths.push(dir);
            }
        }
        paths
    }

    /// Nests flat records under a root node, directories first.
    pub fn to_tree(root_name: &str, entries: &[StructureEntry]) -> TreeNode {
        let mut root = TreeNode::directory(root_name);
        for entry in entries {
            let mut node = &mut root;
            for part in entry.relative_dir().iter() {
                let part = part.to_string_lossy();
                let index = match node.children.iter().position(|c| c.name == part) {
                    Some(index) => index,
                    None => {
                        node.children.push(TreeNode::directory(part.to_string()));
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[index];
            }
            node.children
                .extend(entry.files.iter().map(|name| TreeNode::file(name.as_str())));
        }
        root.sort_recursive();
        root
    }
}

fn to_export_path(relative: &Path) -> String {
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
