//! Read-only, depth-limited tree listings for display.

use super::ExtensionFilter;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// A nested label structure for a preview or an exported tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
    /// Set when the directory could not be listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TreeNode {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            note: None,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            note: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Display label with a directory or file marker.
    pub fn label(&self) -> String {
        match self.kind {
            NodeKind::Directory => format!("📁 {}", self.name),
            NodeKind::File => format!("📄 {}", self.name),
        }
    }

    /// Directories first, then files, each group by name.
    pub fn sort_recursive(&mut self) {
        self.children.sort_by(compare_nodes);
        for child in &mut self.children {
            child.sort_recursive();
        }
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.name == name)
    }
}

fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Display name for a root path, falling back to the full path for `/` and the like.
pub fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Lists `root` down to `max_depth` levels.
///
/// Depth 1 shows the root's direct entries without expanding subdirectories.
/// With a filter, non-matching files are hidden while directories are always
/// shown. A directory that cannot be read carries a note instead of children.
/// Links to directories are shown as directories but never expanded.
pub fn list_tree(root: &Path, max_depth: usize, filter: Option<&ExtensionFilter>) -> TreeNode {
    let mut node = TreeNode::directory(root_name(root));
    add_children(&mut node, root, 1, max_depth, filter);
    node
}

fn add_children(
    node: &mut TreeNode,
    path: &Path,
    depth: usize,
    max_depth: usize,
    filter: Option<&ExtensionFilter>,
) {
    if depth > max_depth {
        return;
    }

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Error reading directory {:?}: {}", path, e);
            node.note = Some(format!("Error reading directory {}: {}", path.display(), e));
            return;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type().ok();
        let is_link = file_type.is_some_and(|t| t.is_symlink());
        let is_dir = file_type.is_some_and(|t| t.is_dir());

        if is_link && entry.path().is_dir() {
            node.children.push(TreeNode::directory(name));
        } else if is_dir {
            let mut child = TreeNode::directory(name);
            add_children(&mut child, &entry.path(), depth + 1, max_depth, filter);
            node.children.push(child);
        } else if filter.is_none_or(|f| f.matches_name(&name)) {
            node.children.push(TreeNode::file(name));
        }
    }

    node.children.sort_by(compare_nodes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_helpers::{create_file, running_as_root};
    use tempfile::tempdir;

    #[test]
    fn test_depth_limits_expansion() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "top.txt", "");
        create_file(dir.path(), "a/b/c/deep.txt", "");

        let shallow = list_tree(dir.path(), 1, None);
        let a = shallow.find("a").unwrap();
        assert!(a.is_directory());
        assert!(a.children.is_empty());
        assert!(shallow.find("top.txt").is_some());

        let deeper = list_tree(dir.path(), 3, None);
        let c = deeper.find("a").unwrap().find("b").unwrap().find("c").unwrap();
        assert!(c.children.is_empty());

        let full = list_tree(dir.path(), 4, None);
        let c = full.find("a").unwrap().find("b").unwrap().find("c").unwrap();
        assert_eq!(c.children, vec![TreeNode::file("deep.txt")]);
    }

    #[test]
    fn test_directories_sort_before_files() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "a.txt", "");
        create_file(dir.path(), "zdir/x.txt", "");
        let tree = list_tree(dir.path(), 2, None);
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zdir", "a.txt"]);
    }

    #[test]
    fn test_filter_hides_files_but_keeps_directories() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "keep.TXT", "");
        create_file(dir.path(), "drop.md", "");
        create_file(dir.path(), "only_md/inner.md", "");

        let filter = ExtensionFilter::parse(".txt");
        let tree = list_tree(dir.path(), 5, Some(&filter));

        assert!(tree.find("keep.TXT").is_some());
        assert!(tree.find("drop.md").is_none());
        let only_md = tree.find("only_md").unwrap();
        assert!(only_md.children.is_empty());
        assert_eq!(tree.label(), format!("📁 {}", root_name(dir.path())));
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_link_is_shown_as_unexpanded_directory() {
        let dir = tempdir().unwrap();
        create_file(dir.path(), "real/a.txt", "");
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let tree = list_tree(dir.path(), 5, None);

        let link = tree.find("link").unwrap();
        assert!(link.is_directory());
        assert!(link.children.is_empty());
        assert_eq!(tree.find("real").unwrap().children, vec![TreeNode::file("a.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_gets_note() {
        use std::os::unix::fs::PermissionsExt;
        if running_as_root() {
            return;
        }
        let dir = tempdir().unwrap();
        create_file(dir.path(), "locked/secret.txt", "");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let tree = list_tree(dir.path(), 3, None);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let node = tree.find("locked").unwrap();
        assert!(node.children.is_empty());
        assert!(node.note.as_deref().unwrap().contains("Error reading directory"));
    }
}
