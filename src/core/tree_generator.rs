//! Generates an ASCII representation of a directory tree.

use super::TreeNode;

/// A utility struct for rendering a [`TreeNode`] as branch-drawn text.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders `root` and everything below it, one node per line.
    pub fn generate_tree(root: &TreeNode) -> String {
        let mut result = format!("{}\n", root.label());
        Self::render_children(root, &mut result, "");
        result
    }

    /// Recursively renders the children of a node.
    fn render_children(node: &TreeNode, result: &mut String, prefix: &str) {
        let line_count = node.children.len() + usize::from(node.note.is_some());

        for (i, child) in node.children.iter().enumerate() {
            let is_last = i + 1 == line_count;
            let connector = if is_last { "└── " } else { "├── " };

            result.push_str(&format!("{prefix}{connector}{}\n", child.label()));

            if !child.children.is_empty() || child.note.is_some() {
                let new_prefix = if is_last {
                    format!("{prefix}    ")
                } else {
                    format!("{prefix}│   ")
                };
                Self::render_children(child, result, &new_prefix);
            }
        }

        if let Some(note) = &node.note {
            result.push_str(&format!("{prefix}└── [{note}]\n"));
        }
    }
}
