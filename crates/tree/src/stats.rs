use crate::types::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// Totals over a subtree, the subtree root included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of nodes of any kind
    pub nodes: usize,

    /// Number of folders
    pub folders: usize,

    /// Number of chats
    pub chats: usize,

    /// Deepest level below the subtree root (0 when it has no children)
    pub depth: usize,
}

impl TreeStats {
    pub fn collect(node: &Node) -> Self {
        let mut stats = Self::default();
        stats.visit(node, 0);
        stats
    }

    fn visit(&mut self, node: &Node, level: usize) {
        self.nodes += 1;
        self.depth = self.depth.max(level);
        match &node.kind {
            NodeKind::Folder(folder) => {
                self.folders += 1;
                for child in &folder.children {
                    self.visit(child, level + 1);
                }
            }
            NodeKind::Chat(_) => self.chats += 1,
        }
    }
}
