use crate::types::NodeId;
use serde::Serialize;

/// Broadcast after every committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeChange {
    /// Store revision after the mutation
    pub revision: u64,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeKind {
    Created { id: NodeId, parent_id: NodeId },
    Renamed { id: NodeId },
    Updated { id: NodeId },
    Deleted { id: NodeId, relocated: usize },
    Moved { id: NodeId, from: NodeId, to: NodeId },
    Expansion { ids: Vec<NodeId>, expanded: bool },
    Reset,
}

impl ChangeKind {
    /// Whether the change can alter what the search index holds.
    ///
    /// Expansion state is not indexed.
    #[must_use]
    pub const fn affects_index(&self) -> bool {
        !matches!(self, Self::Expansion { .. })
    }
}
