use crate::error::{Result, TreeError};
use crate::types::{normalize_tag, Chat, Folder, Node, NodeId, NodeKind, NodeType};
use serde::{Deserialize, Serialize};

/// Plain-data form of a node and its subtree, as handed to the persistence
/// layer. Older data written with a `type` key instead of `kind` still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub name: String,
    #[serde(alias = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SnapshotNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Snapshot of a whole tree is the snapshot of its root.
pub type TreeSnapshot = SnapshotNode;

impl From<&Node> for SnapshotNode {
    fn from(node: &Node) -> Self {
        match &node.kind {
            NodeKind::Folder(folder) => Self {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind: NodeType::Folder,
                expanded: Some(folder.expanded),
                children: Some(folder.children.iter().map(Self::from).collect()),
                link: None,
                tag: None,
            },
            NodeKind::Chat(chat) => Self {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind: NodeType::Chat,
                expanded: None,
                children: None,
                link: Some(chat.link.clone()),
                tag: chat.tag.clone(),
            },
        }
    }
}

impl TryFrom<SnapshotNode> for Node {
    type Error = TreeError;

    fn try_from(raw: SnapshotNode) -> Result<Self> {
        let SnapshotNode {
            id,
            name,
            kind,
            expanded,
            children,
            link,
            tag,
        } = raw;

        if id.trim().is_empty() {
            return Err(TreeError::invalid_snapshot("node with an empty id"));
        }
        if name.trim().is_empty() {
            return Err(TreeError::invalid_snapshot(format!(
                "node {id} has an empty name"
            )));
        }

        let kind = match kind {
            NodeType::Folder => {
                let children = children
                    .unwrap_or_default()
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<Vec<_>>>()?;
                NodeKind::Folder(Folder {
                    expanded: expanded.unwrap_or(true),
                    children,
                })
            }
            NodeType::Chat => {
                if children.as_ref().is_some_and(|c| !c.is_empty()) {
                    return Err(TreeError::invalid_snapshot(format!(
                        "chat {id} cannot have children"
                    )));
                }
                let link = link.filter(|l| !l.trim().is_empty()).ok_or_else(|| {
                    TreeError::invalid_snapshot(format!("chat {id} has no link"))
                })?;
                NodeKind::Chat(Chat {
                    link,
                    tag: normalize_tag(tag),
                })
            }
        };

        Ok(Self {
            id: NodeId::from(id),
            name,
            kind,
        })
    }
}
