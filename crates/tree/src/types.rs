use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Id of the immortal root folder.
pub const ROOT_ID: &str = "root";

/// Opaque node identifier, stable for the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Fresh random id (UUID v4, simple form).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Discriminant of a node, as written in snapshots and search entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Folder,
    Chat,
}

/// A folder or a chat in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,

    /// Display name (never blank)
    pub name: String,

    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Folder(Folder),
    Chat(Chat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub expanded: bool,

    /// Owned children in insertion order
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub link: String,
    pub tag: Option<String>,
}

/// Partial edit of a chat. `None` leaves a field untouched; an empty `tag`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ChatUpdate {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.link.is_none() && self.tag.is_none()
    }
}

impl Node {
    /// Empty, expanded root folder.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self::folder(NodeId::root(), name)
    }

    #[must_use]
    pub fn folder(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Folder(Folder {
                expanded: true,
                children: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn chat(
        id: NodeId,
        name: impl Into<String>,
        link: impl Into<String>,
        tag: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Chat(Chat {
                link: link.into(),
                tag: normalize_tag(tag),
            }),
        }
    }

    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Folder(_) => NodeType::Folder,
            NodeKind::Chat(_) => NodeType::Chat,
        }
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    #[must_use]
    pub const fn is_chat(&self) -> bool {
        matches!(self.kind, NodeKind::Chat(_))
    }

    #[must_use]
    pub const fn as_folder(&self) -> Option<&Folder> {
        match &self.kind {
            NodeKind::Folder(folder) => Some(folder),
            NodeKind::Chat(_) => None,
        }
    }

    pub fn as_folder_mut(&mut self) -> Option<&mut Folder> {
        match &mut self.kind {
            NodeKind::Folder(folder) => Some(folder),
            NodeKind::Chat(_) => None,
        }
    }

    #[must_use]
    pub const fn as_chat(&self) -> Option<&Chat> {
        match &self.kind {
            NodeKind::Chat(chat) => Some(chat),
            NodeKind::Folder(_) => None,
        }
    }

    pub fn as_chat_mut(&mut self) -> Option<&mut Chat> {
        match &mut self.kind {
            NodeKind::Chat(chat) => Some(chat),
            NodeKind::Folder(_) => None,
        }
    }

    /// Children of a folder; always empty for a chat.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Folder(folder) => &folder.children,
            NodeKind::Chat(_) => &[],
        }
    }

    /// `Some(expanded)` for folders.
    #[must_use]
    pub const fn expanded(&self) -> Option<bool> {
        match &self.kind {
            NodeKind::Folder(folder) => Some(folder.expanded),
            NodeKind::Chat(_) => None,
        }
    }
}

pub(crate) fn normalize_tag(tag: Option<String>) -> Option<String> {
    tag.map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_and_not_root() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert!(!a.is_root());
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn chat_has_no_children_and_no_expansion() {
        let chat = Node::chat(NodeId::from("c1"), "Hello", "https://x", None);
        assert!(chat.children().is_empty());
        assert_eq!(chat.expanded(), None);
        assert_eq!(chat.node_type(), NodeType::Chat);
    }

    #[test]
    fn blank_tag_is_dropped() {
        let chat = Node::chat(NodeId::from("c1"), "Hello", "https://x", Some("  ".into()));
        assert_eq!(chat.as_chat().and_then(|c| c.tag.clone()), None);

        let tagged = Node::chat(NodeId::from("c2"), "Hi", "https://y", Some(" work ".into()));
        let tag = tagged.as_chat().and_then(|c| c.tag.as_deref());
        assert_eq!(tag, Some("work"));
    }

    #[test]
    fn new_folder_starts_expanded() {
        let folder = Node::folder(NodeId::from("f"), "Docs");
        assert_eq!(folder.expanded(), Some(true));
        assert!(folder.children().is_empty());
    }
}
