use chatfold_tree::{ChatUpdate, DeleteReport, NodeId, Result, SnapshotNode, TreeStore};
use serde::{Deserialize, Serialize};

/// One user intent against the tree, as it arrives from an input surface.
///
/// Serialized as `{"action": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum TreeCommand {
    CreateFolder {
        parent_id: String,
        name: String,
    },
    CreateChat {
        parent_id: String,
        name: String,
        link: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
    Rename {
        id: String,
        name: String,
    },
    UpdateChat {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
    Delete {
        id: String,
    },
    Move {
        source_id: String,
        target_id: String,
    },
    Toggle {
        id: String,
    },
    ExpandAll,
    CollapseAll,
    Reveal {
        id: String,
    },
    Reset,
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Created { node: SnapshotNode },
    Renamed { id: NodeId },
    Updated { id: NodeId },
    Deleted { report: DeleteReport },
    Moved { id: NodeId, parent_id: NodeId },
    Toggled { id: NodeId, expanded: bool },
    Expansion { folders: usize, expanded: bool },
    Revealed { id: NodeId, opened: Vec<NodeId> },
    Reset,
}

impl TreeCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateFolder { .. } => "create_folder",
            Self::CreateChat { .. } => "create_chat",
            Self::Rename { .. } => "rename",
            Self::UpdateChat { .. } => "update_chat",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
            Self::Toggle { .. } => "toggle",
            Self::ExpandAll => "expand_all",
            Self::CollapseAll => "collapse_all",
            Self::Reveal { .. } => "reveal",
            Self::Reset => "reset",
        }
    }

    /// Run against `tree`. Nothing changes when this returns an error.
    pub fn apply(self, tree: &mut TreeStore) -> Result<CommandOutcome> {
        let outcome = match self {
            Self::CreateFolder { parent_id, name } => CommandOutcome::Created {
                node: SnapshotNode::from(tree.create_folder(&parent_id, &name)?),
            },
            Self::CreateChat {
                parent_id,
                name,
                link,
                tag,
            } => CommandOutcome::Created {
                node: SnapshotNode::from(tree.create_chat(
                    &parent_id,
                    &name,
                    &link,
                    tag.as_deref(),
                )?),
            },
            Self::Rename { id, name } => {
                tree.rename(&id, &name)?;
                CommandOutcome::Renamed { id: id.into() }
            }
            Self::UpdateChat {
                id,
                name,
                link,
                tag,
            } => {
                let update = ChatUpdate { name, link, tag };
                tree.update_chat(&id, update)?;
                CommandOutcome::Updated { id: id.into() }
            }
            Self::Delete { id } => CommandOutcome::Deleted {
                report: tree.delete_node(&id)?,
            },
            Self::Move {
                source_id,
                target_id,
            } => {
                tree.move_node(&source_id, &target_id)?;
                let parent_id = tree
                    .find_parent(&source_id)
                    .map(|parent| parent.id.clone())
                    .unwrap_or_else(NodeId::root);
                CommandOutcome::Moved {
                    id: source_id.into(),
                    parent_id,
                }
            }
            Self::Toggle { id } => {
                let expanded = tree.toggle_expanded(&id)?;
                CommandOutcome::Toggled {
                    id: id.into(),
                    expanded,
                }
            }
            Self::ExpandAll => CommandOutcome::Expansion {
                folders: tree.expand_all(),
                expanded: true,
            },
            Self::CollapseAll => CommandOutcome::Expansion {
                folders: tree.collapse_all(),
                expanded: false,
            },
            Self::Reveal { id } => {
                let opened = tree.reveal(&id)?;
                CommandOutcome::Revealed {
                    id: id.into(),
                    opened,
                }
            }
            Self::Reset => {
                tree.reset();
                CommandOutcome::Reset
            }
        };
        Ok(outcome)
    }
}
