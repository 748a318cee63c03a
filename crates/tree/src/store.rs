use crate::change::{ChangeKind, TreeChange};
use crate::config::TreeConfig;
use crate::error::{MoveRejection, Result, TreeError};
use crate::ordering;
use crate::snapshot::TreeSnapshot;
use crate::stats::TreeStats;
use crate::types::{ChatUpdate, Folder, Node, NodeId, NodeKind, NodeType, ROOT_ID};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Outcome of deleting a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeType,

    /// Chats lifted into the former parent, in the order they were appended
    pub relocated: Vec<NodeId>,

    /// Folders removed, the deleted one included
    pub discarded_folders: usize,
}

/// Owner of a folder/chat hierarchy.
///
/// Every mutation validates first and then commits in one step, so a failed
/// call leaves the tree untouched. Parents are found by walking from the
/// root; nothing caches them.
pub struct TreeStore {
    root: Node,
    config: TreeConfig,
    revision: u64,
    changes: broadcast::Sender<TreeChange>,
}

impl TreeStore {
    /// Fresh tree holding only the root.
    pub fn new(config: TreeConfig) -> Self {
        let root = Node::root(config.root_name.clone());
        Self::with_root(root, config)
    }

    /// Rebuild a store from a persisted snapshot.
    pub fn from_snapshot(snapshot: TreeSnapshot, config: TreeConfig) -> Result<Self> {
        if snapshot.id != ROOT_ID {
            return Err(TreeError::invalid_snapshot(format!(
                "root id must be \"{ROOT_ID}\", found \"{}\"",
                snapshot.id
            )));
        }
        if snapshot.kind != NodeType::Folder {
            return Err(TreeError::invalid_snapshot("root must be a folder"));
        }

        let root = Node::try_from(snapshot)?;
        let mut seen = HashSet::new();
        check_unique_ids(&root, &mut seen)?;

        debug!("Loaded tree snapshot with {} nodes", seen.len());
        Ok(Self::with_root(root, config))
    }

    /// `from_snapshot` when something was persisted, a fresh tree otherwise.
    pub fn load_or_new(snapshot: Option<TreeSnapshot>, config: TreeConfig) -> Result<Self> {
        match snapshot {
            Some(snapshot) => Self::from_snapshot(snapshot, config),
            None => Ok(Self::new(config)),
        }
    }

    fn with_root(root: Node, config: TreeConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            root,
            config,
            revision: 0,
            changes,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot::from(&self.root)
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of mutations committed since the store was built.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Receive a [`TreeChange`] for every later mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<TreeChange> {
        self.changes.subscribe()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        find(&self.root, id)
    }

    /// Folder directly holding `id`; `None` for the root and unknown ids.
    pub fn find_parent(&self, id: &str) -> Option<&Node> {
        find_parent(&self.root, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Chain of folders from the root down to the parent of `id`.
    pub fn ancestors(&self, id: &str) -> Option<Vec<&Node>> {
        let mut trail = Vec::new();
        trail_to(&self.root, id, &mut trail).then_some(trail)
    }

    /// Names from the root down to and including the node itself.
    pub fn path_names(&self, id: &str) -> Option<Vec<String>> {
        let node = self.find_by_id(id)?;
        let mut names: Vec<String> = self
            .ancestors(id)?
            .into_iter()
            .map(|ancestor| ancestor.name.clone())
            .collect();
        names.push(node.name.clone());
        Some(names)
    }

    pub fn create_folder(&mut self, parent_id: &str, name: &str) -> Result<&Node> {
        let name = required("name", name)?;
        let node = Node::folder(self.fresh_id(), name);
        self.insert(parent_id, node)
    }

    pub fn create_chat(
        &mut self,
        parent_id: &str,
        name: &str,
        link: &str,
        tag: Option<&str>,
    ) -> Result<&Node> {
        let name = required("name", name)?;
        let link = required("link", link)?;
        let node = Node::chat(self.fresh_id(), name, link, tag.map(str::to_string));
        self.insert(parent_id, node)
    }

    fn insert(&mut self, parent_id: &str, node: Node) -> Result<&Node> {
        let auto_expand = self.config.auto_expand_on_add;
        let parent = find_mut(&mut self.root, parent_id)
            .and_then(Node::as_folder_mut)
            .ok_or_else(|| TreeError::ParentNotFound(parent_id.to_string()))?;

        if auto_expand {
            parent.expanded = true;
        }
        let id = node.id.clone();
        parent.children.push(node);

        self.commit(ChangeKind::Created {
            id: id.clone(),
            parent_id: NodeId::from(parent_id),
        });
        self.find_by_id(id.as_str())
            .ok_or_else(|| TreeError::not_found(id.as_str()))
    }

    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<()> {
        let name = required("name", new_name)?;
        let node =
            find_mut(&mut self.root, id).ok_or_else(|| TreeError::not_found(id))?;
        node.name = name;
        self.commit(ChangeKind::Renamed {
            id: NodeId::from(id),
        });
        Ok(())
    }

    /// Edit a chat's name, link and tag in one step.
    /// An update that sets nothing is refused.
    pub fn update_chat(&mut self, id: &str, update: ChatUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(TreeError::InvalidInput("update"));
        }
        let name = update
            .name
            .as_deref()
            .map(|n| required("name", n))
            .transpose()?;
        let link = update
            .link
            .as_deref()
            .map(|l| required("link", l))
            .transpose()?;

        let node =
            find_mut(&mut self.root, id).ok_or_else(|| TreeError::not_found(id))?;
        let chat = node
            .as_chat_mut()
            .ok_or_else(|| TreeError::NotAChat(id.to_string()))?;
        if let Some(link) = link {
            chat.link = link;
        }
        if let Some(tag) = update.tag {
            let trimmed = tag.trim();
            chat.tag = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(name) = name {
            node.name = name;
        }

        self.commit(ChangeKind::Updated {
            id: NodeId::from(id),
        });
        Ok(())
    }

    /// Delete a node. Chats anywhere below a deleted folder are appended to
    /// the folder's former parent; its sub-folders are dropped.
    pub fn delete_node(&mut self, id: &str) -> Result<DeleteReport> {
        if id == ROOT_ID {
            return Err(TreeError::Forbidden("delete"));
        }
        let parent =
            find_parent_folder_mut(&mut self.root, id).ok_or_else(|| TreeError::not_found(id))?;
        let position = parent
            .children
            .iter()
            .position(|child| child.id.as_str() == id)
            .ok_or_else(|| TreeError::not_found(id))?;

        let Node {
            id: removed_id,
            name,
            kind,
        } = parent.children.remove(position);

        let report = match kind {
            NodeKind::Chat(_) => DeleteReport {
                id: removed_id,
                name,
                kind: NodeType::Chat,
                relocated: Vec::new(),
                discarded_folders: 0,
            },
            NodeKind::Folder(folder) => {
                let mut lifted = Vec::new();
                let mut discarded_folders = 1;
                drain_chats(folder.children, &mut lifted, &mut discarded_folders);
                let relocated = lifted.iter().map(|chat| chat.id.clone()).collect();
                parent.children.extend(lifted);
                DeleteReport {
                    id: removed_id,
                    name,
                    kind: NodeType::Folder,
                    relocated,
                    discarded_folders,
                }
            }
        };

        self.commit(ChangeKind::Deleted {
            id: report.id.clone(),
            relocated: report.relocated.len(),
        });
        Ok(report)
    }

    /// Move `source_id` into `target_id`, or into the folder holding
    /// `target_id` when the target is a chat. The node lands last.
    pub fn move_node(&mut self, source_id: &str, target_id: &str) -> Result<()> {
        let (from, to) = match self.plan_move(source_id, target_id) {
            Ok(plan) => plan,
            Err(err) => {
                warn!("Refused to move {source_id} onto {target_id}: {err}");
                return Err(err);
            }
        };

        let parent = find_parent_folder_mut(&mut self.root, source_id)
            .ok_or_else(|| TreeError::not_found(source_id))?;
        let position = parent
            .children
            .iter()
            .position(|child| child.id.as_str() == source_id)
            .ok_or_else(|| TreeError::not_found(source_id))?;
        let node = parent.children.remove(position);

        // `to` is an existing folder outside the detached subtree.
        find_mut(&mut self.root, to.as_str())
            .and_then(Node::as_folder_mut)
            .ok_or_else(|| TreeError::not_found(to.as_str()))?
            .children
            .push(node);

        self.commit(ChangeKind::Moved {
            id: NodeId::from(source_id),
            from,
            to,
        });
        Ok(())
    }

    /// Validate a move and resolve `(current parent, destination folder)`.
    fn plan_move(&self, source_id: &str, target_id: &str) -> Result<(NodeId, NodeId)> {
        if source_id == target_id {
            return Err(MoveRejection::SameNode.into());
        }
        if source_id == ROOT_ID {
            return Err(MoveRejection::RootSource.into());
        }
        let source = self
            .find_by_id(source_id)
            .ok_or_else(|| TreeError::not_found(source_id))?;
        let target = self
            .find_by_id(target_id)
            .ok_or(MoveRejection::TargetNotFound)?;

        let destination = if target.is_folder() {
            target
        } else {
            self.find_parent(target_id)
                .ok_or(MoveRejection::TargetNotFound)?
        };

        let current_parent = self
            .find_parent(source_id)
            .ok_or_else(|| TreeError::not_found(source_id))?;
        if current_parent.id == destination.id {
            return Err(MoveRejection::NoOp.into());
        }
        if destination.id == source.id || find(source, destination.id.as_str()).is_some() {
            return Err(MoveRejection::Cycle.into());
        }

        Ok((current_parent.id.clone(), destination.id.clone()))
    }

    /// Flip a folder open or closed; returns the new state.
    pub fn toggle_expanded(&mut self, id: &str) -> Result<bool> {
        let node =
            find_mut(&mut self.root, id).ok_or_else(|| TreeError::not_found(id))?;
        let folder = node
            .as_folder_mut()
            .ok_or_else(|| TreeError::NotAFolder(id.to_string()))?;
        folder.expanded = !folder.expanded;
        let expanded = folder.expanded;

        self.commit(ChangeKind::Expansion {
            ids: vec![NodeId::from(id)],
            expanded,
        });
        Ok(expanded)
    }

    /// Open every folder, root included. Returns the number of folders.
    pub fn expand_all(&mut self) -> usize {
        self.set_all_expanded(true)
    }

    /// Close every folder, root included. Returns the number of folders.
    pub fn collapse_all(&mut self) -> usize {
        self.set_all_expanded(false)
    }

    fn set_all_expanded(&mut self, expanded: bool) -> usize {
        let mut ids = Vec::new();
        set_expanded_recursive(&mut self.root, expanded, &mut ids);
        let count = ids.len();
        self.commit(ChangeKind::Expansion { ids, expanded });
        count
    }

    /// Open every folder above `id` so the node becomes visible. Returns the
    /// folders that were closed before.
    pub fn reveal(&mut self, id: &str) -> Result<Vec<NodeId>> {
        let ancestors: Vec<NodeId> = self
            .ancestors(id)
            .ok_or_else(|| TreeError::not_found(id))?
            .into_iter()
            .filter(|ancestor| ancestor.expanded() == Some(false))
            .map(|ancestor| ancestor.id.clone())
            .collect();

        for ancestor in &ancestors {
            if let Some(folder) = find_mut(&mut self.root, ancestor.as_str())
                .and_then(Node::as_folder_mut)
            {
                folder.expanded = true;
            }
        }

        if !ancestors.is_empty() {
            self.commit(ChangeKind::Expansion {
                ids: ancestors.clone(),
                expanded: true,
            });
        }
        Ok(ancestors)
    }

    /// Chats anywhere below `id`; 0 for a chat or an unknown id.
    pub fn count_chats(&self, id: &str) -> usize {
        self.find_by_id(id).map_or(0, count_chats_in)
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(&self.root)
    }

    /// Children of `id` in display order. Stored order is left alone.
    pub fn ordered_children(&self, id: &str) -> Result<Vec<&Node>> {
        let node = self
            .find_by_id(id)
            .ok_or_else(|| TreeError::not_found(id))?;
        Ok(ordering::order(node.children()))
    }

    /// Drop everything but an empty root.
    pub fn reset(&mut self) {
        self.root = Node::root(self.config.root_name.clone());
        self.commit(ChangeKind::Reset);
    }

    fn fresh_id(&self) -> NodeId {
        loop {
            let id = NodeId::generate();
            if !self.contains(id.as_str()) {
                return id;
            }
        }
    }

    fn commit(&mut self, kind: ChangeKind) {
        self.revision += 1;
        debug!("Tree revision {}: {:?}", self.revision, kind);
        // No subscribers is fine.
        let _ = self.changes.send(TreeChange {
            revision: self.revision,
            kind,
        });
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TreeError::InvalidInput(field));
    }
    Ok(trimmed.to_string())
}

fn find<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
    if node.id.as_str() == id {
        return Some(node);
    }
    node.children().iter().find_map(|child| find(child, id))
}

fn find_mut<'a>(node: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if node.id.as_str() == id {
        return Some(node);
    }
    match &mut node.kind {
        NodeKind::Folder(folder) => folder
            .children
            .iter_mut()
            .find_map(|child| find_mut(child, id)),
        NodeKind::Chat(_) => None,
    }
}

fn find_parent<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
    let children = node.children();
    if children.iter().any(|child| child.id.as_str() == id) {
        return Some(node);
    }
    children.iter().find_map(|child| find_parent(child, id))
}

fn find_parent_folder_mut<'a>(node: &'a mut Node, id: &str) -> Option<&'a mut Folder> {
    let folder = node.as_folder_mut()?;
    if folder.children.iter().any(|child| child.id.as_str() == id) {
        return Some(folder);
    }
    folder
        .children
        .iter_mut()
        .find_map(|child| find_parent_folder_mut(child, id))
}

fn trail_to<'a>(node: &'a Node, id: &str, trail: &mut Vec<&'a Node>) -> bool {
    if node.id.as_str() == id {
        return true;
    }
    trail.push(node);
    if node.children().iter().any(|child| trail_to(child, id, trail)) {
        return true;
    }
    trail.pop();
    false
}

fn drain_chats(children: Vec<Node>, lifted: &mut Vec<Node>, discarded_folders: &mut usize) {
    for child in children {
        match child.kind {
            NodeKind::Folder(folder) => {
                *discarded_folders += 1;
                drain_chats(folder.children, lifted, discarded_folders);
            }
            NodeKind::Chat(_) => lifted.push(child),
        }
    }
}

fn count_chats_in(node: &Node) -> usize {
    node.children()
        .iter()
        .map(|child| match child.kind {
            NodeKind::Chat(_) => 1,
            NodeKind::Folder(_) => count_chats_in(child),
        })
        .sum()
}

fn set_expanded_recursive(node: &mut Node, expanded: bool, ids: &mut Vec<NodeId>) {
    if let NodeKind::Folder(folder) = &mut node.kind {
        folder.expanded = expanded;
        ids.push(node.id.clone());
        for child in &mut folder.children {
            set_expanded_recursive(child, expanded, ids);
        }
    }
}

fn check_unique_ids(node: &Node, seen: &mut HashSet<String>) -> Result<()> {
    if !seen.insert(node.id.to_string()) {
        return Err(TreeError::invalid_snapshot(format!(
            "duplicate id {}",
            node.id
        )));
    }
    for child in node.children() {
        check_unique_ids(child, seen)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> TreeStore {
        TreeStore::default()
    }

    fn child_names(store: &TreeStore, id: &str) -> Vec<String> {
        store
            .find_by_id(id)
            .unwrap()
            .children()
            .iter()
            .map(|n| n.name.clone())
            .collect()
    }

    fn add_chat(store: &mut TreeStore, parent: &str, name: &str) -> NodeId {
        store
            .create_chat(parent, name, "https://x", None)
            .unwrap()
            .id
            .clone()
    }

    fn expanded(store: &TreeStore, id: &NodeId) -> Option<bool> {
        store.find_by_id(id.as_str())?.expanded()
    }

    fn add_folder(store: &mut TreeStore, parent: &str, name: &str) -> NodeId {
        store.create_folder(parent, name).unwrap().id.clone()
    }

    #[test]
    fn fresh_tree_is_root_only() {
        let store = store();
        let root = store.root();
        assert_eq!(root.id.as_str(), ROOT_ID);
        assert_eq!(root.name, "Home");
        assert_eq!(root.expanded(), Some(true));
        assert!(root.children().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn create_under_missing_or_chat_parent_fails() {
        let mut store = store();
        let chat = add_chat(&mut store, "root", "Hello");

        assert_eq!(
            store.create_folder("nope", "A").unwrap_err(),
            TreeError::ParentNotFound("nope".into())
        );
        assert_eq!(
            store.create_folder(chat.as_str(), "A").unwrap_err(),
            TreeError::ParentNotFound(chat.to_string())
        );
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn blank_fields_are_invalid_input() {
        let mut store = store();
        assert_eq!(
            store.create_folder("root", "  ").unwrap_err(),
            TreeError::InvalidInput("name")
        );
        assert_eq!(
            store.create_chat("root", "Hi", "", None).unwrap_err(),
            TreeError::InvalidInput("link")
        );
        assert!(store.root().children().is_empty());
    }

    #[test]
    fn collapsed_parent_stays_collapsed_by_default() {
        let mut store = store();
        let folder = add_folder(&mut store, "root", "A");
        store.toggle_expanded(folder.as_str()).unwrap();
        add_chat(&mut store, folder.as_str(), "x");
        assert_eq!(expanded(&store, &folder), Some(false));
    }

    #[test]
    fn auto_expand_on_add_opens_parent() {
        let mut store = TreeStore::new(TreeConfig::expanding());
        let folder = add_folder(&mut store, "root", "A");
        store.toggle_expanded(folder.as_str()).unwrap();
        add_folder(&mut store, folder.as_str(), "B");
        assert_eq!(expanded(&store, &folder), Some(true));
    }

    #[test]
    fn rename_and_update_chat() {
        let mut store = store();
        let chat = store
            .create_chat("root", "Hello", "https://x", Some("work"))
            .unwrap()
            .id
            .clone();

        store.rename(chat.as_str(), " Bonjour ").unwrap();
        store
            .update_chat(
                chat.as_str(),
                ChatUpdate::default().link("https://y").tag(""),
            )
            .unwrap();

        let node = store.find_by_id(chat.as_str()).unwrap();
        assert_eq!(node.name, "Bonjour");
        assert_eq!(node.as_chat().unwrap().link, "https://y");
        assert_eq!(node.as_chat().unwrap().tag, None);

        assert_eq!(
            store.rename("ghost", "x").unwrap_err(),
            TreeError::not_found("ghost")
        );
        assert_eq!(
            store.rename(chat.as_str(), "").unwrap_err(),
            TreeError::InvalidInput("name")
        );
        assert_eq!(
            store
                .update_chat("root", ChatUpdate::default().name("x"))
                .unwrap_err(),
            TreeError::NotAChat("root".into())
        );
    }

    #[test]
    fn invalid_update_leaves_chat_untouched() {
        let mut store = store();
        let chat = add_chat(&mut store, "root", "Hello");
        let err = store
            .update_chat(
                chat.as_str(),
                ChatUpdate::default().name("New").link(" "),
            )
            .unwrap_err();
        assert_eq!(err, TreeError::InvalidInput("link"));
        let node = store.find_by_id(chat.as_str()).unwrap();
        assert_eq!(node.name, "Hello");
    }

    #[test]
    fn empty_update_is_refused_without_a_commit() {
        let mut store = store();
        let chat = add_chat(&mut store, "root", "Hello");
        let mut rx = store.subscribe();
        let revision = store.revision();

        assert!(ChatUpdate::default().is_empty());
        assert_eq!(
            store.update_chat(chat.as_str(), ChatUpdate::default()),
            Err(TreeError::InvalidInput("update"))
        );
        assert_eq!(store.revision(), revision);
        assert!(rx.try_recv().is_err());

        // Clearing the tag is a real edit
        store
            .update_chat(chat.as_str(), ChatUpdate::default().tag(""))
            .unwrap();
        assert_eq!(store.revision(), revision + 1);
    }

    #[test]
    fn delete_root_is_forbidden() {
        let mut store = store();
        assert_eq!(
            store.delete_node("root").unwrap_err(),
            TreeError::Forbidden("delete")
        );
        assert_eq!(
            store.delete_node("ghost").unwrap_err(),
            TreeError::not_found("ghost")
        );
    }

    #[test]
    fn delete_folder_lifts_nested_chats_to_parent() {
        let mut store = store();
        let outer = add_folder(&mut store, "root", "Outer");
        let a = add_folder(&mut store, outer.as_str(), "A");
        add_chat(&mut store, a.as_str(), "one");
        let b = add_folder(&mut store, a.as_str(), "B");
        add_chat(&mut store, b.as_str(), "two");
        add_chat(&mut store, a.as_str(), "three");
        add_chat(&mut store, outer.as_str(), "sibling");

        let before = store.count_chats("root");
        let report = store.delete_node(a.as_str()).unwrap();

        assert_eq!(report.kind, NodeType::Folder);
        assert_eq!(report.discarded_folders, 2);
        assert_eq!(report.relocated.len(), 3);
        assert_eq!(store.count_chats("root"), before);
        assert_eq!(
            child_names(&store, outer.as_str()),
            vec!["sibling", "one", "two", "three"]
        );
        assert!(store.find_by_id(a.as_str()).is_none());
        assert!(store.find_by_id(b.as_str()).is_none());
    }

    #[test]
    fn move_rules() {
        let mut store = store();
        let a = add_folder(&mut store, "root", "A");
        let b = add_folder(&mut store, a.as_str(), "B");
        let chat = add_chat(&mut store, b.as_str(), "x");
        let other = add_chat(&mut store, "root", "y");

        let rejected = |reason| -> Result<()> { Err(TreeError::Rejected(reason)) };
        assert_eq!(
            store.move_node(a.as_str(), a.as_str()),
            rejected(MoveRejection::SameNode)
        );
        assert_eq!(
            store.move_node("root", a.as_str()),
            rejected(MoveRejection::RootSource)
        );
        assert_eq!(
            store.move_node(a.as_str(), "ghost"),
            rejected(MoveRejection::TargetNotFound)
        );
        assert_eq!(
            store.move_node(a.as_str(), b.as_str()),
            rejected(MoveRejection::Cycle)
        );
        // onto a chat inside its own subtree
        assert_eq!(
            store.move_node(a.as_str(), chat.as_str()),
            rejected(MoveRejection::Cycle)
        );
        assert_eq!(
            store.move_node(chat.as_str(), b.as_str()),
            rejected(MoveRejection::NoOp)
        );
        assert_eq!(
            store.move_node(a.as_str(), other.as_str()),
            rejected(MoveRejection::NoOp)
        );
        assert_eq!(
            store.move_node("ghost", a.as_str()),
            Err(TreeError::not_found("ghost"))
        );

        let revision = store.revision();
        store.move_node(chat.as_str(), other.as_str()).unwrap();
        assert_eq!(store.find_parent(chat.as_str()).unwrap().id, NodeId::root());
        assert_eq!(child_names(&store, "root"), vec!["A", "y", "x"]);
        assert_eq!(store.revision(), revision + 1);

        store.move_node(b.as_str(), "root").unwrap();
        assert_eq!(store.find_parent(b.as_str()).unwrap().id, NodeId::root());
        assert_eq!(store.count_chats(a.as_str()), 0);
        assert_eq!(child_names(&store, a.as_str()), Vec::<String>::new());
    }

    #[test]
    fn moved_subtree_keeps_its_contents() {
        let mut store = store();
        let a = add_folder(&mut store, "root", "A");
        let b = add_folder(&mut store, "root", "B");
        let inner = add_folder(&mut store, a.as_str(), "Inner");
        let chat = add_chat(&mut store, inner.as_str(), "deep");

        store.move_node(a.as_str(), b.as_str()).unwrap();

        assert_eq!(child_names(&store, "root"), vec!["B"]);
        assert_eq!(child_names(&store, b.as_str()), vec!["A"]);
        assert_eq!(
            store.path_names(chat.as_str()).unwrap(),
            vec!["Home", "B", "A", "Inner", "deep"]
        );
        assert_eq!(store.count_chats(b.as_str()), 1);
    }

    #[test]
    fn toggle_and_bulk_expansion() {
        let mut store = store();
        let a = add_folder(&mut store, "root", "A");
        let b = add_folder(&mut store, a.as_str(), "B");
        let chat = add_chat(&mut store, b.as_str(), "x");

        assert_eq!(store.toggle_expanded(a.as_str()), Ok(false));
        assert_eq!(store.toggle_expanded(a.as_str()), Ok(true));
        assert_eq!(
            store.toggle_expanded(chat.as_str()),
            Err(TreeError::NotAFolder(chat.to_string()))
        );
        assert_eq!(
            store.toggle_expanded("ghost"),
            Err(TreeError::not_found("ghost"))
        );

        assert_eq!(store.collapse_all(), 3);
        assert_eq!(store.root().expanded(), Some(false));
        assert_eq!(expanded(&store, &b), Some(false));

        let opened = store.reveal(chat.as_str()).unwrap();
        assert_eq!(opened, vec![NodeId::root(), a.clone(), b.clone()]);
        assert_eq!(store.reveal(chat.as_str()).unwrap(), Vec::<NodeId>::new());

        assert_eq!(store.expand_all(), 3);
        assert_eq!(expanded(&store, &b), Some(true));
    }

    #[test]
    fn ancestors_and_paths() {
        let mut store = store();
        let a = add_folder(&mut store, "root", "A");
        let chat = add_chat(&mut store, a.as_str(), "x");

        assert_eq!(
            store.path_names(chat.as_str()).unwrap(),
            vec!["Home", "A", "x"]
        );
        assert_eq!(store.ancestors("root").unwrap().len(), 0);
        assert!(store.ancestors("ghost").is_none());
        assert!(store.find_parent("root").is_none());
    }

    #[test]
    fn count_chats_on_chat_is_zero() {
        let mut store = store();
        let chat = add_chat(&mut store, "root", "x");
        assert_eq!(store.count_chats(chat.as_str()), 0);
        assert_eq!(store.count_chats("ghost"), 0);
        assert_eq!(store.count_chats("root"), 1);
    }

    #[test]
    fn ordered_children_does_not_touch_storage() {
        let mut store = store();
        add_chat(&mut store, "root", "b");
        add_chat(&mut store, "root", "a");
        add_folder(&mut store, "root", "z");

        let ordered: Vec<_> = store
            .ordered_children("root")
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(ordered, vec!["z", "a", "b"]);
        assert_eq!(child_names(&store, "root"), vec!["b", "a", "z"]);
        assert!(store.ordered_children("ghost").is_err());
    }

    #[test]
    fn snapshot_round_trip_and_duplicate_ids() {
        let mut store = store();
        let a = add_folder(&mut store, "root", "A");
        store.create_chat(a.as_str(), "x", "l", Some("t")).unwrap();

        let snapshot = store.snapshot();
        let restored =
            TreeStore::from_snapshot(snapshot.clone(), TreeConfig::default()).unwrap();
        assert_eq!(restored.root(), store.root());

        let mut duplicated = snapshot;
        let copy = duplicated.children.as_ref().unwrap()[0].clone();
        duplicated.children.as_mut().unwrap().push(copy);
        assert!(matches!(
            TreeStore::from_snapshot(duplicated, TreeConfig::default()),
            Err(TreeError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn snapshot_root_must_be_root_folder() {
        let mut snapshot = store().snapshot();
        snapshot.id = "other".into();
        let restored = TreeStore::from_snapshot(snapshot, TreeConfig::default());
        assert!(restored.is_err());
    }

    #[test]
    fn changes_are_broadcast() {
        let mut store = store();
        let mut rx = store.subscribe();
        let id = add_folder(&mut store, "root", "A");
        store.rename(id.as_str(), "B").unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.revision, 1);
        assert_eq!(
            first.kind,
            ChangeKind::Created {
                id: id.clone(),
                parent_id: NodeId::root()
            }
        );
        assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::Renamed { id });
    }

    #[test]
    fn failed_mutations_are_not_broadcast() {
        let mut store = store();
        let mut rx = store.subscribe();
        let _ = store.delete_node("root");
        let _ = store.move_node("root", "root");
        assert!(rx.try_recv().is_err());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn reset_keeps_root_name() {
        let mut store = store();
        add_folder(&mut store, "root", "A");
        store.reset();
        assert!(store.root().children().is_empty());
        assert_eq!(store.stats().nodes, 1);
    }
}
