use crate::command::{CommandOutcome, TreeCommand};
use crate::error::Result;
use crate::store::SnapshotStore;
use chatfold_search::{SearchConfig, SearchEntry, SearchIndex};
use chatfold_tree::{TreeChange, TreeConfig, TreeSnapshot, TreeStore};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// What the presentation should draw: the tree or a result list, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    Tree { root: TreeSnapshot },
    Results { query: String, entries: Vec<SearchEntry> },
}

impl ViewState {
    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree { .. })
    }
}

/// A tree, its search index and the store that persists them, kept in step.
pub struct Session<S> {
    tree: TreeStore,
    index: SearchIndex,
    changes: broadcast::Receiver<TreeChange>,
    index_stale: bool,
    persistence: S,
}

impl<S: SnapshotStore> Session<S> {
    /// Load from `persistence`, starting a root-only tree when it holds
    /// nothing yet.
    pub async fn open(
        persistence: S,
        tree_config: TreeConfig,
        search_config: SearchConfig,
    ) -> Result<Self> {
        tree_config.validate()?;
        search_config.validate()?;

        let snapshot = persistence.load().await?;
        if snapshot.is_none() {
            info!(
                "No saved tree at {}, starting fresh",
                persistence.describe()
            );
        }
        let tree = TreeStore::load_or_new(snapshot, tree_config)?;
        let index = SearchIndex::from_tree(tree.root(), search_config);
        info!(
            "Opened tree from {} ({} chats indexed)",
            persistence.describe(),
            index.len()
        );

        Ok(Self {
            changes: tree.subscribe(),
            tree,
            index,
            index_stale: false,
            persistence,
        })
    }

    pub const fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub const fn persistence(&self) -> &S {
        &self.persistence
    }

    /// Current index, rebuilt first if a mutation left it behind
    pub fn index(&mut self) -> &SearchIndex {
        self.refresh_index();
        &self.index
    }

    /// Run a command; on success the snapshot is saved and the index kept
    /// current. A tree error leaves everything as it was. A save error is
    /// returned after the in-memory change has been kept.
    pub async fn apply(&mut self, command: TreeCommand) -> Result<CommandOutcome> {
        let name = command.name();
        let outcome = command.apply(&mut self.tree)?;
        debug!("Applied {name}");

        if self.drain_changes() {
            self.save().await?;
        }
        Ok(outcome)
    }

    pub fn search(&mut self, query: &str) -> Vec<SearchEntry> {
        self.index().search(query)
    }

    /// Results for `query`, or the tree when the query is too short to search.
    pub fn view(&mut self, query: &str) -> ViewState {
        let query = query.trim();
        if query.chars().count() < self.index.config().min_query_len {
            return ViewState::Tree {
                root: self.tree.snapshot(),
            };
        }
        ViewState::Results {
            query: query.to_string(),
            entries: self.search(query),
        }
    }

    pub async fn save(&self) -> Result<()> {
        let snapshot = self.tree.snapshot();
        if let Err(err) = self.persistence.save(&snapshot).await {
            warn!(
                "Failed to save tree to {}: {err}",
                self.persistence.describe()
            );
            return Err(err.into());
        }
        debug!("Saved tree to {}", self.persistence.describe());
        Ok(())
    }

    /// Consume pending change notifications. Returns whether any arrived.
    fn drain_changes(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    changed = true;
                    self.index_stale |= change.kind.affects_index();
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!("Missed {skipped} tree changes, marking index stale");
                    changed = true;
                    self.index_stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if self.index_stale && self.index.config().rebuild_on_change {
            self.refresh_index();
        }
        changed
    }

    fn refresh_index(&mut self) {
        if self.index_stale {
            self.index.rebuild(self.tree.root());
            self.index_stale = false;
        }
    }
}
