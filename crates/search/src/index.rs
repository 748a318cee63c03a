use crate::config::SearchConfig;
use crate::highlight::contains_folded;
use chatfold_tree::{ordering, Node, NodeId, NodeKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// One searchable chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub link: String,
    /// Names from the root down to and including the chat itself
    pub path: Vec<String>,
}

impl SearchEntry {
    /// Breadcrumb shown under a result, e.g. `Home / Work / Standup`
    #[must_use]
    pub fn display_path(&self) -> String {
        self.path.join(" / ")
    }

    fn matches(&self, folded_query: &str) -> bool {
        contains_folded(&self.name, folded_query)
            || self
                .tag
                .as_deref()
                .is_some_and(|tag| contains_folded(tag, folded_query))
    }
}

/// Flat, rebuildable list of every chat in a tree.
///
/// Cloning is cheap: entries live behind an `Arc` and a rebuild swaps the
/// whole list, so a clone handed to a background task keeps its own view.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Arc<Vec<SearchEntry>>,
    config: SearchConfig,
}

impl SearchIndex {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            config,
        }
    }

    pub fn from_tree(root: &Node, config: SearchConfig) -> Self {
        let mut index = Self::new(config);
        index.rebuild(root);
        index
    }

    /// Replace the index with every chat reachable from `root`, in depth-first
    /// order. Returns the number of entries.
    pub fn rebuild(&mut self, root: &Node) -> usize {
        let mut entries = Vec::new();
        let mut path = vec![root.name.clone()];
        collect(root, &mut path, &mut entries);

        log::debug!("Search index rebuilt with {} chats", entries.len());
        self.entries = Arc::new(entries);
        self.entries.len()
    }

    /// Chats whose name or tag contains `query`, case-insensitively, in index
    /// order. Queries shorter than the configured minimum match nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchEntry> {
        let query = query.trim();
        if query.is_empty() || query.chars().count() < self.config.min_query_len {
            return Vec::new();
        }

        let folded = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches(&folded))
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }
}

fn collect(node: &Node, path: &mut Vec<String>, out: &mut Vec<SearchEntry>) {
    for child in node.children() {
        path.push(child.name.clone());
        match &child.kind {
            NodeKind::Chat(chat) => out.push(SearchEntry {
                id: child.id.clone(),
                name: child.name.clone(),
                tag: chat.tag.clone(),
                link: chat.link.clone(),
                path: path.clone(),
            }),
            NodeKind::Folder(_) => collect(child, path, out),
        }
        path.pop();
    }
}

/// Sort results for display by name collation, then by breadcrumb.
pub fn sort_entries(entries: &mut [SearchEntry]) {
    entries.sort_by(|a, b| {
        ordering::compare_names(&a.name, &b.name)
            .then_with(|| compare_paths(&a.path, &b.path))
    });
}

fn compare_paths(a: &[String], b: &[String]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| ordering::compare_names(x, y))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatfold_tree::{TreeConfig, TreeStore};
    use pretty_assertions::assert_eq;

    fn sample() -> TreeStore {
        let mut store = TreeStore::new(TreeConfig::default());
        let work = store.create_folder("root", "Work").unwrap().id.clone();
        store
            .create_chat(work.as_str(), "Standup", "https://c/1", Some("daily"))
            .unwrap();
        store
            .create_chat("root", "Recipes", "https://c/2", Some("hello-world"))
            .unwrap();
        store
            .create_chat(work.as_str(), "Hello team", "https://c/3", None)
            .unwrap();
        store
    }

    fn names(results: &[SearchEntry]) -> Vec<&str> {
        results.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn indexes_only_chats_with_full_path() {
        let store = sample();
        let index = SearchIndex::from_tree(store.root(), SearchConfig::default());

        assert_eq!(index.len(), 3);
        let standup = &index.entries()[0];
        assert_eq!(standup.path, vec!["Home", "Work", "Standup"]);
        assert_eq!(standup.display_path(), "Home / Work / Standup");
        assert_eq!(standup.tag.as_deref(), Some("daily"));
    }

    #[test]
    fn matches_name_or_tag_case_insensitively() {
        let index = SearchIndex::from_tree(sample().root(), SearchConfig::default());

        assert_eq!(names(&index.search("HELLO")), vec!["Hello team", "Recipes"]);
        assert_eq!(names(&index.search("  dai ")), vec!["Standup"]);
        assert!(index.search("nothing here").is_empty());
    }

    #[test]
    fn short_queries_match_nothing() {
        let index = SearchIndex::from_tree(sample().root(), SearchConfig::default());

        assert!(index.search("").is_empty());
        assert!(index.search("h").is_empty());
        assert!(index.search(" h ").is_empty());
        assert_eq!(index.search("he").len(), 2);
    }

    #[test]
    fn folders_are_never_results() {
        let index = SearchIndex::from_tree(sample().root(), SearchConfig::default());
        assert!(index.search("work").is_empty());
    }

    #[test]
    fn rebuild_reflects_mutations_and_leaves_clones_alone() {
        let mut store = sample();
        let mut index = SearchIndex::from_tree(store.root(), SearchConfig::default());
        let before = index.clone();

        let recipes = index.search("recipes")[0].id.clone();
        store.delete_node(recipes.as_str()).unwrap();
        assert_eq!(index.rebuild(store.root()), 2);

        assert!(index.search("recipes").is_empty());
        assert_eq!(before.search("recipes").len(), 1);
    }

    #[test]
    fn sort_entries_uses_name_collation() {
        let index = SearchIndex::from_tree(sample().root(), SearchConfig::default());
        let mut all = index.entries().to_vec();
        sort_entries(&mut all);

        assert_eq!(names(&all), vec!["Hello team", "Recipes", "Standup"]);
    }

    #[test]
    fn sort_entries_breaks_name_ties_by_path() {
        let mut store = TreeStore::new(TreeConfig::default());
        let b = store.create_folder("root", "Beta").unwrap().id.clone();
        let a = store.create_folder("root", "alpha").unwrap().id.clone();
        store.create_chat(b.as_str(), "Notes", "https://c/b", None).unwrap();
        store.create_chat(a.as_str(), "Notes", "https://c/a", None).unwrap();

        let index = SearchIndex::from_tree(store.root(), SearchConfig::default());
        let mut all = index.search("notes");
        sort_entries(&mut all);

        assert_eq!(all[0].link, "https://c/a");
        assert_eq!(all[1].link, "https://c/b");
    }
}
