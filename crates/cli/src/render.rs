use chatfold_search::{match_ranges, SearchEntry};
use chatfold_tree::{Node, NodeKind, NodeType, TreeStore, TreeStats};
use serde::Serialize;
use std::fmt::Write as _;
use std::ops::Range;

/// Ordered, display-ready form of a subtree
#[derive(Debug, Serialize)]
pub struct TreeView {
    pub id: String,
    pub name: String,
    pub kind: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeView>,
}

impl TreeView {
    pub fn build(tree: &TreeStore, node: &Node) -> Self {
        let children = tree
            .ordered_children(node.id.as_str())
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::build(tree, child))
            .collect();

        match &node.kind {
            NodeKind::Folder(folder) => Self {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind: NodeType::Folder,
                expanded: Some(folder.expanded),
                chat_count: Some(tree.count_chats(node.id.as_str())),
                link: None,
                tag: None,
                children,
            },
            NodeKind::Chat(chat) => Self {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind: NodeType::Chat,
                expanded: None,
                chat_count: None,
                link: Some(chat.link.clone()),
                tag: chat.tag.clone(),
                children,
            },
        }
    }
}

/// Indented text tree. Collapsed folders hide their children unless
/// `show_all` is set.
pub fn tree_text(tree: &TreeStore, node: &Node, show_all: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, node, 0, show_all);
    out
}

fn write_node(out: &mut String, tree: &TreeStore, node: &Node, depth: usize, show_all: bool) {
    let indent = "  ".repeat(depth);
    match &node.kind {
        NodeKind::Folder(folder) => {
            let marker = if folder.expanded { '▾' } else { '▸' };
            let _ = writeln!(
                out,
                "{indent}{marker} {} ({})  [{}]",
                node.name,
                tree.count_chats(node.id.as_str()),
                node.id
            );
            if folder.expanded || show_all {
                for child in tree.ordered_children(node.id.as_str()).unwrap_or_default() {
                    write_node(out, tree, child, depth + 1, show_all);
                }
            }
        }
        NodeKind::Chat(chat) => {
            let tag = chat
                .tag
                .as_deref()
                .map(|tag| format!(" #{tag}"))
                .unwrap_or_default();
            let _ = writeln!(out, "{indent}• {}{tag}  [{}]", node.name, node.id);
        }
    }
}

/// Search hit with highlight offsets into `name`
#[derive(Debug, Serialize)]
pub struct ResultView<'a> {
    #[serde(flatten)]
    pub entry: &'a SearchEntry,
    pub highlights: Vec<Range<usize>>,
}

pub fn result_views<'a>(entries: &'a [SearchEntry], query: &str) -> Vec<ResultView<'a>> {
    entries
        .iter()
        .map(|entry| ResultView {
            entry,
            highlights: match_ranges(&entry.name, query),
        })
        .collect()
}

pub fn results_text(entries: &[SearchEntry], query: &str) -> String {
    if entries.is_empty() {
        return format!("No chats match \"{query}\"\n");
    }

    let mut out = String::new();
    for entry in entries {
        let name = emphasize(&entry.name, &match_ranges(&entry.name, query));
        let tag = entry
            .tag
            .as_deref()
            .map(|tag| format!(" #{tag}"))
            .unwrap_or_default();
        let _ = writeln!(out, "• {name}{tag}  [{}]", entry.id);
        let _ = writeln!(out, "    {}", entry.display_path());
        let _ = writeln!(out, "    {}", entry.link);
    }
    out
}

/// Wrap each range of `text` in `*`.
fn emphasize(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * 2);
    let mut cursor = 0;
    for range in ranges {
        out.push_str(&text[cursor..range.start]);
        out.push('*');
        out.push_str(&text[range.clone()]);
        out.push('*');
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

pub fn stats_text(stats: &TreeStats) -> String {
    format!(
        "folders: {}\nchats: {}\nnodes: {}\ndepth: {}\n",
        stats.folders, stats.chats, stats.nodes, stats.depth
    )
}
