//! Display ordering of folder children.
//!
//! Folders come before chats; inside each group names are compared at
//! primary strength, so case and diacritics do not change the order.

use crate::types::Node;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Primary-strength collation key: NFD, combining marks dropped, lowercased.
#[must_use]
pub fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two names the way children are ordered.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Folders first, then chats, each group sorted by name.
///
/// Names that collate equal fall back to the raw name and then the id, so the
/// result does not depend on the input order.
pub fn order<'a, I>(children: I) -> Vec<&'a Node>
where
    I: IntoIterator<Item = &'a Node>,
{
    let (mut folders, mut chats): (Vec<&Node>, Vec<&Node>) =
        children.into_iter().partition(|node| node.is_folder());

    sort_group(&mut folders);
    sort_group(&mut chats);

    folders.extend(chats);
    folders
}

fn sort_group(group: &mut [&Node]) {
    group.sort_by_cached_key(|node| {
        (
            collation_key(&node.name),
            node.name.clone(),
            node.id.clone(),
        )
    });
}
