//! # Chatfold Search
//!
//! Flat index over the chats of a tree with debounced querying.
//!
//! ## Features
//!
//! - **Rebuild, not patch** - the index is rebuilt from the tree after each
//!   mutation, so it can never point at a deleted chat
//! - **Substring matching** - case-insensitive on chat name and tag
//! - **Breadcrumbs** - every entry carries its root-to-chat name path
//! - **Debouncing** - bursts of keystrokes collapse into one search
//!
//! ## Architecture
//!
//! ```text
//! keystrokes ──> QueryDebouncer ──(quiet period)──> SearchIndex::search
//!                     │                                  │
//!                     └─ blank query ──> Fired::Cleared  └─> Vec<SearchEntry>
//!
//! TreeStore root ──> SearchIndex::rebuild (depth-first, chats only)
//! ```

mod config;
mod debounce;
mod error;
mod highlight;
mod index;

pub use config::SearchConfig;
pub use debounce::{Fired, QueryDebouncer};
pub use error::{Result, SearchError};
pub use highlight::match_ranges;
pub use index::{sort_entries, SearchEntry, SearchIndex};
