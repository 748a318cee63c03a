//! # Chatfold Tree
//!
//! In-memory folder/chat hierarchy with structural invariants.
//!
//! ## Features
//!
//! - **Typed nodes** - a node is a folder (children + expanded flag) or a chat
//!   (link + optional tag), never both
//! - **Safe mutations** - create, rename, delete with flatten-on-delete, move
//!   with cycle prevention; a failed call changes nothing
//! - **Display ordering** - folders first, accent/case-insensitive names
//! - **Snapshots** - plain serde data for the persistence layer
//!
//! ## Architecture
//!
//! ```text
//! TreeSnapshot (serde)
//!     │
//!     ├──> TreeStore::from_snapshot (validate root, unique ids)
//!     │
//!     ├──> TreeStore
//!     │      ├─ find / find_parent / ancestors
//!     │      ├─ create / rename / update / delete / move
//!     │      └─ toggle / expand_all / collapse_all / reveal
//!     │
//!     ├──> ordering::order (view-time sort)
//!     │
//!     └──> TreeChange broadcast (one per committed mutation)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chatfold_tree::{TreeConfig, TreeStore};
//!
//! let mut store = TreeStore::new(TreeConfig::default());
//! let work = store.create_folder("root", "Work").unwrap().id.clone();
//! store
//!     .create_chat(work.as_str(), "Standup notes", "https://chat.example/1", Some("daily"))
//!     .unwrap();
//!
//! assert_eq!(store.count_chats("root"), 1);
//! ```

mod change;
mod config;
mod error;
pub mod ordering;
mod snapshot;
mod stats;
mod store;
mod types;

pub use change::{ChangeKind, TreeChange};
pub use config::{TreeConfig, DEFAULT_ROOT_NAME};
pub use error::{MoveRejection, Result, TreeError};
pub use snapshot::{SnapshotNode, TreeSnapshot};
pub use stats::TreeStats;
pub use store::{DeleteReport, TreeStore};
pub use types::{Chat, ChatUpdate, Folder, Node, NodeId, NodeKind, NodeType, ROOT_ID};
