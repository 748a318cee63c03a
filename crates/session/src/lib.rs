//! # Chatfold Session
//!
//! Keeps a chat tree, its search index and its persisted snapshot in step.
//!
//! ## Architecture
//!
//! ```text
//! TreeCommand ──> Session::apply
//!                    ├─ TreeStore (validate + commit)
//!                    ├─ TreeChange drain ──> SearchIndex::rebuild
//!                    └─ SnapshotStore::save (JSON file / memory)
//!
//! query ──> Session::view ──> ViewState::{Tree, Results}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatfold_search::SearchConfig;
//! use chatfold_session::{JsonFileStore, Session, TreeCommand};
//! use chatfold_tree::TreeConfig;
//!
//! # async fn run() -> chatfold_session::Result<()> {
//! let store = JsonFileStore::new("chatfold.json");
//! let mut session = Session::open(store, TreeConfig::default(), SearchConfig::default()).await?;
//! session
//!     .apply(TreeCommand::CreateFolder {
//!         parent_id: "root".into(),
//!         name: "Work".into(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod command;
mod error;
mod session;
mod store;

pub use command::{CommandOutcome, TreeCommand};
pub use error::{Result, SessionError, StoreError};
pub use session::{Session, ViewState};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
