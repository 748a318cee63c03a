use chatfold_search::SearchError;
use chatfold_tree::TreeError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Persistence failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl SessionError {
    /// Stable snake_case code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tree(err) => err.code(),
            Self::Store(StoreError::Io { .. }) => "storage_io",
            Self::Store(StoreError::Json(_)) => "storage_format",
            Self::Search(SearchError::NoRuntime) => "no_runtime",
            Self::Search(SearchError::InvalidConfig(_)) => "invalid_config",
        }
    }
}
