use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Parent folder not found: {0}")]
    ParentNotFound(String),

    #[error("Forbidden on root: {0}")]
    Forbidden(&'static str),

    #[error("Move rejected: {0}")]
    Rejected(MoveRejection),

    #[error("Invalid input: {0} must not be empty")]
    InvalidInput(&'static str),

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Not a chat: {0}")]
    NotAChat(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl TreeError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn invalid_snapshot(msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot(msg.into())
    }

    /// Stable snake_case code for callers that map errors to user messages.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ParentNotFound(_) => "parent_not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Rejected(_) => "rejected",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotAFolder(_) => "not_a_folder",
            Self::NotAChat(_) => "not_a_chat",
            Self::InvalidSnapshot(_) => "invalid_snapshot",
        }
    }
}

/// Why a move was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("source and target are the same node")]
    SameNode,

    #[error("the root folder cannot be moved")]
    RootSource,

    #[error("target does not exist")]
    TargetNotFound,

    #[error("destination is already the current parent")]
    NoOp,

    #[error("destination lies inside the moved subtree")]
    Cycle,
}

impl From<MoveRejection> for TreeError {
    fn from(reason: MoveRejection) -> Self {
        Self::Rejected(reason)
    }
}
