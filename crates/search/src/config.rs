use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for chat search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters, after trimming) match nothing
    pub min_query_len: usize,

    /// Idle time before a typed query runs
    pub debounce_ms: u64,

    /// Rebuild the index after every tree mutation
    pub rebuild_on_change: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce_ms: 400,
            rebuild_on_change: true,
        }
    }
}

impl SearchConfig {
    /// Config for callers that want every keystroke answered right away
    pub fn immediate() -> Self {
        Self {
            debounce_ms: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_query_len == 0 {
            return Err(SearchError::InvalidConfig(
                "min_query_len must be > 0".to_string(),
            ));
        }

        if self.debounce_ms > 10_000 {
            return Err(SearchError::InvalidConfig(format!(
                "debounce_ms ({}) cannot exceed 10000",
                self.debounce_ms
            )));
        }

        Ok(())
    }
}
