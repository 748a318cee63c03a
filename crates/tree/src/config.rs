use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROOT_NAME: &str = "Home";

/// Configuration for tree behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Display name given to the root of a fresh tree
    pub root_name: String,

    /// Expand a collapsed folder when a node is created inside it
    pub auto_expand_on_add: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            auto_expand_on_add: false,
        }
    }
}

impl TreeConfig {
    /// Config that opens folders as soon as something is added to them
    pub fn expanding() -> Self {
        Self {
            auto_expand_on_add: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_name.trim().is_empty() {
            return Err(TreeError::InvalidInput("root_name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = TreeConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.auto_expand_on_add);
    }

    #[test]
    fn test_blank_root_name_invalid() {
        let config = TreeConfig {
            root_name: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(TreeError::InvalidInput("root_name")));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TreeConfig = serde_json::from_str(r#"{"auto_expand_on_add": true}"#).unwrap();
        assert_eq!(config, TreeConfig::expanding());
    }
}
