use anyhow::{anyhow, Context, Result};
use chatfold_search::SearchConfig;
use chatfold_tree::TreeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "chatfold.toml";
pub const DEFAULT_DATA_FILE: &str = "chatfold.json";
pub const DATA_ENV: &str = "CHATFOLD_DATA";

/// Settings for one CLI run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where the tree is persisted
    pub data_file: Option<PathBuf>,
    pub tree: TreeConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Read `explicit`, or `chatfold.toml` in `cwd` when present, or defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let config = match path {
            Some(path) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                let config = parse(&bytes)
                    .with_context(|| format!("Invalid config {}", path.display()))?;
                log::debug!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tree.validate().context("Invalid [tree] config")?;
        self.search.validate().context("Invalid [search] config")?;
        Ok(())
    }

    /// Data file: `override_path`, then `$CHATFOLD_DATA`, then the config
    /// value, then `chatfold.json`. Relative paths resolve against `cwd`.
    pub fn data_path(&self, override_path: Option<&Path>, cwd: &Path) -> PathBuf {
        let chosen = override_path
            .map(Path::to_path_buf)
            .or_else(|| {
                std::env::var_os(DATA_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| self.data_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        if chosen.is_absolute() {
            chosen
        } else {
            cwd.join(chosen)
        }
    }
}

/// JSON first, TOML as a fallback.
fn parse(bytes: &[u8]) -> Result<AppConfig> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Config is neither JSON ({json_err}) nor TOML ({toml_err})")
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
        }
    };
    serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_toml_from_working_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            concat!(
                "data_file = \"trees/main.json\"\n\n",
                "[tree]\nroot_name = \"Accueil\"\n\n",
                "[search]\nmin_query_len = 3\n",
            ),
        )
        .unwrap();

        let config = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.tree.root_name, "Accueil");
        assert_eq!(config.search.min_query_len, 3);
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(
            config.data_path(Some(Path::new("/tmp/x.json")), dir.path()),
            PathBuf::from("/tmp/x.json")
        );
    }

    #[test]
    fn reads_explicit_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"tree": {"auto_expand_on_add": true}}"#).unwrap();

        let config = AppConfig::load(Some(&path), dir.path()).unwrap();
        assert!(config.tree.auto_expand_on_add);
    }

    #[test]
    fn rejects_invalid_values_and_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");

        std::fs::write(&path, "[search]\nmin_query_len = 0\n").unwrap();
        assert!(AppConfig::load(Some(&path), dir.path()).is_err());

        std::fs::write(&path, "theme = \"dark\"\n").unwrap();
        assert!(AppConfig::load(Some(&path), dir.path()).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing), dir.path()).is_err());
    }
}
