//! Persisted config (Ollama endpoint, model, database path) in the app data directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app_data;
use crate::matcher::SelectionPolicy;
use crate::ollama::{DEFAULT_BASE_URL, DEFAULT_EMBED_MODEL};

const CONFIG_FILENAME: &str = "config.toml";
const DB_FILENAME: &str = "embeddings.db";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Ollama daemon that serves embeddings.
    pub ollama_url: String,
    /// Embedding model name (e.g. `nomic-embed-text`, `all-minilm`).
    pub embed_model: String,
    /// Override for the embeddings database path. Empty or absent means the
    /// default file in the app data directory.
    pub database_path: Option<String>,
    /// Which end of the distance range a query selects. `nearest` is the
    /// sensible default; `farthest` reproduces the legacy behavior.
    pub selection_policy: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            database_path: None,
            selection_policy: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Resolve the embeddings database path: the configured override if set,
    /// otherwise the default file in the app data directory.
    pub fn resolve_database_path(&self) -> Option<PathBuf> {
        if let Some(p) = self.database_path.as_deref().filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(p));
        }
        app_data::app_data_dir().map(|dir| dir.join(DB_FILENAME))
    }
}

/// Load config from the app data directory. Returns default config if missing or invalid.
pub fn load_config() -> Config {
    let Some(data_dir) = app_data::app_data_dir() else {
        return Config::default();
    };
    let path = data_dir.join(CONFIG_FILENAME);
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    toml::from_str(&s).unwrap_or_default()
}

/// Save config to the app data directory.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let data_dir = app_data::app_data_dir().ok_or(ConfigError::NoDataDir)?;
    let path = data_dir.join(CONFIG_FILENAME);
    let s = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    std::fs::write(&path, s).map_err(ConfigError::Write)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine app data directory")]
    NoDataDir,
    #[error("failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.ollama_url, DEFAULT_BASE_URL);
        assert_eq!(config.embed_model, DEFAULT_EMBED_MODEL);
        assert_eq!(config.selection_policy, SelectionPolicy::Nearest);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn parse_selection_policy() {
        let config: Config = toml::from_str("selection_policy = \"farthest\"").unwrap();
        assert_eq!(config.selection_policy, SelectionPolicy::Farthest);
        // Unset fields fall back to defaults.
        assert_eq!(config.embed_model, DEFAULT_EMBED_MODEL);
    }

    #[test]
    fn database_path_override_wins() {
        let config = Config {
            database_path: Some("/tmp/custom.db".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_database_path(),
            Some(PathBuf::from("/tmp/custom.db"))
        );
    }
}
