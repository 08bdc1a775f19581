//! Persisted configuration: the user's custom tasks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const APP_DIR: &str = "task-updater";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub custom_tasks: Vec<CustomTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTask {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Reads and writes `config.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/task-updater/config.json` (platform equivalent).
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().context("could not determine the config directory")?;
        Ok(Self::new(dir.join(APP_DIR).join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config. A missing file is an empty config; so is an unparsable
    /// one, which is logged and left on disk untouched until the next save.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file; using defaults");
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read config {}", self.path.display()))?;
        match serde_json::from_str(&data) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse config; using empty config");
                Ok(Config::default())
            }
        }
    }

    /// Atomically replace the config file.
    pub fn save(&self, cfg: &Config) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;

        let json = serde_json::to_string_pretty(cfg)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("create temp file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .with_context(|| format!("write config {}", self.path.display()))?;
        info!(path = %self.path.display(), tasks = cfg.custom_tasks.len(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config {
            custom_tasks: vec![CustomTask {
                id: "custom-test-task".into(),
                name: "Test Task".into(),
                command: "echo".into(),
                args: vec!["hello".into()],
            }],
        }
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        // Parent directories are created on save.
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn corrupt_file_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = ConfigStore::new(&path);
        assert_eq!(store.load().unwrap(), Config::default());
        // Left on disk for the user to repair.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn entries_without_id_or_args_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"custom_tasks":[{"name":"Rust toolchain","command":"rustup","args":["update"]},{"name":"Brew","command":"brew-up"}]}"#,
        )
        .unwrap();
        let cfg = ConfigStore::new(&path).load().unwrap();
        assert_eq!(cfg.custom_tasks.len(), 2);
        assert_eq!(cfg.custom_tasks[0].id, "");
        assert!(cfg.custom_tasks[1].args.is_empty());
    }

    #[test]
    fn saved_file_uses_custom_tasks_key() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store.save(&sample()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["custom_tasks"][0]["command"], "echo");
    }
}
