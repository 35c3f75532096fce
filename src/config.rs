use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::session::{Language, SessionConfig, TestMode, WordLength, WordMode};

/// Persisted user defaults. Every field tolerates unknown tokens on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: TestMode,
    pub word_mode: WordMode,
    pub word_length: WordLength,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(
            self.mode,
            self.word_mode.clone(),
            self.word_length,
            self.language,
        )
    }
}

impl From<&SessionConfig> for Config {
    fn from(session: &SessionConfig) -> Self {
        Self {
            mode: session.mode,
            word_mode: session.word_mode.clone(),
            word_length: session.word_length,
            language: session.language,
            seed: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "no stored config");
                return Config::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        let to_config_error = |source| Error::Config {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(to_config_error)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data).map_err(to_config_error)
    }
}
