//! Bot configuration, loadable from `slovo.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::session::StoreFactory;
use crate::store::{FileStore, SqliteStore, WordStore, DEFAULT_LEARNING_THRESHOLD};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Word storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Update polling settings.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Messaging API settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl BotConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Which backend holds the per-chat dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Pipe-delimited text file per chat.
    File,
    /// SQLite database per chat.
    Sqlite,
}

/// Word storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Directory holding the per-chat dictionaries.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Starter word list imported into a freshly created dictionary.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
    /// Consecutive correct answers after which a word counts as learned.
    /// Fixed at store construction.
    #[serde(default = "default_threshold")]
    pub learning_threshold: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_dir: default_data_dir(),
            seed_file: None,
            learning_threshold: DEFAULT_LEARNING_THRESHOLD,
        }
    }
}

impl StorageConfig {
    /// Build the per-conversation store factory this config describes.
    ///
    /// Each chat gets its own namespace under [`StorageConfig::data_dir`]
    /// (`words_<chat_id>.txt` or `words_<chat_id>.db`). A freshly created
    /// empty store is seeded from [`StorageConfig::seed_file`] when one
    /// is configured.
    #[must_use]
    pub fn store_factory(&self) -> Box<StoreFactory> {
        let config = self.clone();
        Box::new(move |chat_id| {
            std::fs::create_dir_all(&config.data_dir).map_err(|e| {
                CoreError::StoreUnavailable(format!("{}: {e}", config.data_dir.display()))
            })?;

            let mut store: Box<dyn WordStore> = match config.backend {
                StorageBackend::File => Box::new(FileStore::open(
                    config.data_dir.join(format!("words_{chat_id}.txt")),
                    config.learning_threshold,
                )?),
                StorageBackend::Sqlite => Box::new(SqliteStore::open(
                    config.data_dir.join(format!("words_{chat_id}.db")),
                    config.learning_threshold,
                )?),
            };

            if store.size()? == 0 {
                if let Some(seed) = &config.seed_file {
                    let applied = store.import_file(seed)?;
                    debug!(chat = chat_id, words = applied, "seeded new dictionary");
                }
            }

            Ok(store)
        })
    }
}

/// Update polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Pause between poll cycles, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Messaging API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_backend() -> StorageBackend {
    StorageBackend::File
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_threshold() -> u32 {
    DEFAULT_LEARNING_THRESHOLD
}
fn default_interval_ms() -> u64 {
    2000
}
fn default_api_url() -> String {
    "https://api.telegram.org".to_owned()
}
