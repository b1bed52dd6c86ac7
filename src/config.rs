use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ledger::ListKind;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PantryConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub structuring: StructuringConfig,
    pub vision: VisionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `fridge.json` and `shopping_list.json`.
    pub data_dir: String,
    pub recipes_db: String,
    /// Where generated shopping-list files are written.
    pub export_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StructuringConfig {
    /// Full chat-completions URL (OpenAI, or an Azure OpenAI deployment URL).
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// `"bearer"` or `"api-key"` (Azure).
    pub auth: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_pantry_dir();
        Self {
            data_dir: dir.join("data").to_string_lossy().into_owned(),
            recipes_db: dir.join("recipes.db").to_string_lossy().into_owned(),
            export_dir: dir.join("exports").to_string_lossy().into_owned(),
        }
    }
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-5-nano".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            auth: "bearer".into(),
            timeout_secs: 60,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: "COGNITIVE_KEY".into(),
            api_version: "2024-02-01".into(),
            timeout_secs: 30,
        }
    }
}

/// Returns `~/.pantry/`
pub fn default_pantry_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pantry")
}

/// Returns the default config file path: `~/.pantry/config.toml`
pub fn default_config_path() -> PathBuf {
    default_pantry_dir().join("config.toml")
}

impl PantryConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            PantryConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `PANTRY_DATA_DIR`, `PANTRY_RECIPES_DB`, `PANTRY_EXPORT_DIR`,
    /// `PANTRY_LOG_LEVEL`, and `COGNITIVE_API` for the vision endpoint.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PANTRY_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("PANTRY_RECIPES_DB") {
            self.storage.recipes_db = val;
        }
        if let Ok(val) = std::env::var("PANTRY_EXPORT_DIR") {
            self.storage.export_dir = val;
        }
        if let Ok(val) = std::env::var("PANTRY_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("COGNITIVE_API") {
            self.vision.endpoint = val;
        }
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }

    pub fn resolved_recipes_db(&self) -> PathBuf {
        expand_tilde(&self.storage.recipes_db)
    }

    pub fn resolved_export_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.export_dir)
    }

    /// Path of the JSON file backing `kind`.
    pub fn list_path(&self, kind: ListKind) -> PathBuf {
        self.resolved_data_dir().join(kind.file_name())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
