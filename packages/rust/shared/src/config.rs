//! Application configuration for chatblocks.
//!
//! User config lives at `~/.chatblocks/chatblocks.toml`.
//! Environment overrides (`USE_AI`) and CLI flags win over file values,
//! which win over defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ChatBlocksError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "chatblocks.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".chatblocks";

/// Env var that switches the AI categorizer off when set to `false`.
pub const USE_AI_ENV: &str = "USE_AI";

// ---------------------------------------------------------------------------
// Config structs (matching chatblocks.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Categorizer selection.
    #[serde(default)]
    pub categorizer: CategorizerConfig,

    /// OpenAI-compatible endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Local persistence of results.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[categorizer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizerConfig {
    /// Use the language-model categorizer when an API key is available.
    #[serde(default = "default_true")]
    pub use_ai: bool,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self { use_ai: true }
    }
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat model used for categorization.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_temperature() -> f32 {
    0.2
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persist the most recent block list so `show` can redisplay it.
    #[serde(default = "default_true")]
    pub save_last_run: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_last_run: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl OpenAiConfig {
    /// Full chat-completions endpoint derived from `base_url`.
    pub fn completions_url(&self) -> Result<Url> {
        let mut base = Url::parse(&self.base_url).map_err(|e| {
            ChatBlocksError::config(format!("invalid openai.base_url '{}': {e}", self.base_url))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("chat/completions")
            .map_err(|e| ChatBlocksError::config(format!("invalid completions URL: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.chatblocks/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ChatBlocksError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.chatblocks/chatblocks.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ChatBlocksError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ChatBlocksError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ChatBlocksError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ChatBlocksError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ChatBlocksError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in the config. Unset or empty → `None`.
pub fn resolve_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.openai.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}

/// Whether the AI switch is on, after applying the `USE_AI` env override.
pub fn ai_enabled(config: &AppConfig) -> bool {
    ai_switch(config, std::env::var(USE_AI_ENV).ok().as_deref())
}

/// `USE_AI=false` turns the switch off; any other value defers to the file.
fn ai_switch(config: &AppConfig, env_value: Option<&str>) -> bool {
    match env_value {
        Some(v) if v.trim().eq_ignore_ascii_case("false") => false,
        _ => config.categorizer.use_ai,
    }
}
