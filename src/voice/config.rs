use super::interface::{CloneOptions, SynthesisParams};
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.minimax.chat";
pub const API_KEY_ENV: &str = "MINIMAX_API_KEY";
pub const GROUP_ID_ENV: &str = "MINIMAX_GROUP_ID";

// ── Api Config ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    pub group_id: Option<String>,
    #[serde(default = "default_group_id_env")]
    pub group_id_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Resolve the API key: `api_key` field first, then the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        crate::config::resolve_credential(self.api_key.as_deref(), self.api_key_env.as_deref())
    }

    pub fn resolve_group_id(&self) -> Option<String> {
        crate::config::resolve_credential(self.group_id.as_deref(), self.group_id_env.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            group_id: None,
            group_id_env: default_group_id_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_api_key_env() -> Option<String> {
    Some(API_KEY_ENV.to_string())
}
fn default_group_id_env() -> Option<String> {
    Some(GROUP_ID_ENV.to_string())
}
fn default_timeout_secs() -> u64 {
    60
}

// ── Cache Config ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

// ── Top-Level Panel Config ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Defaults for test synthesis
    #[serde(default)]
    pub synthesis: SynthesisParams,
    /// Defaults for clone submissions
    #[serde(default)]
    pub clone: CloneOptions,
    /// Where generated test audio is written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            synthesis: SynthesisParams::default(),
            clone: CloneOptions::default(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// `<data dir>/minimax-voice-panel/panel_config.json`
pub fn default_config_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minimax-voice-panel")
        .join("panel_config.json")
}

/// Load panel config from a JSON file. Falls back to defaults if the file is missing or invalid.
pub fn load_config(path: &Path) -> PanelConfig {
    crate::config::load_json_config(path, "Panel")
}

/// Save panel config to a JSON file.
pub fn save_config(path: &Path, config: &PanelConfig) -> Result<(), ConfigError> {
    crate::config::save_json_config(path, config, "Panel")
}
