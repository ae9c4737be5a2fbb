//! Shared config utilities: JSON config files with default fallback,
//! the startup `config.json` environment merge, and credential resolution.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to create config directory: {0}")]
    CreateDir(std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write config file: {0}")]
    Write(std::io::Error),
}

/// Read a JSON config, falling back to `T::default()` when the file is
/// absent or does not parse. `label` tags the log lines.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    let Ok(content) = std::fs::read_to_string(path) else {
        tracing::debug!("[{}] {} not found, defaults apply", label, path.display());
        return T::default();
    };
    serde_json::from_str(&content)
        .inspect(|_| tracing::info!("[{}] Config read from {}", label, path.display()))
        .unwrap_or_else(|e| {
            tracing::warn!("[{}] {} is not valid config ({}), defaults apply", label, path.display(), e);
            T::default()
        })
}

/// Write `config` as pretty JSON, creating missing parent directories.
pub fn save_json_config<T: Serialize>(path: &Path, config: &T, label: &str) -> Result<(), ConfigError> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        std::fs::create_dir_all(dir).map_err(ConfigError::CreateDir)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(config)?).map_err(ConfigError::Write)?;
    tracing::info!("[{}] Config written to {}", label, path.display());
    Ok(())
}

/// Export every key of a flat JSON object file into the process environment.
///
/// Non-string values are exported in their JSON text form. Returns the number
/// of variables set; a missing file sets nothing.
pub fn merge_env_file(path: &Path) -> usize {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return 0,
    };
    let map = match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("[Config] Ignoring malformed {}: {}", path.display(), e);
            return 0;
        }
    };
    for (key, value) in &map {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        std::env::set_var(key, value);
    }
    tracing::info!("[Config] Exported {} entries from {}", map.len(), path.display());
    map.len()
}

/// A credential comes from the stored value when it is non-blank, else from
/// the environment variable named by `env_var`. Both sources are trimmed.
pub fn resolve_credential(value: Option<&str>, env_var: Option<&str>) -> Option<String> {
    let stored = value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
    stored.or_else(|| {
        let from_env = std::env::var(env_var?).ok()?;
        let from_env = from_env.trim();
        (!from_env.is_empty()).then(|| from_env.to_string())
    })
}
