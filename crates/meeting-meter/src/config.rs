use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "~/.config/meeting-meter/config.json";

/// Defaults read from the JSON config file. Command-line flags win.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct MeterConfig {
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    /// Duration text such as `5s` or `1m`.
    #[serde(default)]
    pub tick_interval: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Loads `explicit_path` if given, otherwise the default file if it exists.
pub fn load_config(explicit_path: Option<&Path>) -> Result<MeterConfig> {
    match explicit_path {
        Some(path) => read_config(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                read_config(&path)
            } else {
                Ok(MeterConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<MeterConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: MeterConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config file");
    Ok(config)
}
