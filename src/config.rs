use anyhow::{anyhow, bail, Context, Result};
use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

use crate::client::ReceiptTimings;
use crate::models::{Theme, UserId};

/// Environment variable naming a settings file to use instead of the default
pub const CONFIG_ENV_VAR: &str = "MESSENGER_CONFIG";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub display_name: String,
    pub current_user_id: UserId,
    pub dark_mode: bool,
    pub delivered_after_ms: u64,
    pub read_after_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            display_name: "Me".to_string(),
            current_user_id: 0,
            dark_mode: false,
            delivered_after_ms: 1000,
            read_after_ms: 2000,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            bail!("display_name must not be empty");
        }
        if self.read_after_ms < self.delivered_after_ms {
            bail!(
                "read_after_ms ({}) must not be less than delivered_after_ms ({})",
                self.read_after_ms,
                self.delivered_after_ms
            );
        }
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn receipt_timings(&self) -> ReceiptTimings {
        ReceiptTimings {
            delivered_after: Duration::from_millis(self.delivered_after_ms),
            read_after: Duration::from_millis(self.read_after_ms),
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("messenger");

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

static CONFIG_PATH_OVERRIDE: OnceCell<PathBuf> = OnceCell::new();

/// Pin the settings path for the rest of the process. Only the first call wins.
pub fn set_config_path_override(path: PathBuf) -> bool {
    CONFIG_PATH_OVERRIDE.set(path).is_ok()
}

/// Where settings live: explicit argument, then the process override, then
/// `MESSENGER_CONFIG`, then `<config dir>/messenger/settings.json`
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = CONFIG_PATH_OVERRIDE.get() {
        return Ok(path.clone());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(get_config_dir()?.join("settings.json"))
}

/// Read settings from `path`; a missing file yields the defaults
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        info!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let mut file = File::open(path)
        .with_context(|| format!("Failed to open settings file {}", path.display()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let settings: Settings = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    settings.validate()?;
    info!("Loaded settings for {} from {}", settings.display_name, path.display());

    Ok(settings)
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    settings.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;

    info!("Settings saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.theme(), Theme::Light);
        assert_eq!(settings.receipt_timings(), ReceiptTimings::default());
    }

    #[test]
    fn test_read_before_delivered_is_invalid() {
        let settings = Settings {
            delivered_after_ms: 500,
            read_after_ms: 100,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "dark_mode": true }"#).unwrap();
        assert_eq!(settings.theme(), Theme::Dark);
        assert_eq!(settings.display_name, "Me");
        assert_eq!(settings.read_after_ms, 2000);
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("/tmp/explicit-settings.json");
        assert_eq!(resolve_config_path(Some(&path)).unwrap(), path);
    }
}
