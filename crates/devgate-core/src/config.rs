//! Remembered-login configuration.
//!
//! The only thing persisted is the email of the last successful login, used
//! to pre-fill the next login prompt. Stored at
//! `~/.config/devgate/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for the config directory path
const APP_NAME: &str = "devgate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Store for the remembered login id. The session manager writes through it
/// after every successful authentication.
pub trait ConfigStore: Send + Sync {
    fn remembered_email(&self) -> Option<String>;
    fn remember_email(&self, email: &str);
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// File-backed [`ConfigStore`] reading and writing [`Config`] on each call.
/// Load failures degrade to defaults; save failures are logged and
/// swallowed so they never interrupt a login that already succeeded.
pub struct JsonConfigStore;

impl ConfigStore for JsonConfigStore {
    fn remembered_email(&self) -> Option<String> {
        match Config::load() {
            Ok(config) => config.last_email,
            Err(err) => {
                warn!(error = %err, "Failed to load config, using defaults");
                None
            }
        }
    }

    fn remember_email(&self, email: &str) {
        let mut config = Config::load().unwrap_or_default();
        config.last_email = Some(email.to_string());
        if let Err(err) = config.save() {
            warn!(error = %err, "Failed to save config");
        }
    }
}
