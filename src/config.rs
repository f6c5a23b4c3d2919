use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::Language;

pub const SERVICE_URL_ENV: &str = "YTACHUNKER_SERVICE_URL";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_url: String,
    pub default_language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8000".to_string(),
            default_language: Language::En,
            state_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        let mut config = if !config_path.exists() {
            let config = Config::default();
            let parent = config_path
                .parent()
                .context("Config path has no parent directory")?;
            std::fs::create_dir_all(parent)?;
            std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
            config
        } else {
            let content = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            serde_json::from_str(&content).context("Failed to parse config file")?
        };

        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            if !url.is_empty() {
                config.service_url = url;
            }
        }

        Ok(config)
    }

    pub fn with_url(service_url: String) -> Self {
        Self {
            service_url,
            ..Self::default()
        }
    }

    /// Directory holding persisted history and preferences.
    pub fn state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        let data = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data.join("ytachunker"))
    }
}

fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("ytachunker").join("config.json"))
}
