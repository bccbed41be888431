use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};

const CONFIG_DIR: &str = "stackprobe";
const CONFIG_FILE: &str = "config.json";
const SUBMISSIONS_FILE: &str = "submissions.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: Option<String>,
    pub owner: Option<String>,
}

impl Config {
    /// `GITHUB_TOKEN` from the environment wins over the stored token.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.github_token.clone())
    }

    pub fn resolved_owner(&self, flag: Option<&str>) -> String {
        flag.map(String::from)
            .or_else(|| self.owner.clone())
            .unwrap_or_else(|| "local".to_string())
    }
}

fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join(CONFIG_DIR);

    fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Default submission log used by `generate` and `history`.
pub fn default_store_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .context("Could not find data directory")?
        .join(CONFIG_DIR);
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join(SUBMISSIONS_FILE))
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content).context("Failed to write config file")
}

pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).context("Failed to read config file")?;
    serde_json::from_str(&content).context("Failed to parse config file")
}
