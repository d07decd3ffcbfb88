use anyhow::{Context as _, Result};
#[cfg(production)]
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    io::{BufReader, Write},
    path::PathBuf,
};
use tasktree::remote::Session;
use uuid::Uuid;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub active_theme: Option<Uuid>,
}

impl Config {
    /// `TASKTREE_URL` and `TASKTREE_API_KEY` win over the file.
    pub fn endpoint(&self) -> (String, String) {
        let base_url = env::var("TASKTREE_URL").unwrap_or_else(|_| self.base_url.clone());
        let api_key = env::var("TASKTREE_API_KEY").unwrap_or_else(|_| self.api_key.clone());
        (base_url, api_key)
    }
}

#[cfg(production)]
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "ismacaul", "tasktree")
        .context("Failed to find a home directory")?;
    let dir = proj_dirs.config_dir();
    if !dir.exists() {
        fs::create_dir_all(dir).context("Failed to create config dir")?;
    }
    Ok(dir.to_path_buf())
}

#[cfg(not(production))]
pub fn get_config_dir() -> Result<PathBuf> {
    let mut local_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    local_dir.push(".local");

    if !local_dir.exists() {
        fs::create_dir_all(&local_dir).context("Failed to create config dir")?;
    }

    Ok(local_dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

pub fn load() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        log::info!("creating {}", path.display());
        save(&Config::default())?;
    }

    let file = fs::File::open(&path).context("Failed to open config file")?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to deserialize {}", path.display()))?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<()> {
    let path = config_path()?;
    let config_str = serde_json::to_string_pretty(config)?;

    let mut file = fs::File::create(&path).context("Failed to open config file")?;
    file.write_all(config_str.as_bytes())
        .context("Failed to write config file")?;
    Ok(())
}
