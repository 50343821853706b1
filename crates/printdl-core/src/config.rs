use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of download attempts per file (including the first).
    pub max_attempts: u32,
    /// Fixed delay in seconds between attempts (e.g. 1.0 = 1s).
    pub delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 1.0,
        }
    }
}

/// Global configuration loaded from `~/.config/printdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintdlConfig {
    /// Base site URL, used to build a listing URL from a bare numeric id.
    pub base_url: String,
    /// GraphQL endpoint used for download-link resolution.
    pub api_url: String,
    /// User-Agent sent with every request in a run.
    pub user_agent: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for PrintdlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.printables.com".to_string(),
            api_url: "https://api.printables.com/graphql/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) printdl/0.1".to_string(),
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("printdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PrintdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PrintdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PrintdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
