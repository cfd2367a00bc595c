//! User configuration, stored as `config.json` in the timebudget home.
//!
//! The home directory is `$TIMEBUDGET_HOME` when set, otherwise
//! `~/.timebudget`. Data files live there too unless `data_dir` says otherwise.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const HOME_ENV: &str = "TIMEBUDGET_HOME";
const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_LOG_LEVEL: &str = "warn";

pub const KNOWN_KEYS: [&str; 3] = ["data_dir", "log_level", "show_minutes"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Always show the minutes part of durations ("2h 0m" style tables).
    #[serde(default)]
    pub show_minutes: bool,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            show_minutes: false,
        }
    }
}

impl Config {
    /// Directory holding the data files.
    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| home.to_path_buf())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => {
                self.data_dir = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            }
            "log_level" => {
                let level = value.to_lowercase();
                if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
                    return Err(anyhow!("Unknown log level: {}", value));
                }
                self.log_level = level;
            }
            "show_minutes" => {
                self.show_minutes = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(anyhow!("Expected true or false, got '{}'", value)),
                };
            }
            _ => return Err(anyhow!("Unknown config key: '{}'", key)),
        }
        Ok(())
    }
}

/// `$TIMEBUDGET_HOME` or `~/.timebudget`.
pub fn default_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".timebudget"))
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    home: PathBuf,
}

impl ConfigStore {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_home()?))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }

    /// Missing file means defaults. A file that does not parse is reported
    /// and replaced by defaults rather than blocking the app.
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.home)?;
        let path = self.config_path();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(config)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
