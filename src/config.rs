//! Client configuration: optional TOML file plus environment overrides.
//!
//! Environment variables:
//!   QUIZ_CONFIG        : path to the TOML file (default `<data dir>/config.toml`)
//!   QUIZ_SERVICE_URL   : base URL of the generation service
//!   QUIZ_TIMEOUT_SECS  : HTTP timeout in seconds
//!   QUIZ_DOWNLOAD_DIR  : where exported documents are written
//!   QUIZ_LOG_FILE      : log file path

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{QuizError, Result};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_url: String,
    pub timeout_secs: u64,
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
    pub db_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_dir: PathBuf::from("."),
            log_file: data_dir.join("quiz.log"),
            db_path: data_dir.join("quiz.db"),
        }
    }
}

pub fn data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| "C:\\Users\\User".to_string());
        PathBuf::from(home).join(".local\\share\\textquiz")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/home/user".to_string());
        PathBuf::from(home).join(".local/share/textquiz")
    }
}

impl Config {
    /// Loads the TOML file named by `QUIZ_CONFIG` (or the default location)
    /// and applies environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("QUIZ_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("config.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
            .map_err(|e| QuizError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Overrides fields from a variable lookup, `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QUIZ_SERVICE_URL") {
            self.service_url = url;
        }
        if let Some(secs) = lookup("QUIZ_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .parse()
                .map_err(|_| QuizError::Config(format!("invalid QUIZ_TIMEOUT_SECS: {}", secs)))?;
        }
        if let Some(dir) = lookup("QUIZ_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("QUIZ_LOG_FILE") {
            self.log_file = PathBuf::from(file);
        }
        Ok(())
    }
}
