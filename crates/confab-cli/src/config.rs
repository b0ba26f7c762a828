//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Base URL used when neither the config file nor the command line
/// provides one
pub const DEFAULT_BASE_URL: &str = "https://cargpt.onrender.com/";

/// Configuration for confab
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the generation service
    pub base_url: Option<String>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Total request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Theme name ("dark" or "light")
    pub theme: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("confab")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for CONFAB_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("CONFAB_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            connect_timeout_secs: Some(60),
            request_timeout_secs: Some(60),
            theme: Some("dark".to_string()),
        };

        default_config.save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# confab configuration file
# Place at ~/.config/confab/config.toml (Linux/Mac) or %APPDATA%\confab\config.toml (Windows)

# Base URL of the generation service; the client POSTs to <base_url>generate/
base_url = "https://cargpt.onrender.com/"

# Timeouts in seconds (both default to 60)
connect_timeout_secs = 60
request_timeout_secs = 60

# Theme ("dark" or "light")
theme = "dark"
"#
}
