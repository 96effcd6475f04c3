//! Configuration file handling for the CLI.
//!
//! Stores the session token in `$XDG_CONFIG_HOME/roster/config.toml` (or the
//! platform equivalent).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// CLI configuration stored on disk.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Saved session token.
    pub token: Option<String>,
    /// Email the token was issued for.
    pub email: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; `--api-url` and `ROSTER_API_URL` take precedence.
    pub url: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "roster", "roster")
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`; a missing file yields the default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.auth.email.as_deref()
    }

    pub fn set_auth(&mut self, email: &str, token: &str) {
        self.auth.email = Some(email.to_owned());
        self.auth.token = Some(token.to_owned());
    }

    /// Forget the token but remember the email for the next login prompt.
    pub fn clear_token(&mut self) {
        self.auth.token = None;
    }
}
