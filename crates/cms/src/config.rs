//! Configuration loading and management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the CMS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the documents (relative paths resolve against the config directory)
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// YAML file mapping usernames to password hashes
    #[serde(default = "default_credential_path")]
    pub credential_path: PathBuf,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds (default: 30 days)
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_secs: u64,

    /// Cookie signing secret (64+ bytes, hex-encoded)
    /// If not set, a random key is generated at startup (sessions won't survive restarts)
    pub cookie_secret: Option<String>,

    /// Mark the session cookie `Secure` (only sent over HTTPS)
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: default_session_lifetime(),
            cookie_secret: None,
            secure_cookie: false,
        }
    }
}

fn default_session_lifetime() -> u64 {
    30 * 24 * 3600 // 30 days
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_credential_path() -> PathBuf {
    PathBuf::from("users.yaml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            credential_path: default_credential_path(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config directory
    ///
    /// Relative `data_path` and `credential_path` values are resolved against
    /// `config_path`, so the returned config always holds usable paths.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_file = config_path.join("config.json");

        let mut config = if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)
                .with_context(|| format!("Failed to read config file: {:?}", config_file))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| "Failed to parse config.json")?;
            tracing::info!("Loaded configuration from {:?}", config_file);
            config
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_file
            );
            let config = Config::default();

            std::fs::create_dir_all(config_path)
                .with_context(|| format!("Failed to create config directory: {:?}", config_path))?;

            // Write default config for reference
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(&config_file, content)
                .with_context(|| format!("Failed to write default config: {:?}", config_file))?;
            tracing::info!("Created default config at {:?}", config_file);

            config
        };

        config.data_path = resolve(config_path, &config.data_path);
        config.credential_path = resolve(config_path, &config.credential_path);
        Ok(config)
    }

    /// Build a config rooted at explicit paths, with default session settings.
    pub fn with_paths(data_path: impl Into<PathBuf>, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            credential_path: credential_path.into(),
            session: SessionConfig::default(),
        }
    }

    /// Decode the configured cookie secret, if any.
    pub fn cookie_secret_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.session
            .cookie_secret
            .as_deref()
            .map(|secret| hex::decode(secret.trim()).context("cookie_secret is not valid hex"))
            .transpose()
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
