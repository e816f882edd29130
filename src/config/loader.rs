//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::types::Settings;

/// Environment variable overriding `index.root`.
pub const ENV_LOGS_DIR: &str = "LOGS_DIR";
/// Environment variable overriding `server.port`.
pub const ENV_PORT: &str = "LOG_PORT";
/// Environment variable overriding `auth.username`.
pub const ENV_USERNAME: &str = "LOGS_USERNAME";
/// Environment variable overriding `auth.password`.
pub const ENV_PASSWORD: &str = "LOGS_PASSWORD";
/// Environment variable overriding `server.domain`.
pub const ENV_DOMAIN: &str = "DOMAIN";

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: .log-dashboard.toml
        search_paths.push(PathBuf::from(".log-dashboard.toml"));

        // 2. User config directory: ~/.config/log-dashboard/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("log-dashboard").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load configuration from the first available file, or return defaults.
    ///
    /// Environment overrides are not applied; see [`Self::load_with_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Settings::default())
    }

    /// Load configuration and apply process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or an override
    /// has an invalid value.
    pub fn load_with_env(&self) -> Result<Settings, ConfigError> {
        let mut settings = self.load()?;
        apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load configuration from a specific path.
    fn load_from_path(path: &Path) -> Result<Settings, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the first config file that exists.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are ignored.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnv`] if `LOG_PORT` is not a valid port.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(root) = get(ENV_LOGS_DIR) {
        settings.index.root = root;
    }
    if let Some(port) = get(ENV_PORT) {
        settings.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: ENV_PORT.to_string(),
            value: port.clone(),
        })?;
    }
    if let Some(username) = get(ENV_USERNAME) {
        settings.auth.username = username;
    }
    if let Some(password) = get(ENV_PASSWORD) {
        settings.auth.password = Some(password);
    }
    if let Some(domain) = get(ENV_DOMAIN) {
        settings.server.domain = Some(domain);
    }
    Ok(())
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Home directory could not be determined")]
    HomeDirUnavailable,

    #[error("Logs root {path} is unavailable: {source}")]
    RootUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
}
