//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::index::{DEFAULT_EXCLUDED_SUFFIXES, DEFAULT_MAX_DEPTH};

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Indexing and watching.
    pub index: IndexSettings,
    /// HTTP server.
    pub server: ServerSettings,
    /// Basic authentication.
    pub auth: AuthSettings,
}

/// Settings for the live index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Logs root; `~` is expanded and relative paths are taken from the
    /// working directory.
    pub root: String,
    /// File name suffixes never indexed.
    pub exclude_suffixes: Vec<String>,
    /// Skip names starting with `.`.
    pub ignore_hidden: bool,
    /// Maximum depth below the root.
    pub max_depth: usize,
    /// Debounce window for filesystem notifications, in milliseconds.
    pub debounce_ms: u64,
    /// Capacity of the change event channel.
    pub event_buffer: usize,
    /// Full rescan period in seconds; 0 disables it.
    pub rescan_interval_secs: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            root: "./logs".to_string(),
            exclude_suffixes: DEFAULT_EXCLUDED_SUFFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            ignore_hidden: true,
            max_depth: DEFAULT_MAX_DEPTH,
            debounce_ms: 100,
            event_buffer: 1024,
            rescan_interval_secs: 0,
        }
    }
}

impl IndexSettings {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The rescan period, if enabled.
    #[must_use]
    pub fn rescan_interval(&self) -> Option<Duration> {
        (self.rescan_interval_secs > 0).then(|| Duration::from_secs(self.rescan_interval_secs))
    }
}

/// Settings for the HTTP dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Public domain name, only used in the startup log line.
    pub domain: Option<String>,
    /// Seconds between SSE pushes.
    pub stream_interval_secs: u64,
    /// Allow any origin.
    pub cors_permissive: bool,
    /// Optional directory served under `/assets`.
    pub assets_dir: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            domain: None,
            stream_interval_secs: 10,
            cors_permissive: false,
            assets_dir: None,
        }
    }
}

impl ServerSettings {
    /// SSE push period, never shorter than one second.
    #[must_use]
    pub fn stream_interval(&self) -> Duration {
        Duration::from_secs(self.stream_interval_secs.max(1))
    }
}

/// HTTP basic authentication credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub username: String,
    /// Authentication is disabled when unset.
    pub password: Option<String>,
    pub realm: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: None,
            realm: "Logs Dashboard".to_string(),
        }
    }
}

impl AuthSettings {
    /// Whether requests must carry credentials.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.index.root, "./logs");
        assert_eq!(settings.index.exclude_suffixes, vec!["-audit.json", ".gz"]);
        assert!(settings.index.ignore_hidden);
        assert_eq!(settings.index.max_depth, 99);
        assert_eq!(settings.index.debounce(), Duration::from_millis(100));
        assert!(settings.index.rescan_interval().is_none());
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.server.stream_interval(), Duration::from_secs(10));
        assert_eq!(settings.auth.username, "admin");
        assert!(!settings.auth.is_enabled());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            [index]
            root = "/var/log/app"
            rescan_interval_secs = 300

            [server]
            port = 8080
            assets_dir = "public"

            [auth]
            password = "secret"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();

        assert_eq!(settings.index.root, "/var/log/app");
        assert_eq!(settings.index.max_depth, 99);
        assert_eq!(
            settings.index.rescan_interval(),
            Some(Duration::from_secs(300))
        );
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.assets_dir.as_deref(), Some("public"));
        assert!(settings.auth.is_enabled());
        assert_eq!(settings.auth.realm, "Logs Dashboard");
    }

    #[test]
    fn test_empty_password_disables_auth() {
        let auth = AuthSettings {
            password: Some(String::new()),
            ..AuthSettings::default()
        };
        assert!(!auth.is_enabled());
    }

    #[test]
    fn test_stream_interval_floor() {
        let server = ServerSettings {
            stream_interval_secs: 0,
            ..ServerSettings::default()
        };
        assert_eq!(server.stream_interval(), Duration::from_secs(1));
    }
}
