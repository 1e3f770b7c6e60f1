//! Layered TOML configuration for Sundial.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use sundial_types::ConfigError;

/// The default address the host binds.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// The default endpoint path.
pub const DEFAULT_PATH: &str = "/mcp";

/// The default server name reported by `initialize`.
pub const DEFAULT_SERVER_NAME: &str = "weather";

/// The default endpoint the client talks to.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000/mcp";

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct SundialConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub config_dir: PathBuf,
}

/// Host-side settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub path: String,
    pub name: String,
}

/// Client-side settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    /// Request timeout. `None` leaves the transport default in place.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_ms: None,
        }
    }
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub client: ClientSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind: Option<String>,
    pub path: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub url: Option<String>,
}

impl SundialConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (`SUNDIAL_BIND`, `SUNDIAL_URL`)
    /// 3. Config file (`<config dir>/config.toml`)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = overrides.config_dir.clone().unwrap_or_else(config_dir);
        let settings = load_settings_file(&config_dir.join("config.toml"));
        Self::resolve(settings, |key| std::env::var(key).ok(), overrides, config_dir)
    }

    /// Merge already-read sources. `env` looks up an environment variable.
    pub fn resolve(
        settings: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: CliOverrides,
        config_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let bind_str = overrides
            .bind
            .or_else(|| env("SUNDIAL_BIND"))
            .or(settings.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str.parse().map_err(|e| ConfigError::InvalidValue {
            key: "server.bind".into(),
            message: format!("'{bind_str}': {e}"),
        })?;

        let path = settings
            .server
            .path
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "server.path".into(),
                message: format!("'{path}' must start with '/'"),
            });
        }

        let name = settings
            .server
            .name
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());

        let url = overrides
            .url
            .or_else(|| env("SUNDIAL_URL"))
            .or(settings.client.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "client.url".into(),
                message: format!("'{url}' is not an http(s) URL"),
            });
        }

        Ok(SundialConfig {
            server: ServerConfig { bind, path, name },
            client: ClientConfig {
                url,
                timeout_ms: settings.client.timeout_ms,
            },
            config_dir,
        })
    }
}

/// Get the Sundial config directory path (~/.sundial/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SUNDIAL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sundial")
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
