//! Service Settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `WEATHER__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storage::StorageConfig;
use thiserror::Error;
use weather_fetcher::{FetcherConfig, DEFAULT_BASE_URL};

/// Config file read when `WEATHER_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "weather-service.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "WEATHER_CONFIG";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub connect_retries: u32,
    pub retry_delay_secs: u64,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Trailing days requested per report
    pub days_back: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Trailing window exported, in hours
    pub window_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub upstream: UpstreamSettings,
    pub export: ExportSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_addr: "0.0.0.0:5000".to_string(),
            },
            database: DatabaseSettings {
                url: "sqlite://weather_data.db".to_string(),
                max_connections: 5,
                connect_retries: 5,
                retry_delay_secs: 1,
                busy_timeout_secs: 5,
            },
            upstream: UpstreamSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: 30,
                days_back: 2,
            },
            export: ExportSettings { window_hours: 48 },
            log: LogSettings {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl Settings {
    /// Load from `$WEATHER_CONFIG` (or `weather-service.toml`) and the environment
    pub fn load() -> Result<Self, SettingsError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(Some(&path), true)
    }

    /// Build settings from defaults, an optional file and optionally the environment
    pub fn from_sources(path: Option<&str>, with_env: bool) -> Result<Self, SettingsError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("WEATHER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            connect_retries: self.database.connect_retries,
            retry_delay: Duration::from_secs(self.database.retry_delay_secs),
            busy_timeout: Duration::from_secs(self.database.busy_timeout_secs),
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.upstream.base_url.clone(),
            timeout: Duration::from_secs(self.upstream.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_sources(None, false).unwrap();
        assert_eq!(settings.server.bind_addr, "0.0.0.0:5000");
        assert_eq!(settings.upstream.days_back, 2);
        assert_eq!(settings.upstream.timeout_secs, 30);
        assert_eq!(settings.export.window_hours, 48);
        assert_eq!(settings.fetcher_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[server]\nbind_addr = \"127.0.0.1:8080\"\n\n[database]\nurl = \"sqlite://other.db\"\n\n[upstream]\ndays_back = 3"
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let settings = Settings::from_sources(Some(path), false).unwrap();
        assert_eq!(settings.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.database.url, "sqlite://other.db");
        assert_eq!(settings.upstream.days_back, 3);
        // Untouched keys keep their defaults
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.storage_config().retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let settings = Settings::from_sources(Some("/nonexistent/weather-service.toml"), false);
        assert!(settings.is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("WEATHER__EXPORT__WINDOW_HOURS", "72");
        let settings = Settings::from_sources(None, true).unwrap();
        std::env::remove_var("WEATHER__EXPORT__WINDOW_HOURS");
        assert_eq!(settings.export.window_hours, 72);
    }
}
