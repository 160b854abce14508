use std::{env, time::Duration};

use config::{Config as ConfigBuilder, ConfigError, Environment as EnvSource, File};
use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(
    Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means no timeout on backend calls.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn client_config(&self) -> docrag_api::ClientConfig {
        docrag_api::ClientConfig {
            base_url: self.base_url.to_owned(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    /// Forces the `Secure` cookie attribute; follows the environment when unset.
    #[serde(default)]
    pub secure: Option<bool>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            secure: None,
        }
    }
}

fn default_max_age_days() -> i64 {
    7
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// JSON in production, pretty otherwise, unless set.
    #[serde(default)]
    pub format: Option<LogFormat>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. `API_URL` for the backend base URL
    /// 2. Environment variables (DOCRAG__API__BASE_URL, etc.)
    /// 3. Config file specified by path, `CONFIG_PATH` or `config/default.toml`
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.environment", "production")?
            .set_default("api.base_url", docrag_api::DEFAULT_BASE_URL)?
            .set_default("session.max_age_days", default_max_age_days())?
            .set_default("logging.level", default_log_level())?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored when missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            EnvSource::with_prefix("DOCRAG")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(api_url) = env::var("API_URL") {
            builder = builder.set_override("api.base_url", api_url)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        let url = url::Url::parse(&self.api.base_url)
            .map_err(|e| format!("API base_url '{}' is invalid: {e}", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "API base_url must use http or https, got '{}'",
                url.scheme()
            ));
        }

        if self.session.max_age_days < 1 {
            return Err("Session max_age_days must be at least 1".to_string());
        }

        if self.api.timeout_secs == Some(0) {
            return Err("API timeout_secs must be greater than 0 when set".to_string());
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }
}
