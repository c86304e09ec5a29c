use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

pub mod cors;

pub use cors::create_cors_layer;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

// Настройки хранилища
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки HTTP слоя
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub api_prefix: String,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("DATABASE_URL must be set when STORE_BACKEND=postgres")]
    MissingDatabaseUrl,

    #[error("API_PREFIX must start with '/': {0}")]
    InvalidPrefix(String),
}

/// Flat view of the process environment, one field per variable.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_environment")]
    environment: String,
    #[serde(default = "default_rust_log")]
    rust_log: String,
    #[serde(default = "default_log_format")]
    log_format: LogFormat,
    #[serde(default = "default_api_prefix")]
    api_prefix: String,
    #[serde(default = "default_store_backend")]
    store_backend: StoreBackend,
    database_url: Option<String>,
    mongo_uri: Option<String>,
    #[serde(default = "default_pool_size")]
    db_pool_size: u32,
    #[serde(default)]
    cors_allowed_origins: Option<String>,
    #[serde(default = "default_max_upload_bytes")]
    max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_rust_log() -> String {
    "event_board=debug,tower_http=debug".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Postgres
}

fn default_pool_size() -> u32 {
    10
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(None)
    }

    /// Same as [`Config::from_env`] but reads variables from `vars` instead of the
    /// process environment when given.
    pub fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings: EnvSettings = ::config::Config::builder()
            .add_source(::config::Environment::default().try_parsing(true).source(vars))
            .build()?
            .try_deserialize()?;

        settings.try_into()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

impl TryFrom<EnvSettings> for Config {
    type Error = ConfigError;

    fn try_from(settings: EnvSettings) -> Result<Self, Self::Error> {
        let url = settings
            .database_url
            .or(settings.mongo_uri)
            .filter(|url| !url.trim().is_empty());

        if settings.store_backend == StoreBackend::Postgres && url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if !settings.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(settings.api_prefix));
        }

        let cors_allowed_origins = settings
            .cors_allowed_origins
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Config {
            app: AppConfig {
                host: settings.host,
                port: settings.port,
                environment: settings.environment,
                rust_log: settings.rust_log,
                log_format: settings.log_format,
            },
            database: DatabaseConfig {
                backend: settings.store_backend,
                url,
                pool_size: settings.db_pool_size,
            },
            http: HttpConfig {
                api_prefix: settings.api_prefix.trim_end_matches('/').to_string(),
                cors_allowed_origins,
                max_upload_bytes: settings.max_upload_bytes,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_with_memory_backend() {
        let config = Config::from_source(Some(vars(&[("STORE_BACKEND", "memory")]))).unwrap();

        assert_eq!(config.app.port, 3000);
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert!(config.database.url.is_none());
        assert_eq!(config.http.api_prefix, "/api");
        assert!(config.http.cors_allowed_origins.is_empty());
        assert_eq!(config.http.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn postgres_backend_requires_url() {
        let err = Config::from_source(Some(vars(&[]))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn mongo_uri_is_accepted_as_alias() {
        let config = Config::from_source(Some(vars(&[(
            "MONGO_URI",
            "postgres://localhost/events",
        )])))
        .unwrap();

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/events")
        );
    }

    #[test]
    fn parses_overrides() {
        let config = Config::from_source(Some(vars(&[
            ("DATABASE_URL", "postgres://db/events"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "json"),
            ("API_PREFIX", "/v1/"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("DB_POOL_SIZE", "3"),
        ])))
        .unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.http.api_prefix, "/v1");
        assert_eq!(
            config.http.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.database.pool_size, 3);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn rejects_bad_port() {
        let result = Config::from_source(Some(vars(&[
            ("STORE_BACKEND", "memory"),
            ("PORT", "not-a-port"),
        ])));
        assert!(result.is_err());
    }
}
