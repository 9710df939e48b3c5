//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub tenancy: TenancySettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub cors_origin: Option<String>,
    pub request_timeout_seconds: u64,
}

/// Control database; tenant databases live on the same server.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TenancySettings {
    pub pool_max_connections: u32,
    pub idle_timeout_seconds: u64,
    pub migrate_on_startup: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapSettings {
    pub superadmin_email: Option<String>,
    pub superadmin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogSettings {
    /// When set, logs are also written to a daily rolling file in this directory.
    pub dir: Option<String>,
    pub file_prefix: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config: AppConfig = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(AppError::InvalidConfig("jwt.secret must not be empty".into()));
        }
        if self.bootstrap.superadmin_email.is_some() != self.bootstrap.superadmin_password.is_some() {
            return Err(AppError::InvalidConfig(
                "bootstrap.superadmin_email and bootstrap.superadmin_password must be set together".into(),
            ));
        }
        Ok(())
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8000)?
            .set_default("app.name", "adinvoice-server")?
            .set_default("app.request_timeout_seconds", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_seconds", 3)?
            .set_default("tenancy.pool_max_connections", 5)?
            .set_default("tenancy.idle_timeout_seconds", 600)?
            .set_default("tenancy.migrate_on_startup", true)?
            .set_default("jwt.access_token_expiry", crate::constants::DEFAULT_ACCESS_TOKEN_EXPIRY)
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}
