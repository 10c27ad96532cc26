//! Application configuration module
//!
//! Configuration is read from the process environment (optionally seeded from
//! a `.env` file by the binary). Tests build configurations directly with
//! [`AppConfig::builder`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key";
pub const DEFAULT_AI_SERVICE_URL: &str = "http://localhost:8004";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
/// Cost used by the `bcrypt` crate when none is configured
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Pacing of the character-by-character fallback stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPacing {
    /// Per-character delays that imitate typing
    #[default]
    Natural,
    /// No delays
    Instant,
}

impl FromStr for FallbackPacing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(FallbackPacing::Natural),
            "instant" => Ok(FallbackPacing::Instant),
            _ => Err(ConfigError::InvalidValue {
                key: "AI_FALLBACK_PACING",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FallbackPacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPacing::Natural => f.write_str("natural"),
            FallbackPacing::Instant => f.write_str("instant"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Reported by the health endpoint
    pub environment: String,
    /// Postgres URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Base URL of the AI text-generation service
    pub ai_service_url: String,
    pub ai_connect_timeout: Duration,
    pub fallback_pacing: FallbackPacing,
    /// Allowed CORS origin; `None` allows any origin
    pub cors_origin: Option<String>,
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            database_url: None,
            database_max_connections: 10,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            ai_service_url: DEFAULT_AI_SERVICE_URL.to_string(),
            ai_connect_timeout: Duration::from_secs(5),
            fallback_pacing: FallbackPacing::Natural,
            cors_origin: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = AppConfig::builder();

        if let Some(port) = get("PORT") {
            builder = builder.port(parse("PORT", &port)?);
        }
        if let Some(env) = get("APP_ENV") {
            builder = builder.environment(env);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(max) = get("DATABASE_MAX_CONNECTIONS") {
            builder = builder.database_max_connections(parse("DATABASE_MAX_CONNECTIONS", &max)?);
        }
        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(days) = get("JWT_TTL_DAYS") {
            let days: u64 = parse("JWT_TTL_DAYS", &days)?;
            builder = builder.jwt_ttl(Duration::from_secs(days * 24 * 60 * 60));
        }
        if let Some(cost) = get("BCRYPT_COST") {
            builder = builder.bcrypt_cost(parse("BCRYPT_COST", &cost)?);
        }
        if let Some(url) = get("AI_SERVICE_URL").or_else(|| get("FASTAPI_URL")) {
            builder = builder.ai_service_url(url);
        }
        if let Some(secs) = get("AI_CONNECT_TIMEOUT_SECS") {
            builder = builder.ai_connect_timeout(Duration::from_secs(parse(
                "AI_CONNECT_TIMEOUT_SECS",
                &secs,
            )?));
        }
        if let Some(pacing) = get("AI_FALLBACK_PACING") {
            builder = builder.fallback_pacing(pacing.parse()?);
        }
        if let Some(origin) = get("CORS_ORIGIN") {
            builder = builder.cors_origin(origin);
        }
        if let Some(limit) = get("BODY_LIMIT_BYTES") {
            builder = builder.body_limit(parse("BODY_LIMIT_BYTES", &limit)?);
        }

        builder.build()
    }

    /// Whether the JWT secret is still the well-known development default
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if !(self.ai_service_url.starts_with("http://")
            || self.ai_service_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl(self.ai_service_url.clone()));
        }
        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }
        if self.jwt_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "JWT_TTL_DAYS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: Option<AppConfig>,
}

impl AppConfigBuilder {
    fn config(&mut self) -> &mut AppConfig {
        self.config.get_or_insert_with(AppConfig::default)
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config().port = port;
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config().environment = environment.into();
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config().database_url = Some(url.into());
        self
    }

    pub fn database_max_connections(mut self, max: u32) -> Self {
        self.config().database_max_connections = max;
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config().jwt_secret = secret.into();
        self
    }

    pub fn jwt_ttl(mut self, ttl: Duration) -> Self {
        self.config().jwt_ttl = ttl;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config().bcrypt_cost = cost;
        self
    }

    /// Set the AI service base URL (a trailing slash is dropped)
    pub fn ai_service_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.config().ai_service_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn ai_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config().ai_connect_timeout = timeout;
        self
    }

    pub fn fallback_pacing(mut self, pacing: FallbackPacing) -> Self {
        self.config().fallback_pacing = pacing;
        self
    }

    /// Set the allowed CORS origin; `*` allows any origin
    pub fn cors_origin(mut self, origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        self.config().cors_origin = if origin.trim() == "*" {
            None
        } else {
            Some(origin)
        };
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.config().body_limit = limit;
        self
    }

    /// Build and validate the configuration
    pub fn build(mut self) -> Result<AppConfig, ConfigError> {
        let config = self.config().clone();
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
