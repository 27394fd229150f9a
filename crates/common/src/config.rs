//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::{AppError, AppResult};

/// Minimum accepted length of the session secret key.
pub const MIN_SECRET_KEY_LENGTH: usize = 16;

/// Default number of posts per feed page.
pub const DEFAULT_POSTS_PER_PAGE: u64 = 2;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Feed configuration.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign login sessions. Required.
    #[serde(default)]
    pub secret_key: String,
}

/// Feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Number of posts on one feed page.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
        }
    }
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_posts_per_page() -> u64 {
    DEFAULT_POSTS_PER_PAGE
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("FLOCK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FLOCK_ENV`)
    /// 4. Environment variables with `FLOCK_` prefix, e.g. `FLOCK_AUTH__SECRET_KEY`
    ///
    /// The result is validated before it is returned.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let env = std::env::var("FLOCK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment())
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a specific file, with environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a TOML document, without environment overrides.
    pub fn from_toml_str(toml: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    fn finish(config: config::Config) -> AppResult<Self> {
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that have no usable default.
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.secret_key.trim().is_empty() {
            return Err(AppError::Config(
                "auth.secret_key is required (set FLOCK_AUTH__SECRET_KEY; `flock gen-secret` prints one)"
                    .to_string(),
            ));
        }
        if self.auth.secret_key.chars().count() < MIN_SECRET_KEY_LENGTH {
            return Err(AppError::Config(format!(
                "auth.secret_key must be at least {MIN_SECRET_KEY_LENGTH} characters"
            )));
        }
        if self.database.url.trim().is_empty() {
            return Err(AppError::Config("database.url is required".to_string()));
        }
        if self.feed.posts_per_page == 0 {
            return Err(AppError::Config(
                "feed.posts_per_page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
