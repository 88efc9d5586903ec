//! Environment-driven server configuration.
//!
//! `.env` is loaded by `main` before [`ServerConfig::from_env`] runs. Only
//! `DATABASE_URL` is required; everything else has a default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use model::MAX_IMAGE_BYTES;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IMAGE_STORAGE_DIR: &str = "./uploads";
const DEFAULT_IMAGE_PUBLIC_URL: &str = "http://localhost:3000/uploads";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL required")]
    MissingDatabaseUrl,
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

/// Where uploaded images live and how they are addressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    pub storage_dir: PathBuf,
    /// Prefix for public image URLs, without a trailing slash.
    pub public_url: String,
    pub max_bytes: usize,
}

impl ImageConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            storage_dir: std::env::var("IMAGE_STORAGE_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_IMAGE_STORAGE_DIR), PathBuf::from),
            public_url: std::env::var("IMAGE_PUBLIC_URL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_PUBLIC_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            max_bytes: env_parse("IMAGE_MAX_BYTES", MAX_IMAGE_BYTES),
        }
    }

    /// Public URL of the object stored under `key`.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url)
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_IMAGE_STORAGE_DIR),
            public_url: DEFAULT_IMAGE_PUBLIC_URL.to_owned(),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub images: ImageConfig,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset or `PORT` is not a valid
    /// port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { database_url, port, images: ImageConfig::from_env() })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
