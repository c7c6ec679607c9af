use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub const BACKEND_URL_ENV: &str = "STOREFRONT_BACKEND_URL";
pub const STORAGE_DIR_ENV: &str = "STOREFRONT_STORAGE_DIR";

const CONFIG_PATHS: [&str; 2] = ["storefront.toml", "./config/storefront.toml"];

/// Storefront settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Base URL of the product API, without the `/api` suffix
    pub backend_url: String,
    /// Directory backing the durable key-value store
    pub storage_dir: PathBuf,
    /// Key under which the cart is stored
    pub cart_key: String,
    pub request_timeout_secs: u64,
    /// Channel capacity of the cart and product services
    pub buffer_size: usize,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            storage_dir: PathBuf::from("./.storefront"),
            cart_key: "shoppingCart".to_string(),
            request_timeout_secs: 10,
            buffer_size: 32,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file read error: {0}")]
    FileRead(String),
    #[error("Config parse error: {0}")]
    Parse(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl StorefrontConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// First config file found, or defaults; then environment overrides; then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match CONFIG_PATHS.iter().find(|path| Path::new(path).exists()) {
            Some(path) => {
                info!(path, "Loading config file");
                Self::load_from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(dir) = lookup(STORAGE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // The HTTP client is built without a TLS backend.
        if self.backend_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "backend_url must use plain http, TLS is not supported: {:?}",
                self.backend_url
            )));
        }
        if !self.backend_url.starts_with("http://") {
            return Err(ConfigError::Validation(format!(
                "backend_url must be an http URL, got {:?}",
                self.backend_url
            )));
        }
        if self.cart_key.trim().is_empty() {
            return Err(ConfigError::Validation("cart_key must not be empty".to_string()));
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::Validation("buffer_size must be greater than 0".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation("request_timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}
