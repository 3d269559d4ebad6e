//! Process configuration.
//!
//! Loaded once at startup from a TOML file and read-only thereafter. The
//! object-store client and the database pool are both constructed from this
//! configuration exactly once; nothing here is consulted per request.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub object_store: ObjectStoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "./bookbin.sqlite".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectStoreConfig {
    /// Base endpoint of the S3-compatible service, e.g.
    /// `https://<account>.r2.cloudflarestorage.com`.
    #[serde(default)]
    pub endpoint: String,

    /// Signing region. R2 and several S3-compatible stores accept "auto".
    #[serde(default = "default_region")]
    pub region: String,

    /// Bucket holding image objects.
    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    /// Public base address from which stored objects are served. Image URLs
    /// are derived as `<public_base_url>/images/<key>`.
    #[serde(default)]
    pub public_base_url: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: String::new(),
        }
    }
}

fn default_region() -> String {
    "auto".to_string()
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./config.toml", "./bookbin.toml", "/etc/bookbin/config.toml"];

    for path_str in default_paths {
        let path = Path::new(path_str);
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.database.path.is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    let store = &config.object_store;
    if !store.endpoint.is_empty() {
        if store.bucket.is_empty() {
            anyhow::bail!("Object store endpoint is set but no bucket is configured");
        }
        if store.access_key_id.is_empty() || store.secret_access_key.is_empty() {
            anyhow::bail!("Object store endpoint is set but credentials are incomplete");
        }
        if store.public_base_url.is_empty() {
            tracing::warn!("Object store configured without a public base URL; image URLs will be relative");
        }
    }

    Ok(())
}
