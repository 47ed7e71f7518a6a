use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use config::Config;
use serde::Deserialize;

use crate::constants::DAV_ROUTE_PREFIX;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dav: DavConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.clone()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Protocol limits and addressing for the DAV tree.
#[derive(Debug, Clone, Deserialize)]
pub struct DavConfig {
    /// Path prefix that every DAV resource lives under, e.g. `/dav`.
    pub prefix: String,
    pub max_resource_size: u64,
    /// Upper bound on recurrence instances expanded per component.
    pub max_instances: u32,
    pub max_attendees_per_instance: u32,
    /// Storage allowance per user, reported through the quota properties.
    pub quota_bytes: u64,
    pub min_date_time: DateTime<Utc>,
    pub max_date_time: DateTime<Utc>,
}

impl DavConfig {
    /// ## Summary
    /// Returns the prefix with a leading slash and without trailing slashes.
    ///
    /// An empty or `/` prefix normalizes to the empty string.
    #[must_use]
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

impl Default for DavConfig {
    fn default() -> Self {
        Self {
            prefix: DAV_ROUTE_PREFIX.to_string(),
            max_resource_size: 10 * 1024 * 1024,
            max_instances: 1000,
            max_attendees_per_instance: 100,
            quota_bytes: 1024 * 1024 * 1024,
            min_date_time: Utc
                .with_ymd_and_hms(1900, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            max_date_time: Utc
                .with_ymd_and_hms(2099, 12, 31, 23, 59, 59)
                .single()
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// A statically configured account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub id: String,
    pub display_name: String,
    pub email: String,
    /// Argon2 PHC string, see the `kunai-hash-password` binary.
    pub password_hash: String,
    /// Calendar ids created for the user at startup.
    #[serde(default = "default_calendars")]
    pub calendars: Vec<String>,
}

fn default_calendars() -> Vec<String> {
    vec!["personal".to_string()]
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("logging.level", "debug")?
            .set_default("dav.prefix", DAV_ROUTE_PREFIX)?
            .set_default("dav.max_resource_size", 10_485_760)?
            .set_default("dav.max_instances", 1000)?
            .set_default("dav.max_attendees_per_instance", 100)?
            .set_default("dav.quota_bytes", 1024 * 1024 * 1024)?
            .set_default("dav.min_date_time", "1900-01-01T00:00:00Z")?
            .set_default("dav.max_date_time", "2099-12-31T23:59:59Z")?
            // Env file
            .add_source(
                config::Environment::with_prefix("KUNAI")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}
