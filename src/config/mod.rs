// src/config/mod.rs
// Environment-backed configuration with defaults for every value

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{Level, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    // ── Server
    pub host: String,
    pub port: u16,

    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Locator
    pub search_radius_meters: f64,
    pub default_list_limit: usize,
    pub max_list_limit: usize,

    // ── Geocoding
    pub geocoder_base_url: String,
    pub geocoder_api_key: Option<String>,
    pub geocoder_timeout: u64,

    // ── Mail
    pub mail_from: String,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_timeout: u64,

    // ── Logging
    pub log_level: String,
}

/// Parse `key` from `lookup`, falling back to `default` when it is unset or malformed.
///
/// Values may carry trailing `# comments` the way hand-edited .env files do.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.split('#').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: parse_or(&lookup, "HOST", "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000),
            database_url: parse_or(&lookup, "DATABASE_URL", "sqlite:./adopt_a_drain.db?mode=rwc".to_string()),
            sqlite_max_connections: parse_or(&lookup, "SQLITE_MAX_CONNECTIONS", 5),
            search_radius_meters: parse_or(&lookup, "SEARCH_RADIUS_METERS", 5000.0),
            default_list_limit: parse_or(&lookup, "DEFAULT_LIST_LIMIT", 10),
            max_list_limit: parse_or(&lookup, "MAX_LIST_LIMIT", 100),
            geocoder_base_url: parse_or(&lookup, "GEOCODER_BASE_URL", "https://maps.google.com".to_string()),
            geocoder_api_key: optional(&lookup, "GEOCODER_API_KEY"),
            geocoder_timeout: parse_or(&lookup, "GEOCODER_TIMEOUT", 10),
            mail_from: parse_or(&lookup, "MAIL_FROM", "adoptadrain@example.org".to_string()),
            mail_api_url: optional(&lookup, "MAIL_API_URL"),
            mail_api_key: optional(&lookup, "MAIL_API_KEY"),
            mail_timeout: parse_or(&lookup, "MAIL_TIMEOUT", 10),
            log_level: parse_or(&lookup, "LOG_LEVEL", "info".to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout)
    }

    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout)
    }

    /// `log_level` as a tracing level; unknown names fall back to INFO.
    pub fn tracing_level(&self) -> Level {
        self.log_level.trim().parse().unwrap_or(Level::INFO)
    }

    /// Clamp a requested list size into `1..=max_list_limit`.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
