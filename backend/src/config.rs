//! Configuration management for the Solar Planner platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SOLAR__ prefix
//! 4. The flat `GENERATIVE_MODEL_KEY` and `WEBHOOK_SHARED_SECRET` variables

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Auth provider webhook configuration
    pub webhook: WebhookConfig,

    /// Generative model configuration
    pub gemini: GeminiConfig,

    /// Historical weather archive configuration
    pub weather: WeatherConfig,

    /// Reverse geocoding configuration
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 key the auth provider signs session tokens with
    pub session_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    /// Signing secret (`whsec_...`)
    pub secret: String,

    /// Accepted clock skew for webhook timestamps, in seconds
    pub tolerance_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Archive API endpoint
    pub archive_url: String,

    /// Timezone the daily values are computed in
    pub timezone: String,

    /// Calendar year to fetch; defaults to the previous full year
    pub archive_year: Option<i32>,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Reverse geocoding API base URL
    pub base_url: String,

    /// Identifying User-Agent required by the geocoding usage policy
    pub user_agent: String,

    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SOLAR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("webhook.tolerance_secs", 300)?
            .set_default("gemini.model", "gemini-2.0-flash-001")?
            .set_default(
                "gemini.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.temperature", 0.4)?
            .set_default("gemini.top_p", 0.9)?
            .set_default("gemini.timeout_secs", 120)?
            .set_default(
                "weather.archive_url",
                "https://archive-api.open-meteo.com/v1/archive",
            )?
            .set_default("weather.timezone", "auto")?
            .set_default("weather.timeout_secs", 30)?
            .set_default("geocoding.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoding.user_agent", "solar-planner/0.1")?
            .set_default("geocoding.timeout_secs", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SOLAR__ prefix)
            .add_source(
                Environment::with_prefix("SOLAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("gemini.api_key", std::env::var("GENERATIVE_MODEL_KEY").ok())?
            .set_override_option("webhook.secret", std::env::var("WEBHOOK_SHARED_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 3000);
        assert_eq!(server.host, "0.0.0.0");
    }

    #[test]
    fn test_missing_secrets_fail_to_load() {
        // Required sections without defaults (database.url, auth, api keys)
        let result = config::Config::builder()
            .set_default("environment", "test")
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize::<Config>());
        assert!(result.is_err());
    }
}
