use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub amadeus: Option<AmadeusConfig>,
    #[serde(default)]
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Absent: run on the in-memory repositories.
    pub url: Option<String>,
    #[serde(default)]
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    /// Absent: no rate limiting.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusConfig {
    #[serde(default = "default_amadeus_url")]
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_amadeus_url() -> String { "https://test.api.amadeus.com".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_success_rate")]
    pub payment_success_rate: f64,
    #[serde(default = "default_reference_attempts")]
    pub reference_attempts: u32,
    #[serde(default = "default_external_marker")]
    pub external_marker: String,
}

fn default_success_rate() -> f64 { 0.9 }
fn default_reference_attempts() -> u32 { 3 }
fn default_external_marker() -> String { "amadeus_".to_string() }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            payment_success_rate: default_success_rate(),
            reference_attempts: default_reference_attempts(),
            external_marker: default_external_marker(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: i64,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: i64,
}

fn default_max_requests() -> i64 { 100 }
fn default_window_seconds() -> i64 { 900 }

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `AEROBOOK__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("AEROBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
