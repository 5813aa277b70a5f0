//! API configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "defaults::host")]
    pub host: String,
    /// Server port
    #[serde(default = "defaults::port")]
    pub port: u16,
    /// Database URL
    #[serde(default = "defaults::database_url")]
    pub database_url: String,
    /// Log level
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Comma-separated phone numbers allowed to confirm/reject payments
    #[serde(default)]
    pub admin_phones: String,
    /// Amount at which a payment requires merchant confirmation
    #[serde(default = "defaults::auto_confirm_threshold")]
    pub auto_confirm_threshold: Decimal,
}

mod defaults {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    pub fn host() -> String {
        "0.0.0.0".to_string()
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn database_url() -> String {
        "postgres://localhost/rental".to_string()
    }

    pub fn log_level() -> String {
        "info".to_string()
    }

    pub fn auto_confirm_threshold() -> Decimal {
        dec!(500)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            database_url: defaults::database_url(),
            log_level: defaults::log_level(),
            admin_phones: String::new(),
            auto_confirm_threshold: dec!(500),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables prefixed with `API_`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
