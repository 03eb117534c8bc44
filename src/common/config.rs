//! Environment-based Configuration for the Wallet Engine
//!
//! Loads engine settings from environment variables. The engine holds no
//! secrets; everything here is endpoints and tuning knobs.
//!
//! # Environment Variables
//!
//! ## Environment
//! - `NOVA_ENV` - "production", "staging", or "dev" (default: "dev")
//! - `NOVA_API_URL` - Platform ledger API base URL
//!
//! ## Tuning
//! - `NOVA_RPC_TIMEOUT_MS` - Bound on every remote call (default: 8000)
//! - `NOVA_RESOLVER_TTL_SECS` - Recipient cache TTL (default: 60)
//! - `NOVA_HISTORY_PAGE_SIZE` - Ledger page size for history reads (default: 25)
//! - `NOVA_REFERENCE_RATE` - Override for the NOVA→reference exchange constant
//! - `NOVA_LOG_LEVEL` - Logging level (debug, info, warn, error)

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Staging,
    Dev,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" | "stage" => Ok(Environment::Staging),
            "dev" | "development" | "local" => Ok(Environment::Dev),
            _ => Err(ConfigError::InvalidValue(
                "NOVA_ENV".to_string(),
                format!("unknown environment: {}", s),
            )),
        }
    }
}

impl Environment {
    /// Get default ledger API endpoint for this environment
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://ledger.novaapp.io/api",
            Environment::Staging => "https://ledger.staging.novaapp.io/api",
            Environment::Dev => "http://localhost:4000/api",
        }
    }

    /// JSON logging is the default off-device
    pub fn prefers_json_logs(&self) -> bool {
        matches!(self, Environment::Production | Environment::Staging)
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Deployment environment
    pub environment: Environment,

    /// Ledger API base URL
    pub api_url: String,

    /// Bound on every remote call, in milliseconds
    pub rpc_timeout_ms: u64,

    /// Recipient cache TTL in seconds
    pub resolver_ttl_secs: u64,

    /// Ledger page size for history reads
    pub history_page_size: u32,

    /// NOVA→reference-currency exchange constant used for fee banding
    pub reference_rate: f64,

    /// Log level
    pub log_level: String,
}

impl WalletConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let environment: Environment = env::var("NOVA_ENV")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()?;

        let api_url = env::var("NOVA_API_URL")
            .unwrap_or_else(|_| environment.default_api_url().to_string());

        let rpc_timeout_ms = parse_env_or("NOVA_RPC_TIMEOUT_MS", 8_000)?;
        if rpc_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "NOVA_RPC_TIMEOUT_MS".to_string(),
                "timeout must be positive".to_string(),
            ));
        }

        let resolver_ttl_secs = parse_env_or("NOVA_RESOLVER_TTL_SECS", 60)?;
        let history_page_size = parse_env_or("NOVA_HISTORY_PAGE_SIZE", 25)?;

        let reference_rate = parse_env_or("NOVA_REFERENCE_RATE", crate::fees::NOVA_REFERENCE_RATE)?;
        if !(reference_rate.is_finite() && reference_rate > 0.0) {
            return Err(ConfigError::InvalidValue(
                "NOVA_REFERENCE_RATE".to_string(),
                "rate must be a positive number".to_string(),
            ));
        }

        let log_level = env::var("NOVA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api_url,
            rpc_timeout_ms,
            resolver_ttl_secs,
            history_page_size,
            reference_rate,
            log_level,
        })
    }

    /// RPC timeout as a Duration
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    /// Resolver TTL as a Duration
    pub fn resolver_ttl(&self) -> Duration {
        Duration::from_secs(self.resolver_ttl_secs)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Dev,
            api_url: Environment::Dev.default_api_url().to_string(),
            rpc_timeout_ms: 8_000,
            resolver_ttl_secs: 60,
            history_page_size: 25,
            reference_rate: crate::fees::NOVA_REFERENCE_RATE,
            log_level: "info".to_string(),
        }
    }
}

/// Parse an env var, falling back to a default when unset
fn parse_env_or<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var_name) {
        Ok(value) => value.parse().map_err(|_| {
            ConfigError::InvalidValue(var_name.to_string(), format!("cannot parse: {}", value))
        }),
        Err(_) => Ok(default),
    }
}
