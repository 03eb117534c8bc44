//! Common Infrastructure Module
//!
//! Shared plumbing for the wallet engine:
//! - Configuration loading from environment variables
//! - Structured logging setup
//! - Common error types

pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use config::{ConfigError, Environment, WalletConfig};
pub use error::{Result, WalletError};
pub use logging::{
    generate_correlation_id, init_from_config, init_logging, log_award_event, log_sync_event,
    log_transfer_event, EventCategory, LogEvent, LogLevel, LoggingError,
};
