//! Common Error Types for the Nova Wallet Engine
//!
//! Provides the unified error taxonomy every component reports through.
//! The split between `Rejected` and `Timeout` is load-bearing: a rejected
//! transfer definitely did not happen, a timed-out one may have.

use thiserror::Error;

/// Root error type for the wallet engine
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed amount or identifier; never sent to the remote
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Recipient does not exist or is not an active account
    #[error("recipient not found: {0}")]
    NotFound(String),

    /// Sender and resolved recipient are the same account
    #[error("cannot transfer to your own account")]
    SelfTransfer,

    /// Remote business-rule failure; reason passed through verbatim
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// Remote call did not complete within the bound; outcome unknown
    #[error("request timed out; outcome unknown")]
    Timeout,

    /// Real-time channel dropped or remote unreachable
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] super::logging::LoggingError),

    /// Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a rejected error with the remote's reason
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether an immediate retry of the same call is safe.
    ///
    /// A `Rejected` transfer definitely failed (retryable once the cause is
    /// fixed, e.g. after topping up). `Timeout` is NOT retryable: the call
    /// may have succeeded server-side and a blind retry could double-send.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WalletError::Rejected(_) | WalletError::Unavailable(_) | WalletError::NotFound(_)
        )
    }

    /// Whether the caller must re-check recent history before retrying
    pub fn requires_history_check(&self) -> bool {
        matches!(self, WalletError::Timeout)
    }

    /// Get error code for structured surfaces
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletError::InvalidInput(_) => "INVALID_INPUT",
            WalletError::NotFound(_) => "NOT_FOUND",
            WalletError::SelfTransfer => "SELF_TRANSFER",
            WalletError::Rejected(_) => "REJECTED",
            WalletError::Timeout => "TIMEOUT",
            WalletError::Unavailable(_) => "UNAVAILABLE",
            WalletError::Config(_) => "CONFIG_ERROR",
            WalletError::Logging(_) => "LOGGING_ERROR",
            WalletError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias using WalletError
pub type Result<T> = std::result::Result<T, WalletError>;
