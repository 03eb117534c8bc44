//! Structured Logging for the Wallet Engine
//!
//! JSON output for log aggregation in production, pretty output for
//! development. Transfer and award outcomes are logged as structured events
//! with correlation ids so a single user action can be traced across the
//! resolver, the transfer call, and the later authoritative push.

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Event categories for structured logging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Transfer lifecycle events
    Transfer,
    /// Engagement-point award events
    Award,
    /// Real-time sync channel events
    Sync,
    /// Recipient resolution events
    Resolver,
    /// System events (startup, sign-out)
    System,
}

/// Structured log event
#[derive(Debug, Serialize)]
pub struct LogEvent {
    /// Event timestamp (ISO 8601)
    pub timestamp: String,
    /// Log level
    pub level: String,
    /// Event category
    pub category: EventCategory,
    /// Human-readable message
    pub message: String,
    /// Correlation ID for tracing a user action end to end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Additional structured data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error code when the event records a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: format!("{:?}", level).to_uppercase(),
            category,
            message: message.into(),
            correlation_id: None,
            data: None,
            error_code: None,
        }
    }

    /// Add correlation ID
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Add structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add error code
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Serialize this event to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"error\": \"failed to serialize log\", \"message\": \"{}\"}}",
                self.message
            )
        })
    }
}

/// Log a transfer outcome
pub fn log_transfer_event(
    event_type: &str,
    client_reference: &str,
    amount: f64,
    currency: &str,
    success: bool,
    error_code: Option<&str>,
) {
    let level = if success { LogLevel::Info } else { LogLevel::Warn };
    let mut event = LogEvent::new(level, EventCategory::Transfer, event_type)
        .with_correlation_id(client_reference)
        .with_data(serde_json::json!({
            "amount": amount,
            "currency": currency,
            "success": success
        }));

    if let Some(code) = error_code {
        event = event.with_error_code(code);
    }

    if success {
        tracing::info!(target: "nova_wallet::transfer", "{}", event.to_json());
    } else {
        tracing::warn!(target: "nova_wallet::transfer", "{}", event.to_json());
    }
}

/// Log an engagement-point award outcome.
///
/// Awards are fire-and-forget, so a failure here is the only trace a lost
/// award leaves behind.
pub fn log_award_event(kind: &str, points: f64, success: bool, error_code: Option<&str>) {
    let level = if success { LogLevel::Debug } else { LogLevel::Warn };
    let mut event = LogEvent::new(level, EventCategory::Award, kind).with_data(serde_json::json!({
        "points": points,
        "success": success
    }));

    if let Some(code) = error_code {
        event = event.with_error_code(code);
    }

    if success {
        tracing::debug!(target: "nova_wallet::award", "{}", event.to_json());
    } else {
        tracing::warn!(target: "nova_wallet::award", "{}", event.to_json());
    }
}

/// Log a real-time sync channel event
pub fn log_sync_event(event_type: &str, detail: &str) {
    let event = LogEvent::new(LogLevel::Info, EventCategory::Sync, event_type)
        .with_data(serde_json::json!({ "detail": detail }));
    tracing::info!(target: "nova_wallet::sync", "{}", event.to_json());
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Minimum log level to output
/// * `json_format` - Use JSON format (recommended off-device)
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nova_wallet={}",
            format!("{:?}", level).to_lowercase()
        ))
    });

    if json_format {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        );

        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Initialize logging from a WalletConfig
pub fn init_from_config(config: &super::config::WalletConfig) -> Result<(), LoggingError> {
    let level = LogLevel::from(config.log_level.as_str());
    init_logging(level, config.environment.prefers_json_logs())
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Generate a unique correlation ID for tracing a user action
pub fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!("{:x}-{:04x}", timestamp & 0xFFFFFFFF, rand::random::<u16>())
}
