//! Collaborator Trait Definitions
//!
//! Abstract interfaces over the directory and ledger authority. The HTTP
//! client implements both for production; tests substitute mocks.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::common::error::WalletError;
use crate::types::ledger::LedgerEntry;
use crate::types::transfer::{TransferCall, TransferReceipt};
use crate::types::wallet::WalletBalances;

/// RPC-layer errors, classified so callers can tell a definite failure from
/// an ambiguous one
#[derive(Debug, Error)]
pub enum RpcError {
    /// Remote applied its business rules and said no; reason verbatim
    #[error("rejected by remote: {reason}")]
    Rejected { reason: String },

    /// The call did not complete within the bound; it may still have landed
    #[error("remote call timed out")]
    Timeout,

    /// The requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure before the remote could answer
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The remote answered with something this client cannot parse
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<RpcError> for WalletError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rejected { reason } => WalletError::Rejected(reason),
            RpcError::Timeout => WalletError::Timeout,
            RpcError::NotFound(what) => WalletError::NotFound(what),
            RpcError::Unavailable(msg) => WalletError::Unavailable(msg),
            RpcError::Protocol(msg) => WalletError::Internal(msg),
        }
    }
}

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

/// Push stream of authoritative balance snapshots
pub type BalanceStream = BoxStream<'static, WalletBalances>;

/// Push stream of newly written ledger rows owned by the subscribed user
pub type EntryStream = BoxStream<'static, LedgerEntry>;

/// A directory account as returned by identity lookup
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ResolvedAccount {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// Directory lookup interface.
///
/// Implementations must only return accounts in an active status; suspended
/// or deleted accounts resolve to `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up an active account by normalized handle
    async fn lookup_identity(&self, handle: &str) -> RpcResult<Option<ResolvedAccount>>;
}

/// Ledger authority interface.
///
/// `transfer` is atomic and idempotent by client reference on the remote
/// side; everything else is an idempotent read or an append the remote
/// deduplicates. Reads are safe to retry, `transfer` is not.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch current balances; the remote lazily provisions absent wallets
    async fn get_wallet(&self, user_id: &str) -> RpcResult<WalletBalances>;

    /// Execute one atomic peer-to-peer transfer
    async fn transfer(&self, call: &TransferCall) -> RpcResult<TransferReceipt>;

    /// Credit engagement points; returns the remote-reported new total
    async fn credit_points(
        &self,
        user_id: &str,
        amount: f64,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> RpcResult<f64>;

    /// Most recent ledger rows owned by the user, newest first
    async fn recent_entries(&self, user_id: &str, limit: u32) -> RpcResult<Vec<LedgerEntry>>;

    /// Subscribe to authoritative balance pushes. The stream ends when the
    /// channel drops; callers decide whether to re-subscribe.
    async fn subscribe_balances(&self, user_id: &str) -> RpcResult<BalanceStream>;

    /// Subscribe to new-history-row pushes
    async fn subscribe_history(&self, user_id: &str) -> RpcResult<EntryStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_maps_to_wallet_taxonomy() {
        let err: WalletError = RpcError::Rejected {
            reason: "insufficient balance".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "REJECTED");

        let err: WalletError = RpcError::Timeout.into();
        assert_eq!(err.error_code(), "TIMEOUT");

        let err: WalletError = RpcError::Unavailable("dns".to_string()).into();
        assert_eq!(err.error_code(), "UNAVAILABLE");
    }

    #[test]
    fn test_resolved_account_parsing() {
        let account: ResolvedAccount = serde_json::from_str(
            r#"{"id":"u_1","handle":"alice","display_name":"Alice","verified":true}"#,
        )
        .unwrap();
        assert_eq!(account.handle, "alice");
        assert!(account.verified);
        assert!(account.avatar_url.is_none());
    }
}
