//! Balance Store
//!
//! Process-wide cached view of the signed-in user's balances. The store
//! never computes a balance: it is mutated only by an explicit reload or an
//! authoritative push, so the client cannot drift from the remote ledger.
//!
//! Lifecycle: `Unloaded → Loading → Loaded`, with a stale flag raised when
//! the real-time channel drops. A failed load leaves the previous value in
//! place; there is no error terminal state, the caller simply retries.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{broadcast, RwLock};

use crate::common::error::{Result, WalletError};
use crate::rpc::api::LedgerGateway;
use crate::types::wallet::WalletBalances;

/// Load lifecycle of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Nothing fetched yet
    Unloaded,
    /// A reload is in flight
    Loading,
    /// Balances reflect the last authoritative report
    Loaded,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
        }
    }
}

/// Point-in-time view of the store, also the broadcast payload
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoreSnapshot {
    pub state: LoadState,
    pub balances: Option<WalletBalances>,
    /// True when the real-time channel dropped and values are last-known
    pub stale: bool,
    /// Unix seconds of the last authoritative update
    pub last_updated: Option<u64>,
}

#[derive(Debug)]
struct Inner {
    state: LoadState,
    balances: Option<WalletBalances>,
    stale: bool,
    last_updated: Option<u64>,
}

/// Shared balance store; clones observe the same state
#[derive(Clone)]
pub struct BalanceStore {
    inner: Arc<RwLock<Inner>>,
    events: broadcast::Sender<StoreSnapshot>,
}

impl BalanceStore {
    /// Create a store with the given broadcast capacity
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                state: LoadState::Unloaded,
                balances: None,
                stale: false,
                last_updated: None,
            })),
            events,
        }
    }

    /// Subscribe to snapshot broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<StoreSnapshot> {
        self.events.subscribe()
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read().await;
        Self::snapshot_of(&inner)
    }

    /// Explicitly fetch balances from the authority.
    ///
    /// On failure the store keeps its previous value and state; the error
    /// propagates so the caller can retry.
    pub async fn reload(&self, gateway: &dyn LedgerGateway, user_id: &str) -> Result<WalletBalances> {
        let previous = {
            let mut inner = self.inner.write().await;
            let previous = inner.state;
            inner.state = LoadState::Loading;
            previous
        };

        match gateway.get_wallet(user_id).await {
            Ok(balances) => {
                self.apply_authoritative(balances).await;
                Ok(balances)
            }
            Err(err) => {
                let mut inner = self.inner.write().await;
                inner.state = if inner.balances.is_some() {
                    LoadState::Loaded
                } else {
                    previous.min_unloaded()
                };
                Err(WalletError::from(err))
            }
        }
    }

    /// Apply an authoritative balance push. Overwrite, never merge; the
    /// latest-arriving push wins, and duplicates are naturally idempotent.
    pub async fn apply_push(&self, balances: WalletBalances) {
        self.apply_authoritative(balances).await;
    }

    /// Raise the stale flag; values stay last-known
    pub async fn mark_stale(&self) {
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.stale = true;
            Self::snapshot_of(&inner)
        };
        let _ = self.events.send(snapshot);
    }

    /// Reset to unloaded; called on sign-out
    pub async fn reset(&self) {
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.state = LoadState::Unloaded;
            inner.balances = None;
            inner.stale = false;
            inner.last_updated = None;
            Self::snapshot_of(&inner)
        };
        let _ = self.events.send(snapshot);
    }

    async fn apply_authoritative(&self, balances: WalletBalances) {
        let snapshot = {
            let mut inner = self.inner.write().await;
            inner.state = LoadState::Loaded;
            inner.balances = Some(balances);
            inner.stale = false;
            inner.last_updated = Some(now_secs());
            Self::snapshot_of(&inner)
        };
        // No subscribers is fine; the snapshot is still queryable.
        let _ = self.events.send(snapshot);
    }

    fn snapshot_of(inner: &Inner) -> StoreSnapshot {
        StoreSnapshot {
            state: inner.state,
            balances: inner.balances,
            stale: inner.stale,
            last_updated: inner.last_updated,
        }
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new(32)
    }
}

impl LoadState {
    /// Loading collapses back to Unloaded when a first load fails
    fn min_unloaded(self) -> LoadState {
        match self {
            LoadState::Loading => LoadState::Unloaded,
            other => other,
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::api::{MockLedgerGateway, RpcError};

    fn balances(transferable: f64, engagement: f64) -> WalletBalances {
        WalletBalances {
            transferable,
            engagement,
            secondary: 0.0,
        }
    }

    #[tokio::test]
    async fn test_reload_success() {
        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_get_wallet()
            .times(1)
            .returning(|_| Ok(balances(120.0, 45.0)));

        let store = BalanceStore::default();
        assert_eq!(store.snapshot().await.state, LoadState::Unloaded);

        let loaded = store.reload(&gateway, "u_1").await.unwrap();
        assert_eq!(loaded.transferable, 120.0);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Loaded);
        assert_eq!(snapshot.balances, Some(balances(120.0, 45.0)));
        assert!(!snapshot.stale);
    }

    #[tokio::test]
    async fn test_failed_first_load_returns_to_unloaded() {
        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_get_wallet()
            .returning(|_| Err(RpcError::Unavailable("down".to_string())));

        let store = BalanceStore::default();
        assert!(store.reload(&gateway, "u_1").await.is_err());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Unloaded);
        assert!(snapshot.balances.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_value() {
        let store = BalanceStore::default();
        store.apply_push(balances(100.0, 10.0)).await;

        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_get_wallet()
            .returning(|_| Err(RpcError::Timeout));

        assert!(store.reload(&gateway, "u_1").await.is_err());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Loaded);
        assert_eq!(snapshot.balances, Some(balances(100.0, 10.0)));
    }

    #[tokio::test]
    async fn test_push_overwrites_and_duplicate_is_idempotent() {
        let store = BalanceStore::default();
        store.apply_push(balances(100.0, 10.0)).await;
        store.apply_push(balances(80.0, 12.0)).await;

        let after_two = store.snapshot().await;
        assert_eq!(after_two.balances, Some(balances(80.0, 12.0)));

        // Same payload delivered again: same observable state.
        store.apply_push(balances(80.0, 12.0)).await;
        let after_duplicate = store.snapshot().await;
        assert_eq!(after_duplicate.state, after_two.state);
        assert_eq!(after_duplicate.balances, after_two.balances);
        assert_eq!(after_duplicate.stale, after_two.stale);
    }

    #[tokio::test]
    async fn test_last_arriving_push_wins() {
        let store = BalanceStore::default();
        // Reordered delivery: the later-arriving payload is authoritative.
        store.apply_push(balances(50.0, 5.0)).await;
        store.apply_push(balances(45.0, 5.0)).await;
        assert_eq!(
            store.snapshot().await.balances,
            Some(balances(45.0, 5.0))
        );
    }

    #[tokio::test]
    async fn test_stale_flag_and_push_recovery() {
        let store = BalanceStore::default();
        store.apply_push(balances(100.0, 10.0)).await;

        store.mark_stale().await;
        let stale = store.snapshot().await;
        assert!(stale.stale);
        assert_eq!(stale.balances, Some(balances(100.0, 10.0)));

        store.apply_push(balances(90.0, 10.0)).await;
        assert!(!store.snapshot().await.stale);
    }

    #[tokio::test]
    async fn test_subscribers_see_pushes() {
        let store = BalanceStore::default();
        let mut rx = store.subscribe();

        store.apply_push(balances(70.0, 7.0)).await;

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.balances, Some(balances(70.0, 7.0)));
        assert_eq!(snapshot.state, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = BalanceStore::default();
        store.apply_push(balances(100.0, 10.0)).await;
        store.mark_stale().await;

        store.reset().await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.state, LoadState::Unloaded);
        assert!(snapshot.balances.is_none());
        assert!(!snapshot.stale);
        assert!(snapshot.last_updated.is_none());
    }
}
