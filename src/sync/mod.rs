//! Real-Time Sync Channel
//!
//! Subscribes to the backend's balance and history pushes and feeds the
//! balance store and any live activity feed. This is how the sender's UI
//! and the receiver's UI converge on the same state without polling: the
//! remote writes the rows, both clients receive their own side pushed.
//!
//! Pushes are applied in arrival order; each one is authoritative at
//! emission, so the latest-arriving push wins. When a stream drops the
//! store is marked stale rather than pretending freshness.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::common::error::{Result, WalletError};
use crate::common::logging::log_sync_event;
use crate::ledger::normalizer::{DisplayTransaction, LedgerNormalizer};
use crate::rpc::api::LedgerGateway;
use crate::store::BalanceStore;
use crate::transfer::pending::PendingTransfers;

/// Running subscription; dropping or stopping it releases everything
pub struct SyncHandle {
    balance_task: JoinHandle<()>,
    history_task: JoinHandle<()>,
}

impl SyncHandle {
    /// Tear the channel down. Safe to follow with a fresh `start`.
    pub fn stop(self) {
        self.balance_task.abort();
        self.history_task.abort();
    }

    /// Whether both pumps are still running
    pub fn is_running(&self) -> bool {
        !self.balance_task.is_finished() && !self.history_task.is_finished()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        // No leaked listeners after the handle goes away.
        self.balance_task.abort();
        self.history_task.abort();
    }
}

/// Wires backend pushes into the store, the pending registry, and the
/// live activity feed
#[derive(Clone)]
pub struct RealTimeSync {
    gateway: Arc<dyn LedgerGateway>,
    store: BalanceStore,
    pending: PendingTransfers,
    normalizer: LedgerNormalizer,
    activity: broadcast::Sender<DisplayTransaction>,
}

impl RealTimeSync {
    /// Create a sync channel over the engine's shared components
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        store: BalanceStore,
        pending: PendingTransfers,
        normalizer: LedgerNormalizer,
    ) -> Self {
        let (activity, _) = broadcast::channel(64);
        Self {
            gateway,
            store,
            pending,
            normalizer,
            activity,
        }
    }

    /// Subscribe to normalized new-history rows as they are pushed
    pub fn subscribe_activity(&self) -> broadcast::Receiver<DisplayTransaction> {
        self.activity.subscribe()
    }

    /// Establish both push subscriptions and start pumping.
    ///
    /// Returns an error without spawning anything when either subscription
    /// cannot be established. Calling `start` again after `stop` opens a
    /// fresh channel.
    pub async fn start(&self, user_id: &str) -> Result<SyncHandle> {
        let mut balance_stream = self
            .gateway
            .subscribe_balances(user_id)
            .await
            .map_err(WalletError::from)?;
        let mut history_stream = self
            .gateway
            .subscribe_history(user_id)
            .await
            .map_err(WalletError::from)?;

        log_sync_event("sync_started", user_id);

        let store = self.store.clone();
        let balance_task = tokio::spawn(async move {
            while let Some(balances) = balance_stream.next().await {
                store.apply_push(balances).await;
            }
            // Stream end means the channel dropped, not that we unsubscribed.
            log_sync_event("balance_channel_dropped", "falling back to last-known");
            store.mark_stale().await;
        });

        let store = self.store.clone();
        let pending = self.pending.clone();
        let normalizer = self.normalizer.clone();
        let activity = self.activity.clone();
        let viewer = user_id.to_string();
        let history_task = tokio::spawn(async move {
            while let Some(entry) = history_stream.next().await {
                // Settle any in-flight transfer this row confirms. Duplicate
                // delivery is harmless: a settled record never re-settles.
                if !pending.confirm_by_transaction(&entry.transaction_id).await {
                    if let Some(reference) = entry.metadata.client_reference.as_deref() {
                        pending.confirm_by_reference(reference).await;
                    }
                }

                let row = normalizer.normalize(&entry, &viewer).await;
                let _ = activity.send(row);
            }
            log_sync_event("history_channel_dropped", "falling back to last-known");
            store.mark_stale().await;
        });

        Ok(SyncHandle {
            balance_task,
            history_task,
        })
    }
}
