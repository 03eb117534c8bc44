//! In-Flight Transfer Registry
//!
//! Each submitted transfer is a three-state value: pending until the
//! authoritative history push arrives, then confirmed; or reverted when a
//! post-timeout history check shows the transfer never landed. The UI
//! renders pending rows distinctly instead of mutating a balance number,
//! so nothing is ever double-counted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;

use crate::types::wallet::Currency;

/// Settlement state of an in-flight transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    /// Submitted; awaiting the authoritative push
    Pending,
    /// The matching ledger row arrived
    Confirmed,
    /// A history check established the transfer never landed
    Reverted,
}

/// One in-flight transfer
#[derive(Debug, Clone)]
pub struct PendingTransfer {
    /// Client-generated reference; the registry key
    pub client_reference: String,
    /// Remote transaction id; absent when the submission timed out
    pub transaction_id: Option<String>,
    pub amount: f64,
    pub currency: Currency,
    pub fee: f64,
    pub recipient_id: String,
    pub status: PendingStatus,
    /// Submission time, unix seconds
    pub created_at: u64,
}

impl PendingTransfer {
    /// New pending record for a just-submitted transfer
    pub fn new(
        client_reference: String,
        transaction_id: Option<String>,
        amount: f64,
        currency: Currency,
        fee: f64,
        recipient_id: String,
    ) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            client_reference,
            transaction_id,
            amount,
            currency,
            fee,
            recipient_id,
            status: PendingStatus::Pending,
            created_at: now,
        }
    }
}

/// Registry of in-flight transfers, keyed by client reference
#[derive(Clone)]
pub struct PendingTransfers {
    entries: Arc<RwLock<HashMap<String, PendingTransfer>>>,
}

impl PendingTransfers {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Track a newly submitted transfer
    pub async fn track(&self, transfer: PendingTransfer) {
        let mut entries = self.entries.write().await;
        entries.insert(transfer.client_reference.clone(), transfer);
    }

    /// Get one record by client reference
    pub async fn get(&self, client_reference: &str) -> Option<PendingTransfer> {
        self.entries.read().await.get(client_reference).cloned()
    }

    /// Confirm by remote transaction id. Returns true if a pending record
    /// was settled; duplicate pushes settle nothing and return false.
    pub async fn confirm_by_transaction(&self, transaction_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        for transfer in entries.values_mut() {
            if transfer.status == PendingStatus::Pending
                && transfer.transaction_id.as_deref() == Some(transaction_id)
            {
                transfer.status = PendingStatus::Confirmed;
                return true;
            }
        }
        false
    }

    /// Confirm by client reference (used when a post-timeout history check
    /// finds the transaction, or when the push carries the echoed reference)
    pub async fn confirm_by_reference(&self, client_reference: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(client_reference) {
            Some(t) if t.status == PendingStatus::Pending => {
                t.status = PendingStatus::Confirmed;
                true
            }
            _ => false,
        }
    }

    /// Record that a transaction id became known after an ambiguous submit
    pub async fn attach_transaction(&self, client_reference: &str, transaction_id: &str) {
        let mut entries = self.entries.write().await;
        if let Some(t) = entries.get_mut(client_reference) {
            t.transaction_id = Some(transaction_id.to_string());
        }
    }

    /// Mark a pending transfer as never having landed
    pub async fn revert(&self, client_reference: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(client_reference) {
            Some(t) if t.status == PendingStatus::Pending => {
                t.status = PendingStatus::Reverted;
                true
            }
            _ => false,
        }
    }

    /// All records still awaiting settlement
    pub async fn pending(&self) -> Vec<PendingTransfer> {
        self.entries
            .read()
            .await
            .values()
            .filter(|t| t.status == PendingStatus::Pending)
            .cloned()
            .collect()
    }

    /// Drop settled records, keeping only pending ones
    pub async fn prune_settled(&self) {
        self.entries
            .write()
            .await
            .retain(|_, t| t.status == PendingStatus::Pending);
    }

    /// Drop everything; called on sign-out
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of tracked records
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Counts per settlement state
    pub async fn stats(&self) -> PendingStats {
        let entries = self.entries.read().await;
        let mut stats = PendingStats::default();
        for t in entries.values() {
            match t.status {
                PendingStatus::Pending => stats.pending += 1,
                PendingStatus::Confirmed => stats.confirmed += 1,
                PendingStatus::Reverted => stats.reverted += 1,
            }
        }
        stats
    }
}

impl Default for PendingTransfers {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStats {
    pub pending: usize,
    pub confirmed: usize,
    pub reverted: usize,
}

impl std::fmt::Display for PendingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "in-flight: {} pending | {} confirmed | {} reverted",
            self.pending, self.confirmed, self.reverted
        )
    }
}
