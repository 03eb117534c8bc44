//! Wallet Engine Facade
//!
//! Explicitly constructed, dependency-injected assembly of the wallet
//! components with a defined lifecycle: create → connect → use →
//! sign_out. Nothing here is a module-global; tests build isolated engines
//! over mock collaborators.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::awards::{AwardEngine, AwardResult};
use crate::common::config::WalletConfig;
use crate::common::error::Result;
use crate::common::logging::log_sync_event;
use crate::directory::resolver::{RecipientResolver, ResolvedRecipient};
use crate::ledger::normalizer::{DisplayTransaction, LedgerNormalizer};
use crate::rpc::api::{Directory, LedgerGateway};
use crate::rpc::http::HttpLedgerClient;
use crate::store::{BalanceStore, StoreSnapshot};
use crate::sync::{RealTimeSync, SyncHandle};
use crate::transfer::orchestrator::{TransactionResult, TransferOrchestrator};
use crate::transfer::pending::{PendingTransfer, PendingTransfers};
use crate::types::ledger::LedgerEntry;
use crate::types::transfer::TransferRequest;
use crate::types::wallet::Currency;

/// One signed-in user's wallet engine
pub struct WalletEngine {
    config: WalletConfig,
    user_id: String,
    gateway: Arc<dyn LedgerGateway>,
    resolver: RecipientResolver,
    orchestrator: TransferOrchestrator,
    normalizer: LedgerNormalizer,
    awards: AwardEngine,
    store: BalanceStore,
    sync: RealTimeSync,
    sync_handle: Mutex<Option<SyncHandle>>,
}

impl WalletEngine {
    /// Create an engine talking to the platform API from configuration
    pub fn new(config: WalletConfig, user_id: impl Into<String>) -> Self {
        let client = Arc::new(HttpLedgerClient::from_config(&config));
        let gateway: Arc<dyn LedgerGateway> = client.clone();
        let directory: Arc<dyn Directory> = client;
        Self::with_collaborators(config, user_id, gateway, directory)
    }

    /// Create an engine over explicit collaborators (the test seam)
    pub fn with_collaborators(
        config: WalletConfig,
        user_id: impl Into<String>,
        gateway: Arc<dyn LedgerGateway>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        let user_id = user_id.into();
        let resolver = RecipientResolver::new(directory, config.resolver_ttl());
        let pending = PendingTransfers::new();
        let orchestrator = TransferOrchestrator::new(
            gateway.clone(),
            resolver.clone(),
            pending.clone(),
            config.reference_rate,
            config.history_page_size,
        );
        let normalizer = LedgerNormalizer::new(resolver.clone());
        let awards = AwardEngine::new(gateway.clone());
        let store = BalanceStore::default();
        let sync = RealTimeSync::new(
            gateway.clone(),
            store.clone(),
            pending,
            normalizer.clone(),
        );

        Self {
            config,
            user_id,
            gateway,
            resolver,
            orchestrator,
            normalizer,
            awards,
            store,
            sync,
            sync_handle: Mutex::new(None),
        }
    }

    /// The signed-in user this engine serves
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Load balances and open the real-time channel. Calling again replaces
    /// any previous channel with a fresh one.
    pub async fn connect(&self) -> Result<StoreSnapshot> {
        self.store.reload(self.gateway.as_ref(), &self.user_id).await?;

        let handle = self.sync.start(&self.user_id).await?;
        if let Some(previous) = self.sync_handle.lock().await.replace(handle) {
            previous.stop();
        }

        Ok(self.store.snapshot().await)
    }

    /// Close the real-time channel; balances stay last-known
    pub async fn disconnect(&self) {
        if let Some(handle) = self.sync_handle.lock().await.take() {
            handle.stop();
        }
    }

    /// Send to a handle or address, with engine-computed fee
    pub async fn send(
        &self,
        to_identifier: &str,
        amount: f64,
        currency: Currency,
    ) -> Result<TransactionResult> {
        self.send_request(TransferRequest::new(
            self.user_id.clone(),
            to_identifier,
            amount,
            currency,
        ))
        .await
    }

    /// Send a fully specified request (note, pre-confirmed fee)
    pub async fn send_request(&self, request: TransferRequest) -> Result<TransactionResult> {
        self.orchestrator.send(request).await
    }

    /// Fee this engine would attach to a transfer, for confirmation display
    pub fn quote_fee(&self, currency: Currency, amount: f64) -> f64 {
        self.orchestrator.quote_fee(currency, amount)
    }

    /// Resolve a recipient for pre-send display
    pub async fn resolve_recipient(&self, identifier: &str) -> Result<ResolvedRecipient> {
        self.resolver.resolve(identifier).await
    }

    /// Award engagement points (fire-and-forget semantics)
    pub async fn award(
        &self,
        kind: &str,
        metadata: Option<serde_json::Value>,
    ) -> Option<AwardResult> {
        self.awards.award(&self.user_id, kind, metadata).await
    }

    /// Mint engagement points for a reference-currency deposit
    pub async fn mint_for_deposit(&self, reference_amount: f64) -> Option<AwardResult> {
        self.awards.mint_for_deposit(&self.user_id, reference_amount).await
    }

    /// Current cached balances
    pub async fn balances(&self) -> StoreSnapshot {
        self.store.snapshot().await
    }

    /// Explicitly re-fetch balances from the authority
    pub async fn reload_balances(&self) -> Result<StoreSnapshot> {
        self.store.reload(self.gateway.as_ref(), &self.user_id).await?;
        Ok(self.store.snapshot().await)
    }

    /// Subscribe to balance snapshot broadcasts
    pub fn subscribe_balances(&self) -> tokio::sync::broadcast::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    /// Subscribe to normalized pushed history rows
    pub fn subscribe_activity(&self) -> tokio::sync::broadcast::Receiver<DisplayTransaction> {
        self.sync.subscribe_activity()
    }

    /// Display-ready recent history, newest first
    pub async fn recent_activity(&self, limit: Option<u32>) -> Result<Vec<DisplayTransaction>> {
        let limit = limit.unwrap_or(self.config.history_page_size);
        let entries = self
            .gateway
            .recent_entries(&self.user_id, limit)
            .await
            .map_err(crate::common::error::WalletError::from)?;
        Ok(self.normalizer.normalize_page(&entries, &self.user_id).await)
    }

    /// Transfers still awaiting authoritative settlement
    pub async fn pending_transfers(&self) -> Vec<PendingTransfer> {
        self.orchestrator.pending().pending().await
    }

    /// Timeout recovery: look for a submitted transfer in recent history
    pub async fn find_recent_transaction(
        &self,
        client_reference: &str,
    ) -> Result<Option<LedgerEntry>> {
        self.orchestrator
            .find_recent_transaction(&self.user_id, client_reference)
            .await
    }

    /// Settle an ambiguous submission after a timeout; returns whether the
    /// transfer was found to have landed
    pub async fn reconcile_ambiguous(&self, client_reference: &str) -> Result<bool> {
        self.orchestrator
            .reconcile_ambiguous(&self.user_id, client_reference)
            .await
    }

    /// Tear down all per-user state. A subsequently signed-in user on the
    /// same device starts from a clean engine.
    pub async fn sign_out(&self) {
        self.disconnect().await;
        self.resolver.clear_cache().await;
        self.orchestrator.pending().clear().await;
        self.store.reset().await;
        log_sync_event("signed_out", &self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::api::{MockDirectory, MockLedgerGateway, ResolvedAccount, RpcError};
    use crate::store::LoadState;
    use crate::types::ledger::{ChangeType, EntryMetadata};
    use crate::types::transfer::TransferReceipt;
    use crate::types::wallet::WalletBalances;
    use futures_util::{stream, StreamExt};

    fn directory_with_bob() -> MockDirectory {
        let mut directory = MockDirectory::new();
        directory.expect_lookup_identity().returning(|h| {
            if h == "bob" {
                Ok(Some(ResolvedAccount {
                    id: "u_bob".to_string(),
                    handle: "bob".to_string(),
                    display_name: "Bob".to_string(),
                    avatar_url: None,
                    verified: false,
                }))
            } else {
                Ok(None)
            }
        });
        directory
    }

    fn engine(gateway: MockLedgerGateway, directory: MockDirectory) -> WalletEngine {
        WalletEngine::with_collaborators(
            WalletConfig::default(),
            "u_alice",
            Arc::new(gateway),
            Arc::new(directory),
        )
    }

    #[tokio::test]
    async fn test_connect_loads_and_subscribes() {
        let mut gateway = MockLedgerGateway::new();
        gateway.expect_get_wallet().returning(|_| {
            Ok(WalletBalances {
                transferable: 120.0,
                engagement: 45.0,
                secondary: 0.0,
            })
        });
        gateway
            .expect_subscribe_balances()
            .returning(|_| Ok(stream::pending().boxed()));
        gateway
            .expect_subscribe_history()
            .returning(|_| Ok(stream::pending().boxed()));

        let engine = engine(gateway, directory_with_bob());
        let snapshot = engine.connect().await.unwrap();

        assert_eq!(snapshot.state, LoadState::Loaded);
        assert_eq!(snapshot.balances.unwrap().transferable, 120.0);

        engine.disconnect().await;
    }

    #[tokio::test]
    async fn test_end_to_end_send_and_activity() {
        let mut gateway = MockLedgerGateway::new();
        gateway.expect_transfer().times(1).returning(|call| {
            Ok(TransferReceipt {
                transaction_id: "tx_1".to_string(),
                amount: call.amount,
                currency: call.currency,
                fee_charged: call.fee,
            })
        });
        gateway.expect_recent_entries().returning(|user_id, _| {
            Ok(vec![LedgerEntry {
                id: "le_1".to_string(),
                owner_user_id: user_id.to_string(),
                transaction_id: "tx_1".to_string(),
                change_type: ChangeType::Debit,
                amount: 50.0,
                balance_before: 100.0,
                balance_after: 50.0,
                currency: Currency::Points,
                reason: "p2p_transfer".to_string(),
                metadata: EntryMetadata {
                    counterparty_handle: Some("bob".to_string()),
                    fee: Some(0.5),
                    ..Default::default()
                },
                created_at: 1_700_000_000,
            }])
        });

        let engine = engine(gateway, directory_with_bob());

        let result = engine.send("@bob", 50.0, Currency::Points).await.unwrap();
        assert_eq!(result.fee_charged, 0.5);
        assert_eq!(result.recipient.id, "u_bob");
        assert_eq!(engine.pending_transfers().await.len(), 1);

        let rows = engine.recent_activity(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Sent");
        assert_eq!(rows[0].counterparty.as_ref().unwrap().handle, "bob");
    }

    #[tokio::test]
    async fn test_quote_matches_submitted_fee() {
        let mut gateway = MockLedgerGateway::new();
        let quoted = std::sync::Arc::new(std::sync::Mutex::new(0.0_f64));
        let seen = quoted.clone();
        gateway.expect_transfer().returning(move |call| {
            *seen.lock().unwrap() = call.fee;
            Ok(TransferReceipt {
                transaction_id: "tx_1".to_string(),
                amount: call.amount,
                currency: call.currency,
                fee_charged: call.fee,
            })
        });

        let engine = engine(gateway, directory_with_bob());
        let quote = engine.quote_fee(Currency::Points, 50.0);
        engine.send("@bob", 50.0, Currency::Points).await.unwrap();

        assert_eq!(*quoted.lock().unwrap(), quote);
        assert_eq!(quote, 0.5);
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache_store_and_pending() {
        let mut gateway = MockLedgerGateway::new();
        gateway.expect_transfer().returning(|call| {
            Ok(TransferReceipt {
                transaction_id: "tx_1".to_string(),
                amount: call.amount,
                currency: call.currency,
                fee_charged: call.fee,
            })
        });
        gateway.expect_get_wallet().returning(|_| {
            Ok(WalletBalances {
                transferable: 10.0,
                engagement: 0.0,
                secondary: 0.0,
            })
        });

        // The directory must be hit twice for the same handle: once before
        // sign-out, once after (the cache was cleared between).
        let mut directory = MockDirectory::new();
        directory
            .expect_lookup_identity()
            .times(2)
            .returning(|h| {
                Ok(Some(ResolvedAccount {
                    id: "u_bob".to_string(),
                    handle: h.to_string(),
                    display_name: "Bob".to_string(),
                    avatar_url: None,
                    verified: false,
                }))
            });

        let engine = engine(gateway, directory);
        engine.reload_balances().await.unwrap();
        engine.send("@bob", 10.0, Currency::Nova).await.unwrap();

        engine.sign_out().await;

        assert_eq!(engine.balances().await.state, LoadState::Unloaded);
        assert!(engine.pending_transfers().await.is_empty());

        // Cache gone: this resolution performs a fresh lookup.
        engine.resolve_recipient("@bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_reload_failure_leaves_previous_snapshot() {
        let mut gateway = MockLedgerGateway::new();
        let mut calls = 0;
        gateway.expect_get_wallet().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(WalletBalances {
                    transferable: 10.0,
                    engagement: 1.0,
                    secondary: 0.0,
                })
            } else {
                Err(RpcError::Timeout)
            }
        });

        let engine = engine(gateway, directory_with_bob());
        engine.reload_balances().await.unwrap();
        assert!(engine.reload_balances().await.is_err());

        let snapshot = engine.balances().await;
        assert_eq!(snapshot.state, LoadState::Loaded);
        assert_eq!(snapshot.balances.unwrap().transferable, 10.0);
    }
}
