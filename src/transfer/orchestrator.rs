//! Transfer Orchestrator
//!
//! Runs one transfer end to end: validate → resolve → fee → invoke. The
//! steps execute strictly in this order; every local failure is surfaced
//! before any remote transfer call is made. Balances are never mutated
//! here; the store converges through the real-time channel or a reload.

use std::sync::Arc;

use crate::common::error::{Result, WalletError};
use crate::common::logging::log_transfer_event;
use crate::directory::resolver::{RecipientResolver, ResolvedRecipient};
use crate::fees;
use crate::rpc::api::{LedgerGateway, RpcError};
use crate::types::ledger::LedgerEntry;
use crate::types::transfer::{TransferCall, TransferRequest};
use crate::types::wallet::Currency;

use super::pending::{PendingTransfer, PendingTransfers};

/// Outcome of an accepted transfer, kept transiently for confirmation display
#[derive(Debug, Clone)]
pub struct TransactionResult {
    pub transaction_id: String,
    pub amount: f64,
    pub currency: Currency,
    /// Fee the remote actually charged; may undercut the requested fee
    pub fee_charged: f64,
    pub recipient: ResolvedRecipient,
    /// Reference to correlate with history rows and pending tracking
    pub client_reference: String,
}

/// Orchestrates validation, resolution, pricing, and submission
#[derive(Clone)]
pub struct TransferOrchestrator {
    gateway: Arc<dyn LedgerGateway>,
    resolver: RecipientResolver,
    pending: PendingTransfers,
    reference_rate: f64,
    history_page_size: u32,
}

impl TransferOrchestrator {
    /// Create an orchestrator over the given collaborators
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        resolver: RecipientResolver,
        pending: PendingTransfers,
        reference_rate: f64,
        history_page_size: u32,
    ) -> Self {
        Self {
            gateway,
            resolver,
            pending,
            reference_rate,
            history_page_size,
        }
    }

    /// Quote the fee the engine would attach to this transfer
    pub fn quote_fee(&self, currency: Currency, amount: f64) -> f64 {
        fees::compute_fee_with_rate(currency, amount, self.reference_rate)
    }

    /// Execute one transfer.
    ///
    /// `InvalidInput`, `NotFound`, and `SelfTransfer` are decided locally
    /// with zero transfer calls. `Rejected` and `Timeout` come from the
    /// remote; neither is retried here, and a `Timeout` leaves a pending
    /// record so the caller can reconcile against history.
    pub async fn send(&self, request: TransferRequest) -> Result<TransactionResult> {
        if !(request.amount.is_finite() && request.amount > 0.0) {
            return Err(WalletError::invalid_input(format!(
                "transfer amount must be positive, got {}",
                request.amount
            )));
        }

        if let Some(fee) = request.fee_override {
            if !(fee.is_finite() && fee >= 0.0) {
                return Err(WalletError::invalid_input(format!(
                    "fee override must be non-negative, got {}",
                    fee
                )));
            }
        }

        let recipient = self.resolver.resolve(&request.to_identifier).await?;

        if recipient.id == request.from_user_id {
            return Err(WalletError::SelfTransfer);
        }

        let fee = request
            .fee_override
            .unwrap_or_else(|| self.quote_fee(request.currency, request.amount));

        let client_reference = uuid::Uuid::new_v4().to_string();
        let call = TransferCall {
            from_user_id: request.from_user_id.clone(),
            to_user_id: recipient.id.clone(),
            amount: request.amount,
            currency: request.currency,
            fee,
            note: request.note.clone(),
            client_reference: client_reference.clone(),
        };

        let currency_name = request.currency.to_string();
        match self.gateway.transfer(&call).await {
            Ok(receipt) => {
                self.pending
                    .track(PendingTransfer::new(
                        client_reference.clone(),
                        Some(receipt.transaction_id.clone()),
                        receipt.amount,
                        receipt.currency,
                        receipt.fee_charged,
                        recipient.id.clone(),
                    ))
                    .await;

                log_transfer_event(
                    "transfer_accepted",
                    &client_reference,
                    receipt.amount,
                    &currency_name,
                    true,
                    None,
                );

                Ok(TransactionResult {
                    transaction_id: receipt.transaction_id,
                    amount: receipt.amount,
                    currency: receipt.currency,
                    fee_charged: receipt.fee_charged,
                    recipient,
                    client_reference,
                })
            }
            Err(RpcError::Timeout) => {
                // Outcome unknown: keep a pending record with no transaction
                // id so a history check can settle it either way.
                self.pending
                    .track(PendingTransfer::new(
                        client_reference.clone(),
                        None,
                        request.amount,
                        request.currency,
                        fee,
                        recipient.id.clone(),
                    ))
                    .await;

                log_transfer_event(
                    "transfer_ambiguous",
                    &client_reference,
                    request.amount,
                    &currency_name,
                    false,
                    Some("TIMEOUT"),
                );

                Err(WalletError::Timeout)
            }
            Err(err) => {
                let wallet_err = WalletError::from(err);
                log_transfer_event(
                    "transfer_failed",
                    &client_reference,
                    request.amount,
                    &currency_name,
                    false,
                    Some(wallet_err.error_code()),
                );
                Err(wallet_err)
            }
        }
    }

    /// Timeout recovery: scan recent history for a row carrying the client
    /// reference. Safe to retry; it is an idempotent read.
    pub async fn find_recent_transaction(
        &self,
        user_id: &str,
        client_reference: &str,
    ) -> Result<Option<LedgerEntry>> {
        let entries = self
            .gateway
            .recent_entries(user_id, self.history_page_size)
            .await
            .map_err(WalletError::from)?;

        Ok(entries
            .into_iter()
            .find(|e| e.metadata.client_reference.as_deref() == Some(client_reference)))
    }

    /// Settle an ambiguous submission after a history check: confirm it if
    /// the entry was found, revert it otherwise.
    pub async fn reconcile_ambiguous(
        &self,
        user_id: &str,
        client_reference: &str,
    ) -> Result<bool> {
        match self.find_recent_transaction(user_id, client_reference).await? {
            Some(entry) => {
                self.pending
                    .attach_transaction(client_reference, &entry.transaction_id)
                    .await;
                self.pending.confirm_by_reference(client_reference).await;
                Ok(true)
            }
            None => {
                self.pending.revert(client_reference).await;
                Ok(false)
            }
        }
    }

    /// In-flight registry handle
    pub fn pending(&self) -> &PendingTransfers {
        &self.pending
    }
}
