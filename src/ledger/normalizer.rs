//! Ledger Row Normalizer
//!
//! One transfer is two rows, and each participant must see their own side
//! correctly: the sender's debit row reads "Sent −", the receiver's credit
//! row reads "Received +". Counterparty identity comes from the stored
//! metadata handle and nothing else; a failed directory enrichment degrades
//! to handle-only display, because a missing avatar must never hide a
//! financial record.

use crate::directory::resolver::RecipientResolver;
use crate::types::ledger::{ChangeType, LedgerEntry};
use crate::types::wallet::Currency;

/// Sign glyph on a debit row
pub const SIGN_DEBIT: &str = "−";
/// Sign glyph on a credit row
pub const SIGN_CREDIT: &str = "+";

/// Color affordance for a display row
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Outgoing value; rendered with the warning color
    Warning,
    /// Incoming value; rendered with the positive color
    Positive,
}

/// Display info for the other side of a transfer
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CounterpartyDisplay {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub verified: bool,
}

/// A ledger row ready for rendering, from one viewer's perspective
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DisplayTransaction {
    pub entry_id: String,
    pub transaction_id: String,
    /// "Sent" or "Received"
    pub label: &'static str,
    /// "−" or "+"
    pub sign: &'static str,
    pub tone: Tone,
    pub amount: f64,
    pub currency: Currency,
    /// `None` renders as "Unknown"
    pub counterparty: Option<CounterpartyDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    pub balance_after: f64,
    pub created_at: u64,
}

/// Normalizes raw ledger rows for display
#[derive(Clone)]
pub struct LedgerNormalizer {
    resolver: RecipientResolver,
}

impl LedgerNormalizer {
    /// Create a normalizer sharing the engine's resolver cache
    pub fn new(resolver: RecipientResolver) -> Self {
        Self { resolver }
    }

    /// Normalize one raw row for the viewing user.
    ///
    /// Idempotent and side-effect-free beyond resolver cache population.
    pub async fn normalize(&self, entry: &LedgerEntry, viewer_user_id: &str) -> DisplayTransaction {
        let (label, sign, tone) = match entry.change_type {
            ChangeType::Debit => ("Sent", SIGN_DEBIT, Tone::Warning),
            ChangeType::Credit => ("Received", SIGN_CREDIT, Tone::Positive),
        };

        if entry.owner_user_id != viewer_user_id {
            tracing::debug!(
                target: "nova_wallet::ledger",
                "normalizing row {} owned by {} for viewer {}",
                entry.id,
                entry.owner_user_id,
                viewer_user_id
            );
        }

        DisplayTransaction {
            entry_id: entry.id.clone(),
            transaction_id: entry.transaction_id.clone(),
            label,
            sign,
            tone,
            amount: entry.amount,
            currency: entry.currency,
            counterparty: self.counterparty_display(entry).await,
            note: entry.metadata.note.clone(),
            fee: entry.metadata.fee,
            balance_after: entry.balance_after,
            created_at: entry.created_at,
        }
    }

    /// Normalize a page of rows, newest-first order preserved
    pub async fn normalize_page(
        &self,
        entries: &[LedgerEntry],
        viewer_user_id: &str,
    ) -> Vec<DisplayTransaction> {
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            rows.push(self.normalize(entry, viewer_user_id).await);
        }
        rows
    }

    /// Counterparty display from the metadata handle, enriched through the
    /// resolver when possible, handle-only when the lookup fails.
    async fn counterparty_display(&self, entry: &LedgerEntry) -> Option<CounterpartyDisplay> {
        let handle = entry.metadata.counterparty_handle.as_deref()?;

        match self.resolver.resolve(handle).await {
            Ok(recipient) => Some(CounterpartyDisplay {
                handle: recipient.handle.unwrap_or_else(|| handle.to_string()),
                display_name: recipient.display_name,
                avatar_url: recipient.avatar_url,
                verified: recipient.verified,
            }),
            Err(_) => Some(CounterpartyDisplay {
                handle: handle.to_string(),
                display_name: None,
                avatar_url: None,
                verified: false,
            }),
        }
    }
}
