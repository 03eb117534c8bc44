//! Ledger Entry Types
//!
//! One logical transfer is stored as two rows: a debit owned by the sender
//! and a credit owned by the receiver, linked by a shared transaction id.
//! Rows are write-once; the engine reads and re-labels them per viewer,
//! never mutates them.

use serde::{Deserialize, Serialize};

use super::wallet::Currency;

/// Current metadata schema version written by this engine
pub const METADATA_SCHEMA_VERSION: u32 = 1;

/// Direction of a balance change from the row owner's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Amount left the owner's balance
    Debit,
    /// Amount entered the owner's balance
    Credit,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "debit"),
            Self::Credit => write!(f, "credit"),
        }
    }
}

/// Versioned, explicitly-typed entry metadata.
///
/// The upstream store used a free-form JSON blob here; every field this
/// engine depends on is enumerated so an upstream rename fails loudly at
/// the serde boundary instead of silently dropping counterparties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Schema version; bumped when fields are added or renamed
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Counterparty handle, the only sanctioned source of counterparty identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_handle: Option<String>,
    /// Counterparty stable id, when the remote includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_id: Option<String>,
    /// Free-text note attached by the sender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Fee charged on the transfer; recorded here, never netted into `amount`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<f64>,
    /// Client-generated reference id echoed back by the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<String>,
}

fn default_schema_version() -> u32 {
    METADATA_SCHEMA_VERSION
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self {
            schema_version: METADATA_SCHEMA_VERSION,
            counterparty_handle: None,
            counterparty_id: None,
            note: None,
            fee: None,
            client_reference: None,
        }
    }
}

/// One immutable wallet-history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique row id
    pub id: String,
    /// User who owns this row (sender for debit, receiver for credit)
    pub owner_user_id: String,
    /// Shared id linking the debit and credit rows of one transfer
    pub transaction_id: String,
    /// Direction from the owner's point of view
    pub change_type: ChangeType,
    /// Transferred amount; equal on both rows of a transaction
    pub amount: f64,
    /// Owner's balance before the change
    pub balance_before: f64,
    /// Owner's balance after the change
    pub balance_after: f64,
    /// Currency of the change
    pub currency: Currency,
    /// Audit reason (e.g. "p2p_transfer", "engagement:post_liked")
    pub reason: String,
    /// Versioned metadata
    #[serde(default)]
    pub metadata: EntryMetadata,
    /// Creation time, unix seconds
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_serde() {
        let json = serde_json::to_string(&ChangeType::Debit).unwrap();
        assert_eq!(json, "\"debit\"");
        let parsed: ChangeType = serde_json::from_str("\"credit\"").unwrap();
        assert_eq!(parsed, ChangeType::Credit);
    }

    #[test]
    fn test_metadata_tolerates_missing_fields() {
        // A bare object must deserialize; absent counterparty means the
        // viewer sees "Unknown", never a dropped row.
        let meta: EntryMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(meta.schema_version, METADATA_SCHEMA_VERSION);
        assert!(meta.counterparty_handle.is_none());
        assert!(meta.note.is_none());
    }

    #[test]
    fn test_entry_round_trips_metadata() {
        let entry = LedgerEntry {
            id: "le_1".to_string(),
            owner_user_id: "u_alice".to_string(),
            transaction_id: "tx_9".to_string(),
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
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.counterparty_handle.as_deref(), Some("bob"));
        assert_eq!(back.metadata.fee, Some(0.5));
        assert_eq!(back, entry);
    }
}
