//! Transfer Request Types
//!
//! Ephemeral types that live for one send: the caller's intent, the wire
//! call after resolution and fee computation, and the remote's receipt.

use serde::{Deserialize, Serialize};

use super::wallet::Currency;

/// A caller's transfer intent, before resolution.
///
/// Constructed by the UI, validated and consumed by one orchestrator call,
/// then discarded.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Sending user's stable id
    pub from_user_id: String,
    /// Handle (with or without `@`) or a `nova1…` address
    pub to_identifier: String,
    /// Amount to transfer, exclusive of fee
    pub amount: f64,
    /// Currency being sent
    pub currency: Currency,
    /// Optional free-text note for the recipient
    pub note: Option<String>,
    /// Pre-computed fee from a confirmation flow; when set, submitted as-is
    /// so the user pays exactly the fee they were shown
    pub fee_override: Option<f64>,
}

impl TransferRequest {
    /// Plain request with no note and engine-computed fee
    pub fn new(
        from_user_id: impl Into<String>,
        to_identifier: impl Into<String>,
        amount: f64,
        currency: Currency,
    ) -> Self {
        Self {
            from_user_id: from_user_id.into(),
            to_identifier: to_identifier.into(),
            amount,
            currency,
            note: None,
            fee_override: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Submit a pre-computed fee instead of recomputing
    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee_override = Some(fee);
        self
    }
}

/// The resolved wire call handed to the ledger authority
#[derive(Debug, Clone, Serialize)]
pub struct TransferCall {
    pub from_user_id: String,
    /// Resolved recipient id or raw address
    pub to_user_id: String,
    pub amount: f64,
    pub currency: Currency,
    /// Fee as shown to the user; the remote may waive part of it
    pub fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Client-generated reference for remote-side deduplication of retries
    pub client_reference: String,
}

/// The remote's receipt for an accepted transfer
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransferReceipt {
    pub transaction_id: String,
    pub amount: f64,
    pub currency: Currency,
    /// Fee actually charged; may differ from the requested fee
    pub fee_charged: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = TransferRequest::new("u_alice", "@bob", 50.0, Currency::Points)
            .with_note("lunch")
            .with_fee(0.5);

        assert_eq!(req.to_identifier, "@bob");
        assert_eq!(req.note.as_deref(), Some("lunch"));
        assert_eq!(req.fee_override, Some(0.5));
    }

    #[test]
    fn test_call_omits_empty_note() {
        let call = TransferCall {
            from_user_id: "u_a".to_string(),
            to_user_id: "u_b".to_string(),
            amount: 10.0,
            currency: Currency::Nova,
            fee: 1.0,
            note: None,
            client_reference: "ref-1".to_string(),
        };

        let json = serde_json::to_string(&call).unwrap();
        assert!(!json.contains("note"));
        assert!(json.contains("client_reference"));
    }

    #[test]
    fn test_receipt_parsing() {
        let receipt: TransferReceipt = serde_json::from_str(
            r#"{"transaction_id":"tx_1","amount":50.0,"currency":"points","fee_charged":0.5}"#,
        )
        .unwrap();
        assert_eq!(receipt.transaction_id, "tx_1");
        assert_eq!(receipt.fee_charged, 0.5);
    }
}
