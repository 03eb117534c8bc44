//! Nova Wallet Engine
//!
//! Client-side engine for the Nova platform's dual-currency wallet: it
//! prices and submits peer-to-peer transfers, resolves recipients, keeps a
//! cached authoritative view of balances, and renders the shared ledger
//! correctly from each participant's perspective.
//!
//! ## Components
//!
//! 1. **Fee Calculator** - pure banded fees per currency
//! 2. **Recipient Resolver** - handle/address resolution with a TTL cache
//! 3. **Transfer Orchestrator** - validate → resolve → fee → invoke
//! 4. **Ledger Normalizer** - perspective-correct display rows
//! 5. **EP Award Engine** - fire-and-forget engagement credits
//! 6. **Balance Store + Real-Time Sync** - push-driven authoritative state
//!
//! The remote ledger authority owns atomicity and all durable state; this
//! engine owns request correctness, caching, fee computation, and
//! presentation. See `WalletEngine` for the assembled facade.

pub mod awards;
pub mod common;
pub mod directory;
pub mod engine;
pub mod fees;
pub mod ledger;
pub mod rpc;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod types;

// Re-exports: error and configuration
pub use common::{
    init_from_config, init_logging, ConfigError, Environment, LogLevel, Result, WalletConfig,
    WalletError,
};

// Re-exports: engine facade
pub use engine::WalletEngine;

// Re-exports: core types
pub use types::{ChangeType, Currency, EntryMetadata, LedgerEntry, TransferRequest, WalletBalances};

// Re-exports: component surfaces
pub use awards::{AwardEngine, AwardResult};
pub use directory::{RecipientKind, RecipientResolver, ResolvedRecipient};
pub use ledger::{DisplayTransaction, LedgerNormalizer, Tone};
pub use rpc::{Directory, HttpLedgerClient, LedgerGateway};
pub use store::{BalanceStore, LoadState, StoreSnapshot};
pub use sync::{RealTimeSync, SyncHandle};
pub use transfer::{PendingStatus, PendingTransfer, TransactionResult, TransferOrchestrator};

/// Engagement-point conversion helpers
pub mod units {
    /// Points minted per reference-currency unit deposited
    pub const EP_PER_REFERENCE_UNIT: f64 = 10.0;

    /// Points minted for a deposit, floored to a whole quantity
    pub fn deposit_to_points(reference_amount: f64) -> f64 {
        if !(reference_amount.is_finite() && reference_amount > 0.0) {
            return 0.0;
        }
        (reference_amount * EP_PER_REFERENCE_UNIT).floor()
    }

    /// Human-readable amount with currency suffix
    pub fn format_amount(amount: f64, currency: crate::types::wallet::Currency) -> String {
        format!("{:.2} {}", amount, currency)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::types::wallet::Currency;

        #[test]
        fn test_deposit_conversion_floors() {
            assert_eq!(deposit_to_points(12.59), 125.0);
            assert_eq!(deposit_to_points(0.05), 0.0);
            assert_eq!(deposit_to_points(-1.0), 0.0);
        }

        #[test]
        fn test_format_amount() {
            assert_eq!(format_amount(50.0, Currency::Points), "50.00 EP");
            assert_eq!(format_amount(12.5, Currency::Nova), "12.50 NOVA");
        }
    }
}
