//! Core Types for the Wallet Engine
//!
//! Wire-facing and display-facing types shared across components.

pub mod ledger;
pub mod transfer;
pub mod wallet;

pub use ledger::{ChangeType, EntryMetadata, LedgerEntry, METADATA_SCHEMA_VERSION};
pub use transfer::{TransferCall, TransferReceipt, TransferRequest};
pub use wallet::{Currency, WalletBalances};
