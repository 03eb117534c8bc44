//! Ledger Presentation
//!
//! Re-labels immutable wallet-history rows for the viewing user.

pub mod normalizer;

pub use normalizer::{CounterpartyDisplay, DisplayTransaction, LedgerNormalizer, Tone};
