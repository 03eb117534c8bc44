//! Wallet and Currency Types

use serde::{Deserialize, Serialize};

use crate::common::error::WalletError;

/// The two transferable in-app currencies.
///
/// The wallet additionally tracks a secondary balance used by an internal
/// payment feature; it is not peer-transferable and so has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// NOVA, the freely sendable platform token
    Nova,
    /// Engagement points, earned through in-app activity
    Points,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nova => write!(f, "NOVA"),
            Self::Points => write!(f, "EP"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nova" => Ok(Currency::Nova),
            "points" | "ep" => Ok(Currency::Points),
            _ => Err(WalletError::invalid_input(format!("unknown currency: {}", s))),
        }
    }
}

/// A user's balances as reported by the ledger authority.
///
/// The client never decrements these locally; it only reflects what the
/// remote reports, so the values here are always authoritative-at-emission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalletBalances {
    /// Transferable NOVA balance
    pub transferable: f64,
    /// Engagement-point balance
    pub engagement: f64,
    /// Balance reserved for the internal payment feature
    #[serde(default)]
    pub secondary: f64,
}

impl WalletBalances {
    /// Balance for a transferable currency
    pub fn balance_for(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Nova => self.transferable,
            Currency::Points => self.engagement,
        }
    }
}

impl Default for WalletBalances {
    fn default() -> Self {
        Self {
            transferable: 0.0,
            engagement: 0.0,
            secondary: 0.0,
        }
    }
}
