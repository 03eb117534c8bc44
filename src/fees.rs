//! Transfer Fee Calculator
//!
//! Flat banded fees, not percentages: predictable to display, negligible for
//! meaningful transfers, and enough friction to discourage dust spam. NOVA
//! amounts are first converted to a reference-currency value with a fixed
//! exchange constant, then banded.

use crate::types::wallet::Currency;

/// Reference-currency units per NOVA. Compiled-in; deployments can pin a
/// corrected rate via `NOVA_REFERENCE_RATE` without a client release.
pub const NOVA_REFERENCE_RATE: f64 = 0.5;

/// Engagement-point fee bands: (exclusive upper bound, fee)
const POINTS_BANDS: [(f64, f64); 3] = [(100.0, 0.5), (500.0, 2.0), (2000.0, 5.0)];
const POINTS_FEE_MAX: f64 = 10.0;

/// NOVA fee bands over the reference value: (exclusive upper bound, fee)
const NOVA_BANDS: [(f64, f64); 4] = [(250.0, 1.0), (1000.0, 2.0), (5000.0, 4.0), (25000.0, 7.0)];
const NOVA_FEE_MAX: f64 = 10.0;

/// Convert a NOVA amount to its reference-currency value
pub fn nova_to_reference(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// Compute the fee for a transfer using the compiled-in exchange rate.
///
/// Pure and deterministic. Negative or NaN amounts are treated as zero,
/// which lands in the minimum band.
pub fn compute_fee(currency: Currency, amount: f64) -> f64 {
    compute_fee_with_rate(currency, amount, NOVA_REFERENCE_RATE)
}

/// Compute the fee with an explicit NOVA→reference rate
pub fn compute_fee_with_rate(currency: Currency, amount: f64, rate: f64) -> f64 {
    let amount = if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    };

    match currency {
        Currency::Points => banded(amount, &POINTS_BANDS, POINTS_FEE_MAX),
        Currency::Nova => banded(nova_to_reference(amount, rate), &NOVA_BANDS, NOVA_FEE_MAX),
    }
}

fn banded(value: f64, bands: &[(f64, f64)], max_fee: f64) -> f64 {
    for (bound, fee) in bands {
        if value < *bound {
            return *fee;
        }
    }
    max_fee
}
