//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal`; values convert to `f64` only at the
//! storage/serialization boundary, rounded to 2 decimal places half-up, so
//! totals always match to the cent.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
///
/// Input values are validated finite at the API boundary. If NaN/Infinity
/// somehow reaches here, logs an error and returns ZERO to avoid silent
/// corruption in monetary math.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Line subtotal: unit_price * quantity, exact to the cent
pub fn line_subtotal(unit_price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Order total: sum of line subtotals, exact to the cent
pub fn order_total(subtotals: impl IntoIterator<Item = f64>) -> f64 {
    let total: Decimal = subtotals.into_iter().map(to_decimal).sum();
    to_f64(total)
}
