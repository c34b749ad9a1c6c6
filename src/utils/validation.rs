//! Finite-value guards.
//!
//! Derived analytics are ratios of indexer values that may be zero, missing
//! (modelled as NaN) or wildly out of range. Nothing non-finite may reach a
//! view model, so every computed field passes through one of these.

/// Returns `value` when finite, otherwise `fallback`.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Returns `value` when finite, otherwise `0.0`.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    finite_or(value, 0.0)
}

/// Some(value) when strictly positive and finite.
#[inline]
pub fn positive_finite(value: f64) -> Option<f64> {
    if value > 0.0 && value.is_finite() {
        Some(value)
    } else {
        None
    }
}
