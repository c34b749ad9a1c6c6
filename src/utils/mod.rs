//! Utility functions shared by the aggregation layer.
//!
//! - [`conversion`] - Address normalisation and lenient numeric parsing for
//!   subgraph/REST payloads (numbers arrive as strings, numbers or null)
//! - [`validation`] - Finite-value guards applied to every derived number
//! - [`time`] - Delta timestamps and relative-time rendering

mod conversion;
mod time;
mod validation;

// ============================================
// Common Constants
// ============================================

/// Placeholder shown for any value an upstream API did not provide.
pub const NOT_AVAILABLE: &str = "Not available";

/// Placeholder shown for a value that cannot be computed yet.
pub const DASH: &str = "-";

// ============================================
// Re-exports
// ============================================

pub use conversion::{
    de_decimal, de_opt_decimal, de_opt_u64, normalize_address, parse_decimal, same_address,
    to_checksum,
};

pub use time::{delta_timestamps, from_now, DeltaTimestamps};

pub use validation::{finite_or, finite_or_zero, positive_finite};
