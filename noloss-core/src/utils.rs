//! # Utility Functions
//!
//! Display and conversion helpers for timestamps and fixed-point token
//! amounts.

use crate::error::{Error, Result};
use crate::{Balance, Timestamp, PRECISION};

/// A whole number of tokens in fixed-point units.
pub fn tokens(n: u64) -> Balance {
    n as Balance * PRECISION
}

/// Fixed-point units to a (lossy) token count, for display only.
pub fn units_to_tokens(amount: Balance) -> f64 {
    amount as f64 / PRECISION as f64
}

/// Token count to fixed-point units. Negative inputs clamp to zero.
pub fn tokens_to_units(tokens: f64) -> Balance {
    if tokens <= 0.0 {
        return 0;
    }
    (tokens * PRECISION as f64) as Balance
}

/// Format timestamp as human-readable string
pub fn format_timestamp(timestamp: Timestamp) -> String {
    use chrono::DateTime;
    let dt = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parse timestamp from string
pub fn parse_timestamp(timestamp_str: &str) -> Result<Timestamp> {
    timestamp_str
        .parse::<Timestamp>()
        .map_err(|_| Error::InvalidTiming(format!("invalid timestamp: {timestamp_str}")))
}
