//! # Time Utilities
//!
//! Utilities for expiry computation using chrono.

use chrono::{DateTime, Duration, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Instant `minutes` from now, used for expiring capabilities such as upload URLs.
pub fn expires_in_minutes(minutes: i64) -> DateTime<Utc> {
    now_utc() + Duration::minutes(minutes)
}
