//! Lease policy constants, TTL validation, and the expiry rule.
//!
//! A lease is an advisory, time-bounded claim of exclusive edit rights on a
//! record. Expiry is authoritative: a lease row whose `expires_at` has passed
//! is logically released even if the row is still physically present, and any
//! reader encountering one is expected to clear it.

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Lease duration constants
// ---------------------------------------------------------------------------

/// Default lease duration in minutes. Short enough that an abandoned lease
/// does not block others indefinitely, long enough to fill a multi-field form.
pub const DEFAULT_LEASE_TTL_MINS: i64 = 10;

/// Maximum allowed lease duration in minutes (4 hours).
pub const MAX_LEASE_TTL_MINS: i64 = 240;

/// Minimum lease duration in minutes.
pub const MIN_LEASE_TTL_MINS: i64 = 1;

/// How often the expired-lease sweeper runs (in seconds).
pub const SWEEP_INTERVAL_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Expiry rule
// ---------------------------------------------------------------------------

/// The single expiry test shared by the lock manager and the sweeper.
///
/// A lease is expired at the instant `now` reaches `expires_at`.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now >= expires_at
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate a lease TTL in minutes.
pub fn validate_lease_ttl(minutes: i64) -> Result<(), CoreError> {
    if minutes < MIN_LEASE_TTL_MINS {
        return Err(CoreError::Validation(format!(
            "Lease TTL must be at least {MIN_LEASE_TTL_MINS} minute(s), got {minutes}"
        )));
    }
    if minutes > MAX_LEASE_TTL_MINS {
        return Err(CoreError::Validation(format!(
            "Lease TTL must be at most {MAX_LEASE_TTL_MINS} minutes, got {minutes}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn lease_is_live_before_expiry() {
        let now = Utc::now();
        assert!(!is_expired(now + Duration::minutes(5), now));
    }

    #[test]
    fn lease_is_expired_at_the_boundary() {
        let now = Utc::now();
        assert!(is_expired(now, now));
    }

    #[test]
    fn lease_is_expired_after_expiry() {
        let now = Utc::now();
        assert!(is_expired(now - Duration::seconds(1), now));
    }

    #[test]
    fn valid_ttls() {
        assert!(validate_lease_ttl(MIN_LEASE_TTL_MINS).is_ok());
        assert!(validate_lease_ttl(DEFAULT_LEASE_TTL_MINS).is_ok());
        assert!(validate_lease_ttl(MAX_LEASE_TTL_MINS).is_ok());
    }

    #[test]
    fn ttl_too_short() {
        let result = validate_lease_ttl(0);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least"));
    }

    #[test]
    fn ttl_too_long() {
        let result = validate_lease_ttl(MAX_LEASE_TTL_MINS + 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at most"));
    }

    #[test]
    fn ttl_negative() {
        assert!(validate_lease_ttl(-10).is_err());
    }
}
