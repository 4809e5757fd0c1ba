//! Expiry arithmetic for session payloads
//!
//! All functions take `now` explicitly so callers evaluate one request against
//! a single instant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::session::error::SessionError;

/// Unit in which the configured `expires` count is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiresIn {
    #[default]
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl ExpiresIn {
    /// Number of seconds in one unit
    #[must_use]
    pub fn seconds(self) -> u64 {
        match self {
            Self::Days => 86_400,
            Self::Hours => 3_600,
            Self::Minutes => 60,
            Self::Seconds => 1,
        }
    }

    /// Lifetime in seconds for `count` units, saturating on overflow
    #[must_use]
    pub fn to_seconds(self, count: u64) -> u64 {
        count.saturating_mul(self.seconds())
    }
}

/// `now + lifetime_seconds`
///
/// # Errors
///
/// Returns [`SessionError::ExpiryOutOfRange`] if the result is not representable
pub fn compute_expiry(now: DateTime<Utc>, lifetime_seconds: u64) -> Result<DateTime<Utc>, SessionError> {
    let seconds = i64::try_from(lifetime_seconds).map_err(|_| SessionError::ExpiryOutOfRange)?;
    let lifetime = Duration::try_seconds(seconds).ok_or(SessionError::ExpiryOutOfRange)?;
    now.checked_add_signed(lifetime)
        .ok_or(SessionError::ExpiryOutOfRange)
}

/// `expires - now`; negative once the session has lapsed
#[must_use]
pub fn remaining_lifetime(expires: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    expires.signed_duration_since(now)
}

#[must_use]
pub fn is_expired(expires: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    remaining_lifetime(expires, now) <= Duration::zero()
}
