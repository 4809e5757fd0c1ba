//! Rolling (sliding-window) refresh decisions

use chrono::{DateTime, Utc};

use crate::session::error::ConfigurationError;
use crate::session::expiry::remaining_lifetime;

/// When an otherwise valid session gets its expiry pushed forward
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RollingPolicy {
    /// Never refresh automatically
    #[default]
    Disabled,
    /// Refresh on every request that carries a session
    Always,
    /// Refresh once remaining lifetime drops below this share (in percent)
    /// of the configured lifetime
    Threshold(f64),
}

impl RollingPolicy {
    /// Validated percentage policy
    ///
    /// # Errors
    ///
    /// Returns an error if `percentage` is not within `(0, 100]`
    pub fn threshold(percentage: f64) -> Result<Self, ConfigurationError> {
        if percentage.is_finite() && percentage > 0.0 && percentage <= 100.0 {
            Ok(Self::Threshold(percentage))
        } else {
            Err(ConfigurationError::InvalidRolling(percentage))
        }
    }

    /// Decide whether a non-expired session should be refreshed
    #[must_use]
    pub fn should_refresh(
        self,
        expires: DateTime<Utc>,
        now: DateTime<Utc>,
        max_age_seconds: u64,
    ) -> bool {
        match self {
            Self::Disabled => false,
            Self::Always => true,
            Self::Threshold(percentage) => {
                #[allow(clippy::cast_precision_loss)]
                let threshold_ms = percentage / 100.0 * (max_age_seconds as f64) * 1000.0;
                #[allow(clippy::cast_precision_loss)]
                let remaining_ms = remaining_lifetime(expires, now).num_milliseconds() as f64;
                remaining_ms < threshold_ms
            }
        }
    }
}
