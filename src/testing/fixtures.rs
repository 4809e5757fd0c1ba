//! Test fixtures providing pre-built test objects

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::session::{SessionConfig, SessionData, SessionManager};
use crate::settings::SessionSettings;

use super::constants::{NEW_SECRET, OLD_SECRET, TEST_SECRET};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings with the single test secret
    #[must_use]
    pub fn settings() -> SessionSettings {
        SessionSettings::new(TEST_SECRET)
    }

    /// Normalized config with default options
    ///
    /// # Panics
    ///
    /// Panics if the fixture settings fail to normalize
    #[must_use]
    pub fn config() -> SessionConfig {
        crate::session::normalize(&Self::settings(), false).expect("fixture settings are valid")
    }

    /// Manager with the single test secret
    #[must_use]
    pub fn manager() -> SessionManager {
        SessionManager::new(Self::config())
    }

    /// Manager whose ring is `[{2, "new"}, {1, "old"}]`
    ///
    /// # Panics
    ///
    /// Panics if the fixture settings fail to normalize
    #[must_use]
    pub fn rotated_manager() -> SessionManager {
        let settings = SessionSettings::with_secrets([(2, NEW_SECRET), (1, OLD_SECRET)]).expires(7);
        SessionManager::from_settings(&settings, false).expect("fixture settings are valid")
    }

    /// Manager holding only the retired secret, as a deployment before rotation
    ///
    /// # Panics
    ///
    /// Panics if the fixture settings fail to normalize
    #[must_use]
    pub fn legacy_manager() -> SessionManager {
        let settings = SessionSettings::with_secrets([(1, OLD_SECRET)]);
        SessionManager::from_settings(&settings, false).expect("fixture settings are valid")
    }

    /// Standard payload
    #[must_use]
    pub fn payload() -> Value {
        json!({ "role": "admin" })
    }

    /// Expiry `seconds` from now (negative for the past)
    #[must_use]
    pub fn expires_in(seconds: i64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(seconds)
    }

    /// Encode `data` expiring at `expires` with the manager's current secret
    ///
    /// # Panics
    ///
    /// Panics if encoding fails
    pub async fn cookie_value<T: Serialize>(
        manager: &SessionManager,
        data: T,
        expires: DateTime<Utc>,
    ) -> String {
        manager
            .codec()
            .encode(&SessionData::new(data, expires), manager.config().secrets())
            .await
            .expect("fixture payload encodes")
    }
}
