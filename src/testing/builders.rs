//! Fluent builders for creating customizable test objects

use crate::session::{ExpiresIn, SessionConfig, SessionManager, UnknownSecretPolicy};
use crate::settings::{RollingSetting, SessionSettings};

use super::constants::TEST_SECRET;

/// Builder for customized session configurations
pub struct TestConfigBuilder {
    settings: SessionSettings,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    /// Start from the single test secret
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: SessionSettings::new(TEST_SECRET),
        }
    }

    /// Replace the secrets with a ring, current secret first
    #[must_use]
    pub fn secrets(mut self, secrets: &[(u32, &str)]) -> Self {
        let ring = SessionSettings::with_secrets(secrets.iter().copied());
        self.settings.secret = ring.secret;
        self
    }

    /// Lifetime in seconds
    #[must_use]
    pub fn expires_seconds(mut self, seconds: u64) -> Self {
        self.settings.expires = Some(seconds);
        self.settings.expires_in = Some(ExpiresIn::Seconds);
        self
    }

    #[must_use]
    pub fn rolling(mut self, enabled: bool) -> Self {
        self.settings.rolling = Some(RollingSetting::Enabled(enabled));
        self
    }

    #[must_use]
    pub fn rolling_percentage(mut self, percentage: f64) -> Self {
        self.settings.rolling = Some(RollingSetting::Percentage(percentage));
        self
    }

    #[must_use]
    pub fn unknown_secret(mut self, policy: UnknownSecretPolicy) -> Self {
        self.settings.unknown_secret = Some(policy);
        self
    }

    #[must_use]
    pub fn settings(self) -> SessionSettings {
        self.settings
    }

    /// # Panics
    ///
    /// Panics if the built settings fail to normalize
    #[must_use]
    pub fn build(self) -> SessionConfig {
        crate::session::normalize(&self.settings, false).expect("builder settings are valid")
    }

    #[must_use]
    pub fn manager(self) -> SessionManager {
        SessionManager::new(self.build())
    }
}
