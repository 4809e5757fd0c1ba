//! Normalized, immutable session configuration

use actix_web::cookie::SameSite;
use chrono::Utc;

use crate::session::error::ConfigurationError;
use crate::session::expiry::{compute_expiry, ExpiresIn};
use crate::session::rolling::RollingPolicy;
use crate::session::secrets::{SecretEntry, SecretRing, UnknownSecretPolicy};
use crate::settings::{RollingSetting, SameSiteSetting, SecretSetting, SessionSettings};

/// Default cookie name
pub const DEFAULT_COOKIE_NAME: &str = "kit.session";

/// Default lifetime, in `expires_in` units
pub const DEFAULT_EXPIRES: u64 = 7;

/// Attributes passed through to the outgoing cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
}

/// Fully defaulted configuration shared read-only by every request
#[derive(Debug, Clone)]
pub struct SessionConfig {
    key: String,
    expires: u64,
    expires_in: ExpiresIn,
    max_age_seconds: u64,
    cookie: CookieAttributes,
    rolling: RollingPolicy,
    secrets: SecretRing,
    unknown_secret: UnknownSecretPolicy,
}

impl SessionConfig {
    /// Cookie name
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Configured lifetime, counted in [`Self::expires_in`] units
    #[must_use]
    pub fn expires(&self) -> u64 {
        self.expires
    }

    #[must_use]
    pub fn expires_in(&self) -> ExpiresIn {
        self.expires_in
    }

    /// Configured lifetime in seconds
    #[must_use]
    pub fn max_age_seconds(&self) -> u64 {
        self.max_age_seconds
    }

    /// Lifetime in seconds for `count` configured units
    #[must_use]
    pub fn lifetime_seconds(&self, count: u64) -> u64 {
        self.expires_in.to_seconds(count)
    }

    #[must_use]
    pub fn cookie(&self) -> &CookieAttributes {
        &self.cookie
    }

    #[must_use]
    pub fn rolling(&self) -> RollingPolicy {
        self.rolling
    }

    #[must_use]
    pub fn secrets(&self) -> &SecretRing {
        &self.secrets
    }

    #[must_use]
    pub fn unknown_secret(&self) -> UnknownSecretPolicy {
        self.unknown_secret
    }
}

/// Turn loose settings into a canonical [`SessionConfig`]
///
/// `is_production` supplies the default for the cookie `secure` attribute.
///
/// # Errors
///
/// Returns an error if:
/// - no secret is configured, or a secret is empty
/// - secret ids are not unique
/// - the rolling percentage is outside `(0, 100]`
/// - the lifetime is zero, or too long to express as an expiry timestamp
pub fn normalize(
    settings: &SessionSettings,
    is_production: bool,
) -> Result<SessionConfig, ConfigurationError> {
    let secrets = match settings.secret.as_ref() {
        None => return Err(ConfigurationError::MissingSecret),
        Some(SecretSetting::Single(secret)) => SecretRing::single(secret.as_bytes())?,
        Some(SecretSetting::Ring(entries)) => SecretRing::new(
            entries
                .iter()
                .map(|entry| SecretEntry::new(entry.id, entry.secret.as_bytes()))
                .collect(),
        )?,
    };

    let expires = settings.expires.unwrap_or(DEFAULT_EXPIRES);
    if expires == 0 {
        return Err(ConfigurationError::ZeroLifetime);
    }
    let expires_in = settings.expires_in.unwrap_or_default();
    let max_age_seconds = expires_in.to_seconds(expires);
    if compute_expiry(Utc::now(), max_age_seconds).is_err() {
        return Err(ConfigurationError::LifetimeOutOfRange(max_age_seconds));
    }

    let rolling = match settings.rolling {
        None | Some(RollingSetting::Enabled(false)) => RollingPolicy::Disabled,
        Some(RollingSetting::Enabled(true)) => RollingPolicy::Always,
        Some(RollingSetting::Percentage(percentage)) => RollingPolicy::threshold(percentage)?,
    };

    let cookie = CookieAttributes {
        http_only: settings.cookie.http_only.unwrap_or(true),
        same_site: match settings.cookie.same_site {
            None | Some(SameSiteSetting::Lax) => SameSite::Lax,
            Some(SameSiteSetting::Strict) => SameSite::Strict,
            Some(SameSiteSetting::None) => SameSite::None,
        },
        path: settings.cookie.path.clone().unwrap_or_else(|| "/".to_string()),
        domain: settings.cookie.domain.clone(),
        secure: settings.cookie.secure.unwrap_or(is_production),
    };

    log::debug!(
        "Session config normalized: key={}, secrets={}, current_secret_id={}, rolling={:?}",
        settings.key.as_deref().unwrap_or(DEFAULT_COOKIE_NAME),
        secrets.len(),
        secrets.current().id(),
        rolling
    );

    Ok(SessionConfig {
        key: settings
            .key
            .clone()
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
        expires,
        expires_in,
        max_age_seconds,
        cookie,
        rolling,
        secrets,
        unknown_secret: settings.unknown_secret.unwrap_or_default(),
    })
}

impl TryFrom<&SessionSettings> for SessionConfig {
    type Error = ConfigurationError;

    /// Normalize using the process deployment flag for `secure`
    fn try_from(settings: &SessionSettings) -> Result<Self, Self::Error> {
        normalize(settings, crate::settings::is_production())
    }
}
