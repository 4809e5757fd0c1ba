use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::session::expiry::ExpiresIn;
use crate::session::secrets::UnknownSecretPolicy;

/// Name of the settings file looked up by [`SessionSettings::load`]
pub const SETTINGS_FILE: &str = "Session.toml";

/// Loosely specified session configuration as a user writes it
///
/// Everything except `secret` is optional; [`crate::session::config::normalize`]
/// turns this into a fully defaulted [`crate::session::SessionConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    pub secret: Option<SecretSetting>,
    /// Cookie name
    pub key: Option<String>,
    /// Session lifetime, counted in `expires_in` units
    pub expires: Option<u64>,
    pub expires_in: Option<ExpiresIn>,
    #[serde(default)]
    pub cookie: CookieSettings,
    pub rolling: Option<RollingSetting>,
    pub unknown_secret: Option<UnknownSecretPolicy>,
}

/// A single secret (id 1) or an explicit ring, current secret first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretSetting {
    Single(String),
    Ring(Vec<SecretEntrySetting>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretEntrySetting {
    pub id: u32,
    pub secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieSettings {
    pub http_only: Option<bool>,
    pub same_site: Option<SameSiteSetting>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSiteSetting {
    Strict,
    Lax,
    None,
}

/// `rolling = true|false` or `rolling = <percentage>`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RollingSetting {
    Enabled(bool),
    Percentage(f64),
}

impl SessionSettings {
    /// Settings holding a single secret, everything else defaulted
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(SecretSetting::Single(secret.into())),
            ..Self::default()
        }
    }

    /// Settings holding a secret ring in preference order
    #[must_use]
    pub fn with_secrets<S: Into<String>>(secrets: impl IntoIterator<Item = (u32, S)>) -> Self {
        let ring = secrets
            .into_iter()
            .map(|(id, secret)| SecretEntrySetting {
                id,
                secret: secret.into(),
            })
            .collect();
        Self {
            secret: Some(SecretSetting::Ring(ring)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn expires(mut self, expires: u64) -> Self {
        self.expires = Some(expires);
        self
    }

    #[must_use]
    pub fn expires_in(mut self, unit: ExpiresIn) -> Self {
        self.expires_in = Some(unit);
        self
    }

    #[must_use]
    pub fn rolling(mut self, rolling: RollingSetting) -> Self {
        self.rolling = Some(rolling);
        self
    }

    #[must_use]
    pub fn unknown_secret(mut self, policy: UnknownSecretPolicy) -> Self {
        self.unknown_secret = Some(policy);
        self
    }

    #[must_use]
    pub fn cookie(mut self, cookie: CookieSettings) -> Self {
        self.cookie = cookie;
        self
    }

    /// Load settings from configuration files and environment variables
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables
    /// 2. `Session.toml` in `KIT_SESSION_CONFIG_DIR` (if specified and exists)
    /// 3. `Session.toml` in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        let mut settings = Self::default();

        let default_config_path = Path::new(SETTINGS_FILE);
        if default_config_path.exists() {
            settings = Self::from_file(default_config_path)?;
            log::info!("Loaded session settings from {}", default_config_path.display());
        }

        if let Ok(config_dir) = std::env::var("KIT_SESSION_CONFIG_DIR") {
            let override_path = Path::new(&config_dir).join(SETTINGS_FILE);
            if override_path.exists() {
                settings = Self::from_file(&override_path)?;
                log::info!("Overriding session settings from {}", override_path.display());
            } else {
                log::info!(
                    "KIT_SESSION_CONFIG_DIR set but no {SETTINGS_FILE} found at: {}",
                    override_path.display()
                );
            }
        }

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Parse settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&toml_content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse settings from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not describe session settings
    pub fn from_toml(toml_content: &str) -> Result<Self, basic_toml::Error> {
        basic_toml::from_str(toml_content)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("SESSION_SECRET") {
            if !secret.is_empty() {
                self.secret = Some(SecretSetting::Single(secret));
            }
        }
        if let Ok(key) = std::env::var("SESSION_KEY") {
            self.key = Some(key);
        }
        if let Ok(expires_str) = std::env::var("SESSION_EXPIRES") {
            if let Ok(expires) = expires_str.parse::<u64>() {
                self.expires = Some(expires);
            }
        }
        if let Ok(rolling_str) = std::env::var("SESSION_ROLLING") {
            if let Some(rolling) = parse_rolling(&rolling_str) {
                self.rolling = Some(rolling);
            }
        }
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                self.cookie.secure = Some(cookie_secure);
            }
        }
    }
}

/// Whether the process runs as a production deployment (`KIT_SESSION_ENV=production`)
///
/// Only the outer loading layer reads this; the normalizer receives it as a parameter.
#[must_use]
pub fn is_production() -> bool {
    std::env::var("KIT_SESSION_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"))
}

fn parse_rolling(value: &str) -> Option<RollingSetting> {
    let value = value.trim();
    value
        .parse::<bool>()
        .map(RollingSetting::Enabled)
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(RollingSetting::Percentage))
}
