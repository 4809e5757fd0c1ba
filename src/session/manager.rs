//! Session Manager - entry point binding config, codec and incoming cookies
//!
//! The manager is built once per process and shared read-only between
//! requests. Each request asks it for a fresh [`CookieSession`].

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::HttpRequest;
use serde::{de::DeserializeOwned, Serialize};

use crate::session::cipher::{AesGcmCipher, SessionCipher};
use crate::session::codec::SessionCodec;
use crate::session::config::{normalize, SessionConfig};
use crate::session::cookie::{extract_from_header, extract_from_request};
use crate::session::error::{ConfigurationError, SessionError};
use crate::session::handle::CookieSession;
use crate::settings::SessionSettings;

/// Anything the session cookie value can be looked up in
pub trait CookieSource {
    /// Value of the cookie called `name`, if present
    fn cookie_value(&self, name: &str) -> Option<String>;
}

impl CookieSource for HttpRequest {
    fn cookie_value(&self, name: &str) -> Option<String> {
        extract_from_request(self, name)
    }
}

/// A raw `Cookie` request header
#[derive(Debug, Clone, Copy)]
pub struct CookieHeader<'a>(pub &'a str);

impl CookieSource for CookieHeader<'_> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        extract_from_header(self.0, name)
    }
}

/// Already parsed cookies keyed by name
impl CookieSource for HashMap<String, String> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Session Manager for stateless encrypted cookie sessions
#[derive(Debug, Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    codec: SessionCodec,
}

impl SessionManager {
    /// Create a manager using the default AES-256-GCM cipher
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_cipher(config, Arc::new(AesGcmCipher))
    }

    /// Create a manager with a custom cipher backend
    #[must_use]
    pub fn with_cipher(config: SessionConfig, cipher: Arc<dyn SessionCipher>) -> Self {
        Self {
            config: Arc::new(config),
            codec: SessionCodec::new(cipher),
        }
    }

    /// Normalize `settings` and create a manager
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid (for example, no secret)
    pub fn from_settings(
        settings: &SessionSettings,
        is_production: bool,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(normalize(settings, is_production)?))
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Resolve the session carried by an incoming request
    ///
    /// # Errors
    ///
    /// Returns an error if rotation or rolling refresh cannot re-encode the session
    pub async fn load<T>(&self, req: &HttpRequest) -> Result<CookieSession<T>, SessionError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.load_from(req).await
    }

    /// Resolve the session from any cookie source
    ///
    /// # Errors
    ///
    /// Returns an error if rotation or rolling refresh cannot re-encode the session
    pub async fn load_from<T, S>(&self, source: &S) -> Result<CookieSession<T>, SessionError>
    where
        T: Serialize + DeserializeOwned + Clone,
        S: CookieSource + ?Sized,
    {
        let value = source.cookie_value(self.config.key());
        self.load_value(value.as_deref()).await
    }

    /// Resolve the session from a raw `Cookie` header
    ///
    /// # Errors
    ///
    /// Returns an error if rotation or rolling refresh cannot re-encode the session
    pub async fn load_from_header<T>(
        &self,
        cookie_header: Option<&str>,
    ) -> Result<CookieSession<T>, SessionError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        match cookie_header {
            Some(header) => self.load_from(&CookieHeader(header)).await,
            None => self.load_value(None).await,
        }
    }

    /// Resolve the session from an already isolated cookie value
    ///
    /// # Errors
    ///
    /// Returns an error if rotation or rolling refresh cannot re-encode the session
    pub async fn load_value<T>(&self, value: Option<&str>) -> Result<CookieSession<T>, SessionError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        CookieSession::resolve(Arc::clone(&self.config), self.codec.clone(), value).await
    }
}
