//! Per-request session handle
//!
//! A [`CookieSession`] is created already resolved (the incoming cookie has
//! been decoded, expiry checked, rotation and rolling refresh applied) and is
//! consumed by [`CookieSession::finalize`], which yields at most one outgoing
//! cookie. Handles are never shared between requests.

use std::future::Future;
use std::sync::Arc;

use actix_web::cookie::Cookie;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::session::codec::{DecodeOutcome, SessionCodec, SessionData};
use crate::session::config::SessionConfig;
use crate::session::cookie::{CookieDirective, CookieFactory};
use crate::session::error::SessionError;
use crate::session::expiry::compute_expiry;
use crate::session::rotation::should_re_encrypt;

/// Why an outgoing cookie must, or must not, be emitted for this request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// The decoded session had already expired
    pub invalid_date: bool,
    /// The cookie was decoded with a non-current secret (or a stale tag)
    pub should_re_encrypt: bool,
    /// The cookie has to be cleared on the client
    pub should_destroy: bool,
    /// A directive is pending
    pub should_send_to_client: bool,
}

/// Resolved state of the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No cookie, an undecodable cookie, or a destroyed session
    Empty,
    /// Valid, non-expired data
    Active,
    /// Decoded but expired
    Invalid,
}

/// Stateful session façade for one request/response cycle
#[derive(Debug)]
pub struct CookieSession<T> {
    config: Arc<SessionConfig>,
    codec: SessionCodec,
    /// Decoded or written payload; expired payloads are kept for inspection
    stored: Option<SessionData<T>>,
    expired: bool,
    flags: SessionFlags,
    directive: Option<CookieDirective>,
}

impl<T> CookieSession<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Resolve the incoming cookie value into a session handle
    ///
    /// Undecodable values never fail here: they resolve to an empty session
    /// with a pending destroy directive.
    ///
    /// # Errors
    ///
    /// Returns an error if re-encoding for rotation or rolling refresh fails
    pub async fn resolve(
        config: Arc<SessionConfig>,
        codec: SessionCodec,
        raw: Option<&str>,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            config,
            codec,
            stored: None,
            expired: false,
            flags: SessionFlags::default(),
            directive: None,
        };

        let Some(raw) = raw else {
            return Ok(session);
        };

        let now = Utc::now();
        let outcome = session
            .codec
            .decode::<T>(raw, session.config.secrets(), session.config.unknown_secret())
            .await;

        match outcome {
            DecodeOutcome::NoSession => {}
            DecodeOutcome::Failed(reason) => {
                log::warn!("Discarding undecodable session cookie: {reason}");
                session.destroy();
            }
            DecodeOutcome::Decoded(decoded) => {
                if decoded.data.is_expired(now) {
                    log::debug!("Session expired at {}, current time: {now}", decoded.data.expires);
                    session.flags.invalid_date = true;
                    session.expired = true;
                    session.stored = Some(decoded.data);
                    return Ok(session);
                }

                let expires = decoded.data.expires;
                session.stored = Some(decoded.data);

                if should_re_encrypt(session.config.secrets(), decoded.secret_id, decoded.tagged_id) {
                    log::debug!(
                        "Re-encrypting session from secret {} (tagged {}) to current secret {}",
                        decoded.secret_id,
                        decoded.tagged_id,
                        session.config.secrets().current().id()
                    );
                    session.flags.should_re_encrypt = true;
                    session.persist_active(now).await?;
                }

                if session
                    .config
                    .rolling()
                    .should_refresh(expires, now, session.config.max_age_seconds())
                {
                    log::debug!("Rolling refresh of session expiring at {expires}");
                    session.refresh_at(now, None).await?;
                }
            }
        }

        Ok(session)
    }

    /// Current payload, or `None` unless the session is active
    #[must_use]
    pub fn read(&self) -> Option<&SessionData<T>> {
        self.stored.as_ref().filter(|_| !self.expired)
    }

    /// Caller payload of an active session
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.read().map(|session| &session.data)
    }

    /// Decoded payload regardless of expiry
    #[must_use]
    pub fn decoded(&self) -> Option<&SessionData<T>> {
        self.stored.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match (&self.stored, self.expired) {
            (None, _) => SessionStatus::Empty,
            (Some(_), false) => SessionStatus::Active,
            (Some(_), true) => SessionStatus::Invalid,
        }
    }

    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the payload wholesale
    ///
    /// An active session keeps its remaining lifetime; otherwise the default
    /// lifetime applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded
    pub async fn set(&mut self, data: T) -> Result<&SessionData<T>, SessionError> {
        let now = Utc::now();
        let expires = match self.read() {
            Some(current) => current.expires,
            None => compute_expiry(now, self.config.max_age_seconds())?,
        };

        self.commit(SessionData::new(data, expires), now).await
    }

    /// Replace the payload with `f(current)`
    ///
    /// # Errors
    ///
    /// Returns an error if the new payload cannot be encoded
    pub async fn update<F>(&mut self, f: F) -> Result<&SessionData<T>, SessionError>
    where
        F: FnOnce(Option<T>) -> T,
    {
        let next = f(self.data().cloned());
        self.set(next).await
    }

    /// [`Self::update`] with an asynchronous transform
    ///
    /// # Errors
    ///
    /// Returns an error if the new payload cannot be encoded
    pub async fn update_async<F, Fut>(&mut self, f: F) -> Result<&SessionData<T>, SessionError>
    where
        F: FnOnce(Option<T>) -> Fut,
        Fut: Future<Output = T>,
    {
        let next = f(self.data().cloned()).await;
        self.set(next).await
    }

    /// Extend an active session's expiry
    ///
    /// `expires` overrides the configured lifetime, in the configured
    /// `expires_in` unit; an override of zero uses the configured lifetime. Returns `false` without side effects when no active
    /// session exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded
    pub async fn refresh(&mut self, expires: Option<u64>) -> Result<bool, SessionError> {
        self.refresh_at(Utc::now(), expires).await
    }

    /// Clear the payload and schedule the destroy directive; idempotent
    pub fn destroy(&mut self) -> bool {
        self.stored = None;
        self.expired = false;
        self.flags.should_destroy = true;
        self.flags.should_send_to_client = true;
        self.directive = Some(CookieDirective::Destroy);
        true
    }

    /// Pending outgoing directive, if any
    #[must_use]
    pub fn directive(&self) -> Option<&CookieDirective> {
        self.directive.as_ref()
    }

    /// Pending outgoing cookie, if any
    #[must_use]
    pub fn cookie(&self) -> Option<Cookie<'static>> {
        self.directive
            .as_ref()
            .map(|directive| CookieFactory::new(&self.config).build(directive))
    }

    /// Finish the request, yielding the cookie to attach to the response
    #[must_use]
    pub fn finalize(self) -> Option<Cookie<'static>> {
        self.cookie()
    }

    /// Finish the request, yielding a serialized `Set-Cookie` value
    #[must_use]
    pub fn finalize_header(self) -> Option<String> {
        self.finalize().map(|cookie| cookie.to_string())
    }

    async fn refresh_at(
        &mut self,
        now: DateTime<Utc>,
        expires: Option<u64>,
    ) -> Result<bool, SessionError> {
        let Some(current) = self.read() else {
            return Ok(false);
        };

        // Zero would expire the session on the spot
        let lifetime = expires
            .filter(|&count| count > 0)
            .map_or(self.config.max_age_seconds(), |count| {
                self.config.lifetime_seconds(count)
            });
        let refreshed = SessionData::new(current.data.clone(), compute_expiry(now, lifetime)?);

        self.commit(refreshed, now).await?;
        Ok(true)
    }

    /// Re-encode the active payload unchanged, keeping its expiry
    async fn persist_active(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if let Some(current) = self.read() {
            let value = self.codec.encode(current, self.config.secrets()).await?;
            let max_age_seconds = current.remaining_lifetime(now).num_seconds();
            self.schedule(value, max_age_seconds);
        }
        Ok(())
    }

    /// Encode `data`, then make it the active payload
    async fn commit(
        &mut self,
        data: SessionData<T>,
        now: DateTime<Utc>,
    ) -> Result<&SessionData<T>, SessionError> {
        let value = self.codec.encode(&data, self.config.secrets()).await?;
        let max_age_seconds = data.remaining_lifetime(now).num_seconds();

        self.schedule(value, max_age_seconds);
        self.flags.should_destroy = false;
        self.expired = false;

        Ok(self.stored.insert(data))
    }

    fn schedule(&mut self, value: String, max_age_seconds: i64) {
        self.flags.should_send_to_client = true;
        self.directive = Some(CookieDirective::Set {
            value,
            max_age_seconds,
        });
    }
}
