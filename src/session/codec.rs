//! Session codec: payload + expiry <-> single tagged cookie value
//!
//! Wire format: `<ciphertext>&id=<secret id>`. Values without the `&id=`
//! segment predate tagging and are read as id 1.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::session::cipher::SessionCipher;
use crate::session::error::{CipherError, SessionError};
use crate::session::expiry;
use crate::session::secrets::{Resolution, SecretRing, UnknownSecretPolicy, LEGACY_SECRET_ID};

/// Separates the ciphertext from the secret id tag
pub const ID_MARKER: &str = "&id=";

/// Cookie value meaning "destroyed / no session"
pub const DESTROY_SENTINEL: &str = "0";

/// Caller payload plus the reserved expiry timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData<T> {
    pub data: T,
    pub expires: DateTime<Utc>,
}

impl<T> SessionData<T> {
    #[must_use]
    pub fn new(data: T, expires: DateTime<Utc>) -> Self {
        Self { data, expires }
    }

    /// Time left before expiry, negative once lapsed
    #[must_use]
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        expiry::remaining_lifetime(self.expires, now)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        expiry::is_expired(self.expires, now)
    }

    /// [`Self::is_expired`] evaluated against the current clock
    #[must_use]
    pub fn is_expired_now(&self) -> bool {
        self.is_expired(Utc::now())
    }
}

/// Why a cookie value could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum DecodeFailure {
    #[error("malformed secret id tag {0:?}")]
    MalformedId(String),

    #[error("unknown secret id {0}")]
    UnknownSecret(u64),

    #[error("decryption failed: {0}")]
    Decrypt(#[source] CipherError),

    #[error("invalid session payload: {0}")]
    Payload(#[source] serde_json::Error),
}

/// A successfully decoded cookie value
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub data: SessionData<T>,
    /// Id of the secret that decrypted the value
    pub secret_id: u32,
    /// Id the cookie value was tagged with; may lie outside the `u32` id space
    pub tagged_id: u64,
}

/// Result of decoding an incoming cookie value
#[derive(Debug)]
pub enum DecodeOutcome<T> {
    /// No cookie, an empty value, or the destroy sentinel
    NoSession,
    Decoded(Decoded<T>),
    /// Never surfaced as an error; the handle destroys the session instead
    Failed(DecodeFailure),
}

/// Split a raw cookie value into ciphertext and (possibly absent) id tag
fn split_value(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once(ID_MARKER) {
        Some((ciphertext, id)) => (ciphertext, Some(id)),
        None => (raw, None),
    }
}

/// Encodes and decodes session payloads with a pluggable cipher
#[derive(Clone)]
pub struct SessionCodec {
    cipher: Arc<dyn SessionCipher>,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec").finish_non_exhaustive()
    }
}

impl SessionCodec {
    #[must_use]
    pub fn new(cipher: Arc<dyn SessionCipher>) -> Self {
        Self { cipher }
    }

    /// Encrypt `data` with the ring's current secret and tag it with its id
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or the cipher fails
    pub async fn encode<T: Serialize>(
        &self,
        data: &SessionData<T>,
        ring: &SecretRing,
    ) -> Result<String, SessionError> {
        let current = ring.current();
        let plaintext = serde_json::to_vec(data)?;
        let ciphertext = self
            .cipher
            .encrypt(&plaintext, current.secret())
            .await
            .map_err(SessionError::Encryption)?;

        Ok(format!("{ciphertext}{ID_MARKER}{}", current.id()))
    }

    /// Decode a raw cookie value against the ring
    pub async fn decode<T: DeserializeOwned>(
        &self,
        raw: &str,
        ring: &SecretRing,
        policy: UnknownSecretPolicy,
    ) -> DecodeOutcome<T> {
        if raw.is_empty() || raw == DESTROY_SENTINEL {
            return DecodeOutcome::NoSession;
        }

        let (ciphertext, id) = split_value(raw);
        if ciphertext.is_empty() {
            return DecodeOutcome::NoSession;
        }

        let tagged_id = match id {
            None => u64::from(LEGACY_SECRET_ID),
            Some(id) => match id.parse::<u64>() {
                Ok(id) => id,
                Err(_) => return DecodeOutcome::Failed(DecodeFailure::MalformedId(id.to_string())),
            },
        };

        let Some((entry, resolution)) = ring.resolve(tagged_id, policy) else {
            return DecodeOutcome::Failed(DecodeFailure::UnknownSecret(tagged_id));
        };
        if resolution == Resolution::FellBackToCurrent {
            log::debug!(
                "Cookie tagged with unknown secret id {tagged_id}, attempting current secret {}",
                entry.id()
            );
        }

        let plaintext = match self.cipher.decrypt(ciphertext, entry.secret()).await {
            Ok(plaintext) => plaintext,
            Err(e) => return DecodeOutcome::Failed(DecodeFailure::Decrypt(e)),
        };

        match serde_json::from_slice::<SessionData<T>>(&plaintext) {
            Ok(data) => DecodeOutcome::Decoded(Decoded {
                data,
                secret_id: entry.id(),
                tagged_id,
            }),
            Err(e) => DecodeOutcome::Failed(DecodeFailure::Payload(e)),
        }
    }
}
