//! Secret ring: ordered symmetric secrets, current one first
//!
//! Every entry is valid for decoding, only the first one is used for encoding.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::error::ConfigurationError;

/// Id assumed for cookie values that were written before id tagging existed
pub const LEGACY_SECRET_ID: u32 = 1;

/// A single `(id, secret)` pair
#[derive(Clone, PartialEq, Eq)]
pub struct SecretEntry {
    id: u32,
    secret: Vec<u8>,
}

impl SecretEntry {
    #[must_use]
    pub fn new(id: u32, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            secret: secret.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

// Never print key material.
impl fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEntry")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// What to do when a cookie names a secret id that the ring does not contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownSecretPolicy {
    /// Attempt decryption with the current secret. Safe because decryption
    /// still authenticates under the attempted key.
    #[default]
    UseCurrent,
    /// Treat the cookie as undecodable
    Reject,
}

/// How an id was resolved against the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The id names an entry of the ring
    Exact,
    /// The id was unknown and the current secret was substituted
    FellBackToCurrent,
}

/// Ordered, non-empty collection of secrets; element 0 is current
#[derive(Debug, Clone)]
pub struct SecretRing {
    entries: Vec<SecretEntry>,
}

impl SecretRing {
    /// Build a ring from entries in preference order
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `entries` is empty
    /// - any secret is empty
    /// - two entries share an id
    pub fn new(entries: Vec<SecretEntry>) -> Result<Self, ConfigurationError> {
        if entries.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.secret.is_empty() {
                return Err(ConfigurationError::EmptySecret(entry.id));
            }
            if !seen.insert(entry.id) {
                return Err(ConfigurationError::DuplicateSecretId(entry.id));
            }
        }

        Ok(Self { entries })
    }

    /// Ring holding a single secret under the legacy id
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty
    pub fn single(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigurationError> {
        Self::new(vec![SecretEntry::new(LEGACY_SECRET_ID, secret)])
    }

    /// The preferred secret, used for every encode
    #[must_use]
    pub fn current(&self) -> &SecretEntry {
        // Non-empty by construction
        &self.entries[0]
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&SecretEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Resolve a tagged id to the secret that should be attempted
    ///
    /// Returns `None` only when the id is unknown and `policy` is
    /// [`UnknownSecretPolicy::Reject`].
    #[must_use]
    pub fn resolve(
        &self,
        id: u64,
        policy: UnknownSecretPolicy,
    ) -> Option<(&SecretEntry, Resolution)> {
        let entry = u32::try_from(id).ok().and_then(|id| self.get(id));
        match (entry, policy) {
            (Some(entry), _) => Some((entry, Resolution::Exact)),
            (None, UnknownSecretPolicy::UseCurrent) => {
                Some((self.current(), Resolution::FellBackToCurrent))
            }
            (None, UnknownSecretPolicy::Reject) => None,
        }
    }

    #[must_use]
    pub fn is_current(&self, id: u32) -> bool {
        self.current().id == id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SecretEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> SecretRing {
        SecretRing::new(vec![
            SecretEntry::new(2, "new-secret"),
            SecretEntry::new(1, "old-secret"),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_entry_is_current() {
        let ring = ring();
        assert_eq!(ring.current().id(), 2);
        assert!(ring.is_current(2));
        assert!(!ring.is_current(1));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_empty_ring_is_rejected() {
        assert!(matches!(
            SecretRing::new(Vec::new()),
            Err(ConfigurationError::MissingSecret)
        ));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = SecretRing::new(vec![SecretEntry::new(3, "a"), SecretEntry::new(3, "b")]);
        assert!(matches!(
            result,
            Err(ConfigurationError::DuplicateSecretId(3))
        ));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(
            SecretRing::single(""),
            Err(ConfigurationError::EmptySecret(LEGACY_SECRET_ID))
        ));
    }

    #[test]
    fn test_resolve_known_and_unknown_ids() {
        let ring = ring();

        let (entry, resolution) = ring.resolve(1, UnknownSecretPolicy::UseCurrent).unwrap();
        assert_eq!(entry.secret(), b"old-secret");
        assert_eq!(resolution, Resolution::Exact);

        let (entry, resolution) = ring.resolve(99, UnknownSecretPolicy::UseCurrent).unwrap();
        assert_eq!(entry.id(), 2);
        assert_eq!(resolution, Resolution::FellBackToCurrent);

        assert!(ring.resolve(99, UnknownSecretPolicy::Reject).is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", SecretEntry::new(7, "hunter2"));
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("hunter2"));
    }
}
