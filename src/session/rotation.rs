//! Secret rotation: migrate sessions decoded under a retired secret

use crate::session::secrets::SecretRing;

/// `true` when a decoded payload must be re-encoded under the current secret
///
/// `used_secret_id` is the id of the secret that actually decrypted the value,
/// `tagged_id` is what the cookie claimed. They differ when an unknown id fell
/// back to the current secret, in which case the stale tag is rewritten too.
#[must_use]
pub fn should_re_encrypt(ring: &SecretRing, used_secret_id: u32, tagged_id: u64) -> bool {
    !ring.is_current(used_secret_id) || u64::from(used_secret_id) != tagged_id
}
