//! The encrypt/decrypt primitive behind the session codec
//!
//! The codec treats the cipher as a black box: bytes in, opaque string out,
//! and back again. Implementations may suspend (for example to call out to a
//! KMS), so the trait is async.

use async_trait::async_trait;

use crate::session::error::CipherError;
use crate::utils::crypto::{decrypt_bytes, derive_encryption_key, encrypt_bytes};

/// Symmetric encryption primitive used by the codec
///
/// `decrypt` must authenticate its input: a ciphertext produced under a
/// different secret, or altered in any way, has to fail rather than yield
/// different plaintext.
#[async_trait]
pub trait SessionCipher: Send + Sync {
    /// Encrypt `plaintext` under `secret`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot encrypt
    async fn encrypt(&self, plaintext: &[u8], secret: &[u8]) -> Result<String, CipherError>;

    /// Decrypt a value previously produced by `encrypt`
    ///
    /// # Errors
    ///
    /// Returns an error on a wrong secret, tampering, or malformed input
    async fn decrypt(&self, ciphertext: &str, secret: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// Default cipher: AES-256-GCM with a SHA-256 derived key and random nonce
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

#[async_trait]
impl SessionCipher for AesGcmCipher {
    async fn encrypt(&self, plaintext: &[u8], secret: &[u8]) -> Result<String, CipherError> {
        let key = derive_encryption_key(secret);
        encrypt_bytes(plaintext, &key).map_err(|e| CipherError::new(e.to_string()))
    }

    async fn decrypt(&self, ciphertext: &str, secret: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = derive_encryption_key(secret);
        decrypt_bytes(ciphertext, &key).map_err(|e| CipherError::new(e.to_string()))
    }
}
