// AES-256-GCM primitives used by the default session cipher

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Nonce size for AES-256-GCM encryption (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Encryption key size for AES-256 (256 bits)
pub const ENCRYPTION_KEY_SIZE: usize = 32;

/// Derive a 32-byte AES-256 key from secret material of any length
///
/// The secret is hashed with SHA-256, so short and long secrets both map to a
/// full-width key and distinct secrets map to distinct keys.
#[must_use]
pub fn derive_encryption_key(secret: &[u8]) -> [u8; ENCRYPTION_KEY_SIZE] {
    let digest = Sha256::digest(secret);
    let mut key = [0u8; ENCRYPTION_KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

/// Encrypt raw bytes using AES-256-GCM
///
/// # Returns
///
/// A Base64URL-encoded string containing the nonce + ciphertext
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - AES encryption fails
pub fn encrypt_bytes(plaintext: &[u8], key: &[u8]) -> Result<String> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow!("AES encryption failed: {e}"))?;

    // Combine nonce + ciphertext and encode as base64
    let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(&combined))
}

/// Decrypt a Base64URL nonce + ciphertext string using AES-256-GCM
///
/// # Errors
///
/// Returns an error if:
/// - Key length is invalid
/// - Base64 decoding fails
/// - Data length is invalid
/// - AES decryption fails (wrong key or tampered data)
pub fn decrypt_bytes(encrypted_data: &str, key: &[u8]) -> Result<Vec<u8>> {
    if key.len() != ENCRYPTION_KEY_SIZE {
        return Err(anyhow!(
            "Invalid key length: expected {} bytes, got {}",
            ENCRYPTION_KEY_SIZE,
            key.len()
        ));
    }

    let combined = general_purpose::URL_SAFE_NO_PAD
        .decode(encrypted_data)
        .context("Failed to decode base64 data")?;

    if combined.len() < NONCE_SIZE {
        return Err(anyhow!("Invalid data length"));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| anyhow!("AES decryption failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_keys_are_full_width_and_distinct() {
        let short = derive_encryption_key(b"a");
        let other = derive_encryption_key(b"b");
        assert_eq!(short.len(), ENCRYPTION_KEY_SIZE);
        assert_ne!(short, other);
        assert_eq!(short, derive_encryption_key(b"a"));
    }

    #[test]
    fn test_encrypt_decrypt_bytes() {
        let key = derive_encryption_key(b"test-secret");
        let encrypted = encrypt_bytes(b"{\"hello\":1}", &key).unwrap();
        assert!(!encrypted.contains('&'));
        assert_eq!(decrypt_bytes(&encrypted, &key).unwrap(), b"{\"hello\":1}");
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let key = derive_encryption_key(b"test-secret");
        let first = encrypt_bytes(b"same", &key).unwrap();
        let second = encrypt_bytes(b"same", &key).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = encrypt_bytes(b"payload", &derive_encryption_key(b"one")).unwrap();
        let result = decrypt_bytes(&encrypted, &derive_encryption_key(b"two"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_key_length() {
        assert!(encrypt_bytes(b"payload", b"short").is_err());
        assert!(decrypt_bytes("AAAA", b"short").is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        let key = derive_encryption_key(b"test-secret");
        assert!(decrypt_bytes("AAAA", &key).is_err());
        assert!(decrypt_bytes("not base64 !!", &key).is_err());
    }

    #[test]
    fn test_invalid_base64_reports_context() {
        let key = derive_encryption_key(b"test-secret");
        let err = decrypt_bytes("not base64 !!", &key).unwrap_err();
        assert!(format!("{err:#}").starts_with("Failed to decode base64 data"));
    }
}
