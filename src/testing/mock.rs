//! Cipher fakes for isolated testing of failure and async paths

use async_trait::async_trait;

use crate::session::{AesGcmCipher, CipherError, SessionCipher};

/// AES-GCM cipher that can be told to fail either direction
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCipher {
    pub fail_encrypt: bool,
    pub fail_decrypt: bool,
}

impl FailingCipher {
    /// Decrypts normally, refuses to encrypt
    #[must_use]
    pub fn encrypt_only() -> Self {
        Self {
            fail_encrypt: true,
            fail_decrypt: false,
        }
    }
}

#[async_trait]
impl SessionCipher for FailingCipher {
    async fn encrypt(&self, plaintext: &[u8], secret: &[u8]) -> Result<String, CipherError> {
        if self.fail_encrypt {
            return Err(CipherError::new("encryption backend unavailable"));
        }
        AesGcmCipher.encrypt(plaintext, secret).await
    }

    async fn decrypt(&self, ciphertext: &str, secret: &[u8]) -> Result<Vec<u8>, CipherError> {
        if self.fail_decrypt {
            return Err(CipherError::new("decryption backend unavailable"));
        }
        AesGcmCipher.decrypt(ciphertext, secret).await
    }
}

/// AES-GCM cipher that suspends before every operation, like a remote KMS
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldingCipher;

#[async_trait]
impl SessionCipher for YieldingCipher {
    async fn encrypt(&self, plaintext: &[u8], secret: &[u8]) -> Result<String, CipherError> {
        tokio::task::yield_now().await;
        AesGcmCipher.encrypt(plaintext, secret).await
    }

    async fn decrypt(&self, ciphertext: &str, secret: &[u8]) -> Result<Vec<u8>, CipherError> {
        tokio::task::yield_now().await;
        AesGcmCipher.decrypt(ciphertext, secret).await
    }
}
