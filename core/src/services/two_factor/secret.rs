//! At-rest encryption for TOTP secrets using AES-256-GCM.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::errors::{DomainError, DomainResult};

const NONCE_LEN: usize = 12;

/// Encrypts and decrypts TOTP secrets before they touch the durable store
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Derives a 256-bit key from the configured key material
    pub fn new(key_material: &str) -> Self {
        let digest = Sha256::digest(key_material.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypts a plaintext secret
    ///
    /// Output is base64 of `nonce || ciphertext` with a fresh random
    /// nonce per call.
    pub fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| DomainError::Internal {
                message: "Secret encryption failed".to_string(),
            })?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Decrypts a value produced by [`encrypt`](Self::encrypt)
    pub fn decrypt(&self, encoded: &str) -> DomainResult<String> {
        let combined = BASE64.decode(encoded).map_err(|_| DomainError::Internal {
            message: "Stored secret is not valid base64".to_string(),
        })?;
        if combined.len() <= NONCE_LEN {
            return Err(DomainError::Internal {
                message: "Stored secret is truncated".to_string(),
            });
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| DomainError::Internal {
                message: "Secret decryption failed".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|_| DomainError::Internal {
            message: "Decrypted secret is not valid UTF-8".to_string(),
        })
    }
}
