//! JWT signing seam.
//!
//! Symmetric HS256 in this phase. Asymmetric signing slots in by adding
//! a second constructor here; claim shapes and every caller stay
//! unchanged.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};

/// Signs and verifies JWT payloads
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    header: Header,
}

impl TokenSigner {
    /// Creates an HS256 signer from a shared secret
    ///
    /// Verification always checks signature, expiry, and issuer; there
    /// is no unauthenticated fast path.
    pub fn hs256(secret: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            header: Header::new(Algorithm::HS256),
        }
    }

    /// Encodes and signs a claims payload
    pub fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// Verifies a token and returns its claims
    ///
    /// # Returns
    /// * `Err(TokenError::Expired)` - Past expiry
    /// * `Err(TokenError::Invalid)` - Bad signature, malformed structure,
    ///   or issuer mismatch
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
                    DomainError::Token(TokenError::Expired)
                } else {
                    DomainError::Token(TokenError::Invalid)
                }
            })
    }
}
