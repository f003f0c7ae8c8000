use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::VerifiedUserId;
use crate::error::{PolitemallError, Result, TokenKind};

/// Session token claims - the subject is the only thing we store
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Mints and verifies POLITEShop session tokens (HS256)
#[derive(Clone)]
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionTokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for an already-verified user.
    pub fn mint(&self, user_id: &VerifiedUserId) -> Result<String> {
        let claims = SessionClaims {
            sub: user_id.as_str().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PolitemallError::invalid_token(TokenKind::Session, e.to_string()))
    }

    /// Verify the signature and return the subject.
    pub fn verify(&self, token: &str) -> Result<VerifiedUserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["sub".to_string()]);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| PolitemallError::invalid_token(TokenKind::Session, e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(PolitemallError::invalid_token(TokenKind::Session, "empty sub claim"));
        }
        Ok(VerifiedUserId::new(claims.sub))
    }
}
