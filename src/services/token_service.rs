use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ResetConfig;
use crate::errors::{AppError, Result};

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub purpose: String,
    pub exp: usize,
}

impl ResetClaims {
    pub fn new(email: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        ResetClaims {
            sub: email.to_string(),
            purpose: RESET_PURPOSE.to_string(),
            exp: (now + ttl).timestamp() as usize,
        }
    }
}

/// Mints and checks the signed capability that stands in for the login
/// session during a password reset. Holding a valid token for an email is
/// the whole authorization; expiry is the only revocation.
#[derive(Clone)]
pub struct ResetTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl ResetTokenService {
    pub fn new(config: &ResetConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_ttl: config.token_ttl,
        }
    }

    pub fn issue(&self, email: &str) -> Result<String> {
        self.issue_at(email, Utc::now())
    }

    // Split out so tests can pin the clock.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = ResetClaims::new(email, now, self.token_ttl);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::TokenCreation(e.to_string()))
    }

    /// Bad signature, expiry and wrong purpose all collapse into the same
    /// error so callers cannot tell which check failed.
    pub fn authenticate(&self, token: &str) -> Result<String> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<ResetClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidOrExpiredToken)?;

        if data.claims.purpose != RESET_PURPOSE {
            return Err(AppError::InvalidOrExpiredToken);
        }
        Ok(data.claims.sub)
    }
}
