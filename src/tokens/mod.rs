//! Refresh/access token pairs (HS256 JWTs).
//!
//! A refresh token is minted per login; access tokens are derived from a
//! validated refresh token and carry the same identity claims, so requests
//! can be authenticated without a database round-trip. Revocation lives
//! outside this module: handlers blacklist the refresh `jti` in Postgres and
//! check it before honoring the token again.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime: 5 minutes.
pub const ACCESS_TTL_SECONDS: i64 = 300;

/// Refresh token lifetime: 1 day.
pub const REFRESH_TTL_SECONDS: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Identity claims embedded in both tokens of a pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub token_type: TokenType,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Identity snapshot a token pair is bound to.
#[derive(Clone, Debug)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Covers bad signature, expiry, malformed input, and wrong token type.
    /// Collapsed on purpose so callers cannot tell which check failed.
    #[error("Token is invalid or expired")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenManager {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Mint a fresh refresh/access pair bound to `identity`.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let refresh_claims = self.claims(identity, TokenType::Refresh, now);
        let refresh = encode(&Header::default(), &refresh_claims, &self.encoding)?;
        let access = self.access_from_refresh(&refresh_claims)?;
        Ok(TokenPair { refresh, access })
    }

    /// Derive a short-lived access token from validated refresh claims.
    pub fn access_from_refresh(&self, refresh: &Claims) -> Result<String, TokenError> {
        if refresh.token_type != TokenType::Refresh {
            return Err(TokenError::Invalid);
        }
        let now = Utc::now().timestamp();
        let claims = Claims {
            token_type: TokenType::Access,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + ACCESS_TTL_SECONDS,
            ..refresh.clone()
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    pub fn decode_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    fn claims(&self, identity: &Identity, token_type: TokenType, now: i64) -> Claims {
        let ttl = match token_type {
            TokenType::Access => ACCESS_TTL_SECONDS,
            TokenType::Refresh => REFRESH_TTL_SECONDS,
        };
        Claims {
            sub: identity.user_id,
            email: identity.email.clone(),
            username: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            token_type,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + ttl,
        }
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.token_type != expected {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }
}
