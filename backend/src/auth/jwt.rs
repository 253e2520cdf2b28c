//! HS256 access tokens.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::api::{User, UserId, UserRole};

/// Default token lifetime: one hour.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: UserId, role: UserRole, expires_in_seconds: u64) -> Self {
        let now = Utc::now().timestamp().max(0) as usize;
        Self {
            sub: user_id.value(),
            role,
            iat: now,
            exp: now + expires_in_seconds as usize,
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId(self.sub)
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as usize;
        self.exp <= now
    }
}

/// Issues and validates access tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.create_token(&Claims::new(user.id, user.role, self.ttl_secs))
    }

    pub fn create_token(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Decode `token`, rejecting bad signatures and expired tokens.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
