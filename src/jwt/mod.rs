//! JWT token handling

use crate::config::JwtConfig;
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience stamped into every token this service issues
pub const TOKEN_AUDIENCE: &str = "jobboard-api";

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name at the time of issue
    pub name: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Validation with a 5 second leeway instead of the default 60 seconds
    fn strict_validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 5;
        v.set_audience(&[TOKEN_AUDIENCE]);
        v.set_issuer(&[&self.config.issuer]);
        v
    }

    /// Create a session token for a user
    pub fn create_token(&self, user_id: Uuid, name: &str) -> Result<String> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.config.lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "token lifetime {}s out of range",
                    self.config.lifetime_secs
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            iss: self.config.issuer.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// Verify signature, expiry, issuer and audience, then decode
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.strict_validation())?;
        Ok(token_data.claims)
    }
}
