//! Session token issuance
//!
//! Mints signed, time-bounded identity assertions (HS256 JWTs). The signing
//! key is loaded once at startup; a missing or malformed key is a startup
//! failure, never a per-request error. Verification of issued tokens is a
//! downstream concern; `decode` exists for those consumers and for tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::AppError};

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Subject username
    pub username: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

/// Issues signed session tokens from an immutable process-wide key
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_exp_secs: u64,
}

impl TokenIssuer {
    /// Create the issuer from config, checking the signing key up front
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // HS256 needs at least 32 bytes of key material
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_exp_secs: config.security.token_exp_secs,
        })
    }

    /// Issue a signed assertion for the given identity
    pub fn issue(&self, user_id: &Uuid, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_exp_secs as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            AppError::Internal(format!("Failed to encode session token: {}", e))
        })
    }

    /// Decode and check a token's signature and expiration
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        Ok(
            decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
                .map_err(|e| {
                    tracing::debug!("Token validation failed: {:?}", e);
                    AppError::InvalidCredentials
                })?
                .claims,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::from_env().unwrap();
        config.security.jwt_secret =
            Secret::new("test_secret_key_32_characters_long!".to_string());
        config.security.token_exp_secs = 604800;
        config
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = TokenIssuer::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(&user_id, "testuser").unwrap();
        let claims = issuer.decode(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "testuser");
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_secret_too_short_fails_at_startup() {
        let mut config = test_config();
        config.security.jwt_secret = Secret::new("short".to_string());

        let result = TokenIssuer::from_config(&config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let issuer = TokenIssuer::from_config(&test_config()).unwrap();
        let token = issuer.issue(&Uuid::new_v4(), "testuser").unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(issuer.decode(&tampered).is_err());
        assert!(issuer.decode("not-a-token").is_err());
    }

    #[test]
    fn test_token_signed_with_other_key_rejected() {
        let issuer = TokenIssuer::from_config(&test_config()).unwrap();

        let mut other_config = test_config();
        other_config.security.jwt_secret =
            Secret::new("another_secret_key_32_characters_x!".to_string());
        let other_issuer = TokenIssuer::from_config(&other_config).unwrap();

        let token = other_issuer.issue(&Uuid::new_v4(), "testuser").unwrap();
        assert!(issuer.decode(&token).is_err());
    }

    #[test]
    fn test_tokens_are_unique_per_issuance() {
        let issuer = TokenIssuer::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let t1 = issuer.issue(&user_id, "testuser").unwrap();
        let t2 = issuer.issue(&user_id, "testuser").unwrap();

        // jti differs even when issued within the same second
        assert_ne!(t1, t2);
    }
}
