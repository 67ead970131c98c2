//! Password digest derivation and verification using Argon2id
//!
//! Digests and salts are stored as separate fixed-width byte columns, so the
//! hasher works on raw output rather than PHC strings. Verification compares
//! digests in constant time; it must never short-circuit on the first
//! differing byte.

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::Output;
use rand::{rngs::OsRng, RngCore};

use crate::{config::AppConfig, error::AppError};

/// Digest width in bytes (512-bit Argon2id output)
pub const DIGEST_LEN: usize = 64;
/// Salt width in bytes
pub const SALT_LEN: usize = 16;

/// Password hasher with fixed parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params =
            Params::new(65536, 3, 4, Some(DIGEST_LEN)).expect("Invalid Argon2 params");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Derive a digest from a password with a fresh random salt.
    /// Returns `(digest, salt)`; the salt is never reused across calls.
    pub fn derive(&self, password: &[u8]) -> Result<(Vec<u8>, Vec<u8>), AppError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut digest = [0u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(password, &salt, &mut digest)
            .map_err(|e| {
                tracing::error!("Failed to derive password digest: {:?}", e);
                AppError::Internal(format!("Failed to derive password digest: {}", e))
            })?;

        Ok((digest.to_vec(), salt.to_vec()))
    }

    /// Recompute the digest from `password` and `salt` and compare it against
    /// `expected` in constant time.
    pub fn verify(
        &self,
        password: &[u8],
        salt: &[u8],
        expected: &[u8],
    ) -> Result<bool, AppError> {
        let mut computed = [0u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(password, salt, &mut computed)
            .map_err(|e| {
                tracing::debug!("Failed to recompute password digest: {:?}", e);
                AppError::Internal(format!("Failed to recompute password digest: {}", e))
            })?;

        // A stored digest of the wrong width can never match; reject it
        // without touching the comparison path.
        let expected = match Output::new(expected) {
            Ok(output) => output,
            Err(_) => return Ok(false),
        };
        let computed = Output::new(&computed)
            .map_err(|e| AppError::Internal(format!("Digest encoding error: {}", e)))?;

        // Output equality is constant time with respect to digest content
        Ok(computed == expected)
    }

    /// Validate password against the configured policy
    pub fn validate_password_policy(password: &str, config: &AppConfig) -> Result<(), AppError> {
        let policy = &config.security;

        if password.len() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::Validation(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Password must contain at least one digit".to_string(),
            ));
        }

        if policy.password_require_special {
            let has_special = password.chars().any(|c| !c.is_alphanumeric());
            if !has_special {
                return Err(AppError::Validation(
                    "Password must contain at least one special character".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
