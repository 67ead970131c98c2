//! Authentication service: registration and login
//!
//! Orchestrates the credential store, password hasher, and token issuer.
//! Each call is a stateless unit of work; the only shared state is the store
//! and the issuer's immutable signing key.

use std::sync::Arc;

use crate::{
    auth::{PasswordHasher, TokenIssuer},
    error::AppError,
    models::account::{AccountResponse, LoginRequest, RegisterRequest},
    models::user::NewUser,
    repository::{CredentialStore, StoreError},
};

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    token_issuer: Arc<TokenIssuer>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            store,
            token_issuer,
            hasher: PasswordHasher::new(),
        }
    }

    /// Register a new identity and issue its first session token.
    ///
    /// The existence check is a fast path to avoid hashing work for obvious
    /// duplicates; two concurrent registrations can both pass it. The store's
    /// uniqueness constraint decides the race, and its conflict is surfaced
    /// exactly like the fast-path rejection.
    pub async fn register(&self, req: RegisterRequest) -> Result<AccountResponse, AppError> {
        let username = normalize_username(&req.username);

        if self.store.exists_by_username(&username).await? {
            return Err(AppError::UsernameTaken);
        }

        let (digest, salt) = self.hasher.derive(req.password.as_bytes())?;

        let record = NewUser {
            username,
            password_digest: digest,
            password_salt: salt,
            known_as: req.known_as,
            profile: req.profile,
        };

        let user = match self.store.create(record).await {
            Ok(user) => user,
            Err(StoreError::Conflict) => {
                // Lost the race to a concurrent registration
                tracing::debug!("Registration conflict at insertion");
                return Err(AppError::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.token_issuer.issue(&user.id, &user.username)?;

        tracing::info!(username = %user.username, "Account registered");

        Ok(AccountResponse {
            username: user.username,
            token,
            known_as: user.known_as,
            photo_url: None,
        })
    }

    /// Authenticate an identity and issue a session token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller; both fail with `InvalidCredentials`.
    pub async fn login(&self, req: LoginRequest) -> Result<AccountResponse, AppError> {
        let username = normalize_username(&req.username);

        let user = self
            .store
            .find_by_username(&username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let verified = self.hasher.verify(
            req.password.as_bytes(),
            &user.password_salt,
            &user.password_digest,
        )?;

        if !verified {
            tracing::debug!(username = %user.username, "Password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.token_issuer.issue(&user.id, &user.username)?;
        let photo_url = user.main_photo_url();

        tracing::info!(username = %user.username, "Login succeeded");

        Ok(AccountResponse {
            username: user.username,
            token,
            known_as: user.known_as,
            photo_url,
        })
    }
}

/// Case-fold a requested username to its canonical form
fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("Ana"), "ana");
        assert_eq!(normalize_username("  ANA  "), "ana");
        assert_eq!(normalize_username("ana"), "ana");
        assert_eq!(normalize_username("Łukasz"), "łukasz");
    }
}
