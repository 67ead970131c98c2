//! Shared test helpers
//! Provides a test configuration and in-memory credential store doubles

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::Secret;
use uuid::Uuid;

use mingle_service::{
    auth::TokenIssuer,
    config::AppConfig,
    middleware::AppState,
    models::user::{NewUser, Photo, User},
    repository::{CredentialStore, StoreError},
    services::AuthService,
};

/// Create a test configuration
pub fn create_test_config() -> AppConfig {
    let mut config = AppConfig::from_env().expect("default config should load");
    config.security.jwt_secret =
        Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string());
    config.security.token_exp_secs = 3600;
    config
}

/// In-memory credential store, keyed by normalized username.
/// Enforces the uniqueness invariant at insertion, like the real store's
/// unique index does.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    offline: AtomicBool,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store outage: every operation fails with `Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Attach a photo to a stored user
    pub fn add_photo(&self, username: &str, url: &str, is_main: bool) {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(username).expect("user should exist");
        user.photos.push(Photo {
            id: Uuid::new_v4(),
            url: url.to_string(),
            is_main,
        });
    }

    /// Stored id for a username, for asserting token claims
    pub fn user_id(&self, username: &str) -> Option<Uuid> {
        self.users.lock().unwrap().get(username).map(|u| u.id)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().contains_key(username))
    }

    async fn create(&self, record: NewUser) -> Result<User, StoreError> {
        self.check_online()?;
        let mut users = self.users.lock().unwrap();

        if users.contains_key(&record.username) {
            return Err(StoreError::Conflict);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: record.username.clone(),
            password_digest: record.password_digest,
            password_salt: record.password_salt,
            known_as: record.known_as,
            profile: record.profile,
            created_at: Utc::now(),
            photos: vec![],
        };

        users.insert(record.username, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().get(username).cloned())
    }
}

/// Store double that never sees the registration coming: the existence
/// check reports false, so the uniqueness decision falls to `create`.
pub struct RacingStore {
    inner: InMemoryUserStore,
}

impl RacingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryUserStore::new(),
        }
    }
}

#[async_trait]
impl CredentialStore for RacingStore {
    async fn exists_by_username(&self, _username: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn create(&self, record: NewUser) -> Result<User, StoreError> {
        self.inner.create(record).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_by_username(username).await
    }
}

/// Build an auth service over the given store
pub fn create_auth_service(store: Arc<dyn CredentialStore>) -> AuthService {
    let config = create_test_config();
    let token_issuer =
        Arc::new(TokenIssuer::from_config(&config).expect("token issuer should build"));
    AuthService::new(store, token_issuer)
}

/// Build full application state over an in-memory store
pub fn create_test_state(store: Arc<InMemoryUserStore>) -> Arc<AppState> {
    let config = create_test_config();
    let auth_service = Arc::new(create_auth_service(store));

    Arc::new(AppState {
        config,
        auth_service,
    })
}

/// Token issuer matching the test config, for decoding issued tokens
pub fn create_test_issuer() -> TokenIssuer {
    TokenIssuer::from_config(&create_test_config()).expect("token issuer should build")
}
