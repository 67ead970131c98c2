//! Persistence layer

pub mod user_store;

pub use user_store::{CredentialStore, PgUserStore, StoreError};
