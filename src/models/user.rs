//! Identity record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered identity. Immutable once created; password change/reset is
/// handled outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Case-normalized, globally unique
    pub username: String,

    /// Fixed-width Argon2id output
    #[serde(skip_serializing)]
    pub password_digest: Vec<u8>,

    /// Fixed-width random salt, unique per identity
    #[serde(skip_serializing)]
    pub password_salt: Vec<u8>,

    /// Display name
    pub known_as: String,

    /// Opaque profile metadata, passed through untouched
    pub profile: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,

    /// Photo collection, loaded alongside the record on lookup
    #[sqlx(skip)]
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl User {
    /// URL of the photo flagged as the member's main photo, if any
    pub fn main_photo_url(&self) -> Option<String> {
        self.photos.iter().find(|p| p.is_main).map(|p| p.url.clone())
    }
}

/// A photo reference in a member's collection
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub is_main: bool,
}

/// Identity record as handed to the store at registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_digest: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub known_as: String,
    pub profile: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_photos(photos: Vec<Photo>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            password_digest: vec![0u8; 64],
            password_salt: vec![0u8; 16],
            known_as: "Ana".to_string(),
            profile: None,
            created_at: Utc::now(),
            photos,
        }
    }

    #[test]
    fn test_main_photo_url_picks_flagged_photo() {
        let user = user_with_photos(vec![
            Photo {
                id: Uuid::new_v4(),
                url: "https://cdn.example.com/1.jpg".to_string(),
                is_main: false,
            },
            Photo {
                id: Uuid::new_v4(),
                url: "https://cdn.example.com/2.jpg".to_string(),
                is_main: true,
            },
        ]);

        assert_eq!(user.main_photo_url().as_deref(), Some("https://cdn.example.com/2.jpg"));
    }

    #[test]
    fn test_main_photo_url_none_without_flag() {
        let user = user_with_photos(vec![Photo {
            id: Uuid::new_v4(),
            url: "https://cdn.example.com/1.jpg".to_string(),
            is_main: false,
        }]);

        assert_eq!(user.main_photo_url(), None);

        let user = user_with_photos(vec![]);
        assert_eq!(user.main_photo_url(), None);
    }
}
