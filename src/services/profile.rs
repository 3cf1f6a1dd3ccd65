//! User profiles keyed by email, with find-or-create semantics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::password::{hash_password, unusable_password_hash, verify_password};
use crate::db::models::{username_from_email, Profile, ProfileUpdate};
use crate::db::store::UserStore;
use crate::error::AppError;

pub const BIO_MAX_CHARS: usize = 500;
pub const MIN_NEW_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Stored profile, or a default one derived from the email if none was saved.
    pub async fn get_profile(&self, email: &str) -> Result<(Profile, bool), AppError> {
        require_email(email)?;

        let user = self
            .users
            .find_user_by_email(email)
            .await
            .map_err(|e| AppError::from_store("Error fetching profile", e))?;

        Ok(match user {
            Some(user) => (Profile::from(user), true),
            None => (Profile::default_for(email), false),
        })
    }

    /// Apply the present fields, creating the user first if needed.
    pub async fn update_profile(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<Profile, AppError> {
        require_email(email)?;

        if let Some(bio) = &update.bio {
            if bio.chars().count() > BIO_MAX_CHARS {
                return Err(AppError::validation(format!(
                    "Bio must be less than {} characters",
                    BIO_MAX_CHARS
                )));
            }
        }

        let placeholder_hash = unusable_password_hash();

        let profile = self
            .users
            .upsert_profile(
                email,
                &username_from_email(email),
                &placeholder_hash,
                &update,
            )
            .await
            .map_err(|e| AppError::from_store("Error updating profile", e))?;

        tracing::info!(email = %email, "profile updated");
        Ok(profile)
    }

    pub async fn update_password(
        &self,
        email: &str,
        change: PasswordChange,
    ) -> Result<(), AppError> {
        require_email(email)?;

        if change.current_password.is_empty() || change.new_password.is_empty() {
            return Err(AppError::validation(
                "Current password and new password are required",
            ));
        }

        if change.new_password.chars().count() < MIN_NEW_PASSWORD_CHARS {
            return Err(AppError::validation(format!(
                "New password must be at least {} characters",
                MIN_NEW_PASSWORD_CHARS
            )));
        }

        let user = self
            .users
            .find_user_by_email(email)
            .await
            .map_err(|e| AppError::from_store("Error updating password", e))?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !verify_password(change.current_password, user.password_hash).await {
            tracing::warn!(email = %email, "password change with wrong current password");
            return Err(AppError::Auth("Current password is incorrect".to_string()));
        }

        let new_hash = hash_password(change.new_password, self.bcrypt_cost).await?;
        let updated = self
            .users
            .set_password_hash(email, &new_hash)
            .await
            .map_err(|e| AppError::from_store("Error updating password", e))?;
        if !updated {
            return Err(AppError::not_found("User not found"));
        }

        tracing::info!(email = %email, "password updated");
        Ok(())
    }
}

fn require_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::NewUser;

    fn service(store: Arc<MemoryStore>) -> ProfileService {
        ProfileService::new(store, 4)
    }

    async fn seed_user(store: &MemoryStore, email: &str, password: &str) {
        store
            .insert_user(NewUser {
                username: "seeded".to_string(),
                email: email.to_string(),
                password_hash: bcrypt::hash(password, 4).unwrap(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_profile_without_user_is_default() {
        let profiles = service(Arc::new(MemoryStore::new()));
        let (profile, stored) = profiles.get_profile("alice@x.com").await.unwrap();
        assert!(!stored);
        assert_eq!(profile, Profile::default_for("alice@x.com"));
    }

    #[tokio::test]
    async fn test_get_profile_does_not_create_user() {
        let store = Arc::new(MemoryStore::new());
        service(store.clone())
            .get_profile("alice@x.com")
            .await
            .unwrap();
        assert!(store.user("alice@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_creates_missing_user_with_placeholder_password() {
        let store = Arc::new(MemoryStore::new());
        let profiles = service(store.clone());

        let update = ProfileUpdate {
            country: Some("Peru".to_string()),
            ..Default::default()
        };
        let profile = profiles.update_profile("dana@x.com", update).await.unwrap();
        assert_eq!(profile.username, "dana");
        assert_eq!(profile.country, "Peru");

        let stored = store.user("dana@x.com").await.unwrap();
        assert!(stored.password_hash.starts_with('!'));
        assert!(!verify_password(String::new(), stored.password_hash).await);
    }

    #[tokio::test]
    async fn test_update_profile_is_partial() {
        let store = Arc::new(MemoryStore::new());
        let profiles = service(store.clone());

        profiles
            .update_profile(
                "erin@x.com",
                ProfileUpdate {
                    phone: Some("123".to_string()),
                    occupation: Some("Engineer".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let profile = profiles
            .update_profile(
                "erin@x.com",
                ProfileUpdate {
                    phone: Some("456".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.phone, "456");
        assert_eq!(profile.occupation, "Engineer");
    }

    #[tokio::test]
    async fn test_update_profile_keeps_password_of_existing_user() {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store, "fay@x.com", "secret1").await;

        service(store.clone())
            .update_profile(
                "fay@x.com",
                ProfileUpdate {
                    username: Some("fay".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = store.user("fay@x.com").await.unwrap();
        assert_eq!(stored.username, "fay");
        assert!(bcrypt::verify("secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_long_bio_without_mutation() {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store, "gil@x.com", "secret1").await;

        let err = service(store.clone())
            .update_profile(
                "gil@x.com",
                ProfileUpdate {
                    bio: Some("x".repeat(501)),
                    phone: Some("999".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = store.user("gil@x.com").await.unwrap();
        assert_eq!(stored.bio, "");
        assert_eq!(stored.phone, "");
    }

    #[tokio::test]
    async fn test_update_profile_accepts_bio_at_limit() {
        let profiles = service(Arc::new(MemoryStore::new()));
        let profile = profiles
            .update_profile(
                "hal@x.com",
                ProfileUpdate {
                    bio: Some("é".repeat(500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.bio.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_update_password_success() {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store, "ivy@x.com", "secret1").await;

        service(store.clone())
            .update_password(
                "ivy@x.com",
                PasswordChange {
                    current_password: "secret1".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = store.user("ivy@x.com").await.unwrap();
        assert!(bcrypt::verify("secret2", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_password_wrong_current_leaves_hash_unchanged() {
        let store = Arc::new(MemoryStore::new());
        seed_user(&store, "jo@x.com", "secret1").await;
        let before = store.user("jo@x.com").await.unwrap().password_hash;

        let err = service(store.clone())
            .update_password(
                "jo@x.com",
                PasswordChange {
                    current_password: "nope".to_string(),
                    new_password: "secret2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));

        let after = store.user("jo@x.com").await.unwrap().password_hash;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_password_validation_and_missing_user() {
        let profiles = service(Arc::new(MemoryStore::new()));

        let short = profiles
            .update_password(
                "kim@x.com",
                PasswordChange {
                    current_password: "secret1".to_string(),
                    new_password: "12345".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(short, AppError::Validation(_)));

        let missing = profiles
            .update_password(
                "kim@x.com",
                PasswordChange {
                    current_password: "secret1".to_string(),
                    new_password: "123456".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }
}
