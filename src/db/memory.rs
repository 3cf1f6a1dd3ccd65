//! In-memory store backing the unit tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    HistoryEntry, Level, NewUser, Profile, ProfileUpdate, Resource, Subcategories, UserRecord,
};
use super::store::{
    HealthProbe, HistoryStore, ResourceStore, StoreError, StoreResult, UpsertOutcome, UserStore,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    resources: Vec<Resource>,
    history: Vec<HistoryEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user(&self, email: &str) -> Option<UserRecord> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn resources(&self) -> Vec<Resource> {
        self.tables.read().await.resources.clone()
    }
}

/// Strictly increasing timestamps so ordering by creation time is deterministic.
fn next_timestamp<'a>(
    existing: impl Iterator<Item = &'a chrono::DateTime<Utc>>,
) -> chrono::DateTime<Utc> {
    let now = Utc::now();
    match existing.max() {
        Some(last) if *last >= now => *last + Duration::microseconds(1),
        _ => now,
    }
}

fn new_user_record(
    username: String,
    email: String,
    password_hash: String,
    created_at: chrono::DateTime<Utc>,
) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash,
        phone: String::new(),
        country: String::new(),
        education: String::new(),
        profile_photo: String::new(),
        bio: String::new(),
        occupation: String::new(),
        date_of_birth: String::new(),
        linkedin_url: String::new(),
        github_url: String::new(),
        portfolio_url: String::new(),
        created_at,
        updated_at: created_at,
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.user(email).await)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("User with this email".to_string()));
        }
        let created_at = next_timestamp(tables.users.iter().map(|u| &u.created_at));
        let record = new_user_record(user.username, user.email, user.password_hash, created_at);
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn upsert_profile(
        &self,
        email: &str,
        default_username: &str,
        placeholder_hash: &str,
        update: &ProfileUpdate,
    ) -> StoreResult<Profile> {
        let mut tables = self.tables.write().await;

        let index = match tables.users.iter().position(|u| u.email == email) {
            Some(index) => index,
            None => {
                let created_at = next_timestamp(tables.users.iter().map(|u| &u.created_at));
                tables.users.push(new_user_record(
                    default_username.to_string(),
                    email.to_string(),
                    placeholder_hash.to_string(),
                    created_at,
                ));
                tables.users.len() - 1
            }
        };

        let user = &mut tables.users[index];
        let mut profile = Profile::from(user.clone());
        update.apply_to(&mut profile);

        user.username = profile.username.clone();
        user.phone = profile.phone.clone();
        user.country = profile.country.clone();
        user.education = profile.education.clone();
        user.profile_photo = profile.profile_photo.clone();
        user.bio = profile.bio.clone();
        user.occupation = profile.occupation.clone();
        user.date_of_birth = profile.date_of_birth.clone();
        user.linkedin_url = profile.linkedin_url.clone();
        user.github_url = profile.github_url.clone();
        user.portfolio_url = profile.portfolio_url.clone();
        user.updated_at = Utc::now();

        Ok(profile)
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn upsert_resource(
        &self,
        topic: &str,
        level: Level,
        subcategories: &Subcategories,
    ) -> StoreResult<(UpsertOutcome, Resource)> {
        let mut tables = self.tables.write().await;
        let now = next_timestamp(tables.resources.iter().map(|r| &r.created_at));

        if let Some(existing) = tables
            .resources
            .iter_mut()
            .find(|r| r.topic == topic && r.level == level)
        {
            existing.subcategories = subcategories.clone();
            existing.updated_at = now;
            return Ok((UpsertOutcome::Updated, existing.clone()));
        }

        let resource = Resource {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            level,
            subcategories: subcategories.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.resources.push(resource.clone());
        Ok((UpsertOutcome::Created, resource))
    }

    async fn find_resource_by_topic(&self, topic: &str) -> StoreResult<Option<Resource>> {
        Ok(self.find_resources_by_topic(topic).await?.into_iter().next())
    }

    async fn find_resources_by_topic(&self, topic: &str) -> StoreResult<Vec<Resource>> {
        let needle = topic.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .resources
            .iter()
            .filter(|r| r.topic.to_lowercase() == needle)
            .cloned()
            .collect())
    }

    async fn list_topics(&self) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut topics: Vec<String> = Vec::new();
        for resource in &tables.resources {
            if !topics.contains(&resource.topic) {
                topics.push(resource.topic.clone());
            }
        }
        Ok(topics)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert_history(&self, email: &str, topic: &str) -> StoreResult<HistoryEntry> {
        let mut tables = self.tables.write().await;
        let created_at = next_timestamp(tables.history.iter().map(|h| &h.created_at));
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            email: email.to_string(),
            topic: topic.to_string(),
            created_at,
            updated_at: created_at,
        };
        tables.history.push(entry.clone());
        Ok(entry)
    }

    async fn list_history(&self, email: &str) -> StoreResult<Vec<HistoryEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<HistoryEntry> = tables
            .history
            .iter()
            .filter(|h| h.email == email)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn delete_history(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.history.len();
        tables.history.retain(|h| h.id != id);
        Ok(tables.history.len() < before)
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> StoreResult<std::time::Duration> {
        Ok(std::time::Duration::ZERO)
    }
}
