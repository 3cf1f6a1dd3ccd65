//! PostgreSQL implementation of the repository traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::models::{
    HistoryEntry, Level, NewUser, Profile, ProfileUpdate, Resource, Subcategories, UserRecord,
};
use super::store::{
    HealthProbe, HistoryStore, ResourceStore, StoreError, StoreResult, UpsertOutcome, UserStore,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, phone, country, education, \
     profile_photo, bio, occupation, date_of_birth, linkedin_url, github_url, portfolio_url, \
     created_at, updated_at";

const RESOURCE_COLUMNS: &str = "id, topic, level, subcategories, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[derive(FromRow)]
struct ResourceRow {
    id: Uuid,
    topic: String,
    level: String,
    subcategories: Json<Subcategories>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UpsertedResourceRow {
    #[sqlx(flatten)]
    row: ResourceRow,
    inserted: bool,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = StoreError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let level = row.level.parse::<Level>().map_err(StoreError::Corrupt)?;
        Ok(Resource {
            id: row.id,
            topic: row.topic,
            level,
            subcategories: row.subcategories.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_unique_violation(e, "User with this email"))
    }

    async fn upsert_profile(
        &self,
        email: &str,
        default_username: &str,
        placeholder_hash: &str,
        update: &ProfileUpdate,
    ) -> StoreResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO users (
                username, email, password_hash, phone, country, education, profile_photo,
                bio, occupation, date_of_birth, linkedin_url, github_url, portfolio_url
            )
            VALUES (
                COALESCE($4, $2), $1, $3, COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''),
                COALESCE($8, ''), COALESCE($9, ''), COALESCE($10, ''), COALESCE($11, ''),
                COALESCE($12, ''), COALESCE($13, ''), COALESCE($14, '')
            )
            ON CONFLICT (email) DO UPDATE SET
                username = COALESCE($4, users.username),
                phone = COALESCE($5, users.phone),
                country = COALESCE($6, users.country),
                education = COALESCE($7, users.education),
                profile_photo = COALESCE($8, users.profile_photo),
                bio = COALESCE($9, users.bio),
                occupation = COALESCE($10, users.occupation),
                date_of_birth = COALESCE($11, users.date_of_birth),
                linkedin_url = COALESCE($12, users.linkedin_url),
                github_url = COALESCE($13, users.github_url),
                portfolio_url = COALESCE($14, users.portfolio_url),
                updated_at = now()
            RETURNING username, email, phone, country, education, profile_photo, bio,
                      occupation, date_of_birth, linkedin_url, github_url, portfolio_url
            "#,
        )
        .bind(email)
        .bind(default_username)
        .bind(placeholder_hash)
        .bind(&update.username)
        .bind(&update.phone)
        .bind(&update.country)
        .bind(&update.education)
        .bind(&update.profile_photo)
        .bind(&update.bio)
        .bind(&update.occupation)
        .bind(&update.date_of_birth)
        .bind(&update.linkedin_url)
        .bind(&update.github_url)
        .bind(&update.portfolio_url)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(profile)
    }

    async fn set_password_hash(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn upsert_resource(
        &self,
        topic: &str,
        level: Level,
        subcategories: &Subcategories,
    ) -> StoreResult<(UpsertOutcome, Resource)> {
        let upserted = sqlx::query_as::<_, UpsertedResourceRow>(&format!(
            r#"
            INSERT INTO resources (topic, level, subcategories)
            VALUES ($1, $2, $3)
            ON CONFLICT (topic, level) DO UPDATE SET
                subcategories = EXCLUDED.subcategories,
                updated_at = clock_timestamp()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(topic)
        .bind(level.as_str())
        .bind(Json(subcategories))
        .fetch_one(self.pool.as_ref())
        .await?;

        let outcome = if upserted.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };
        Ok((outcome, upserted.row.try_into()?))
    }

    async fn find_resource_by_topic(&self, topic: &str) -> StoreResult<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE LOWER(topic) = LOWER($1) \
             ORDER BY created_at ASC LIMIT 1",
            RESOURCE_COLUMNS
        ))
        .bind(topic)
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.map(Resource::try_from).transpose()
    }

    async fn find_resources_by_topic(&self, topic: &str) -> StoreResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE LOWER(topic) = LOWER($1) ORDER BY created_at ASC",
            RESOURCE_COLUMNS
        ))
        .bind(topic)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.into_iter().map(Resource::try_from).collect()
    }

    async fn list_topics(&self) -> StoreResult<Vec<String>> {
        let topics = sqlx::query_scalar::<_, String>(
            "SELECT topic FROM resources GROUP BY topic ORDER BY MIN(created_at) ASC",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(topics)
    }
}

#[async_trait]
impl HistoryStore for PgStore {
    async fn insert_history(&self, email: &str, topic: &str) -> StoreResult<HistoryEntry> {
        let entry = sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO history (email, topic)
            VALUES ($1, $2)
            RETURNING id, email, topic, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(topic)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(entry)
    }

    async fn list_history(&self, email: &str) -> StoreResult<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT id, email, topic, created_at, updated_at
            FROM history
            WHERE email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(entries)
    }

    async fn delete_history(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM history WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HealthProbe for PgStore {
    async fn ping(&self) -> StoreResult<std::time::Duration> {
        let start = std::time::Instant::now();
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(start.elapsed())
    }
}
