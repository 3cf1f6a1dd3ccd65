//! Database Models - rows of the users, resources and history tables (used by sqlx/serde).

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// Full user row, including the password hash. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub country: String,
    pub education: String,
    pub profile_photo: String,
    pub bio: String,
    pub occupation: String,
    pub date_of_birth: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Public profile view of a user (password excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub education: String,
    pub profile_photo: String,
    pub bio: String,
    pub occupation: String,
    pub date_of_birth: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
}

impl Profile {
    /// Profile shown for an email nobody has saved yet.
    pub fn default_for(email: &str) -> Self {
        Self {
            username: username_from_email(email),
            email: email.to_string(),
            ..Default::default()
        }
    }
}

impl From<UserRecord> for Profile {
    fn from(user: UserRecord) -> Self {
        Self {
            username: user.username,
            email: user.email,
            phone: user.phone,
            country: user.country,
            education: user.education,
            profile_photo: user.profile_photo,
            bio: user.bio,
            occupation: user.occupation,
            date_of_birth: user.date_of_birth,
            linkedin_url: user.linkedin_url,
            github_url: user.github_url,
            portfolio_url: user.portfolio_url,
        }
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub education: Option<String>,
    pub profile_photo: Option<String>,
    pub bio: Option<String>,
    pub occupation: Option<String>,
    pub date_of_birth: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
}

impl ProfileUpdate {
    /// Apply the present fields onto an existing profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        let fields = [
            (&self.username, &mut profile.username),
            (&self.phone, &mut profile.phone),
            (&self.country, &mut profile.country),
            (&self.education, &mut profile.education),
            (&self.profile_photo, &mut profile.profile_photo),
            (&self.bio, &mut profile.bio),
            (&self.occupation, &mut profile.occupation),
            (&self.date_of_birth, &mut profile.date_of_birth),
            (&self.linkedin_url, &mut profile.linkedin_url),
            (&self.github_url, &mut profile.github_url),
            (&self.portfolio_url, &mut profile.portfolio_url),
        ];
        for (update, slot) in fields {
            if let Some(value) = update {
                *slot = value.clone();
            }
        }
    }
}

/// Local part of an email address, used as the fallback username.
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

// ============================================================================
// Resources
// ============================================================================

/// Difficulty level, the second half of the resource key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Expert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Expert => "Expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid level '{}'. Valid levels: Beginner, Intermediate, Expert",
                    s
                )
            })
    }
}

/// The four fixed content buckets of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subcategories {
    #[serde(rename = "YouTube Playlists", default)]
    pub youtube_playlists: Vec<String>,
    #[serde(rename = "Documentation", default)]
    pub documentation: Map<String, Value>,
    #[serde(rename = "Roadmaps", default)]
    pub roadmaps: Vec<String>,
    #[serde(rename = "Courses", default)]
    pub courses: Vec<String>,
}

/// Learning-resource bundle for one (topic, level) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub topic: String,
    pub level: Level,
    pub subcategories: Subcategories,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// History
// ============================================================================

/// One visit of a user to a topic
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
