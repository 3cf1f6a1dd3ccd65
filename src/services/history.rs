//! Append-only log of topic visits per user email.
//!
//! The email is a soft reference: no check that a user with it exists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::HistoryEntry;
use crate::db::store::HistoryStore;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VisitRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Clone)]
pub struct VisitHistory {
    store: Arc<dyn HistoryStore>,
}

impl VisitHistory {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, email: &str, topic: &str) -> Result<HistoryEntry, AppError> {
        if email.is_empty() || topic.is_empty() {
            return Err(AppError::validation("Please provide email and topic"));
        }

        let entry = self
            .store
            .insert_history(email, topic)
            .await
            .map_err(|e| AppError::from_store("Error recording visit history", e))?;

        tracing::debug!(email = %email, topic = %topic, id = %entry.id, "visit recorded");
        Ok(entry)
    }

    /// Newest first.
    pub async fn list_by_user(&self, email: &str) -> Result<Vec<HistoryEntry>, AppError> {
        if email.is_empty() {
            return Err(AppError::validation("Please provide email"));
        }

        self.store
            .list_history(email)
            .await
            .map_err(|e| AppError::from_store("Error fetching history", e))
    }

    /// Any caller holding the id may delete the entry.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        if id.is_empty() {
            return Err(AppError::validation("Please provide history ID"));
        }

        let Ok(id) = Uuid::parse_str(id) else {
            return Err(AppError::not_found("History entry not found"));
        };

        let deleted = self
            .store
            .delete_history(id)
            .await
            .map_err(|e| AppError::from_store("Error deleting history", e))?;
        if !deleted {
            return Err(AppError::not_found("History entry not found"));
        }
        Ok(())
    }
}
