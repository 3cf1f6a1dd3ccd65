/**
 * Resource Catalog
 * Learning resources keyed by (topic, level), looked up by case-insensitive topic
 */
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::models::{Level, Resource, Subcategories};
use crate::db::store::{ResourceStore, UpsertOutcome};
use crate::error::AppError;

// ============================================================================
// Types
// ============================================================================

/// Raw add/update payload, validated by `ResourceCatalog`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResourceInput {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub subcategories: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    pub topic: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDetails {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

/// Per-item outcome of a bulk add.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub details: BulkDetails,
}

// ============================================================================
// Validation
// ============================================================================

fn validate(input: ResourceInput) -> Result<(String, Level, Subcategories), AppError> {
    let topic = input.topic.filter(|t| !t.is_empty());
    let level = input.level.filter(|l| !l.is_empty());
    let subcategories = input.subcategories.filter(|s| !s.is_null());

    let (Some(topic), Some(level), Some(subcategories)) = (topic, level, subcategories) else {
        return Err(AppError::validation(
            "Please provide topic, level, and subcategories",
        ));
    };

    let level = level.parse::<Level>().map_err(AppError::Validation)?;

    if !subcategories.is_object() {
        return Err(AppError::validation("Subcategories must be an object"));
    }
    let subcategories = serde_json::from_value::<Subcategories>(subcategories)
        .map_err(|e| AppError::validation(format!("Invalid subcategories: {}", e)))?;

    Ok((topic, level, subcategories))
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct ResourceCatalog {
    store: Arc<dyn ResourceStore>,
}

impl ResourceCatalog {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Create the (topic, level) resource or replace its subcategories wholesale.
    pub async fn add_or_update(
        &self,
        input: ResourceInput,
    ) -> Result<(UpsertOutcome, Resource), AppError> {
        let (topic, level, subcategories) = validate(input)?;

        let (outcome, resource) = self
            .store
            .upsert_resource(&topic, level, &subcategories)
            .await
            .map_err(|e| AppError::from_store("Error adding resource", e))?;

        tracing::info!(topic = %topic, level = %level, outcome = ?outcome, "resource saved");
        Ok((outcome, resource))
    }

    /// Apply `add_or_update` to each item independently; failures are reported, not raised.
    pub async fn add_or_update_bulk(&self, items: Vec<Value>) -> Result<BulkReport, AppError> {
        if items.is_empty() {
            return Err(AppError::validation("Please provide an array of resources"));
        }

        let mut details = BulkDetails::default();

        for item in items {
            let label_topic = item
                .get("topic")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .unwrap_or("unknown")
                .to_string();

            let result = match serde_json::from_value::<ResourceInput>(item) {
                Ok(input) => self.add_or_update(input).await,
                Err(e) => Err(AppError::validation(format!(
                    "Malformed resource entry: {}",
                    e
                ))),
            };

            match result {
                Ok((outcome, resource)) => {
                    let label = format!("{} ({})", resource.topic, resource.level);
                    match outcome {
                        UpsertOutcome::Created => details.created.push(label),
                        UpsertOutcome::Updated => details.updated.push(label),
                    }
                }
                Err(e) => {
                    tracing::warn!(topic = %label_topic, error = %e, "bulk resource entry failed");
                    details.failed.push(BulkFailure {
                        topic: label_topic,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(BulkReport {
            created: details.created.len(),
            updated: details.updated.len(),
            failed: details.failed.len(),
            details,
        })
    }

    pub async fn find_by_topic_exact(&self, topic: &str) -> Result<Resource, AppError> {
        require_topic(topic)?;
        self.store
            .find_resource_by_topic(topic)
            .await
            .map_err(|e| AppError::from_store("Error fetching resource", e))?
            .ok_or_else(|| AppError::not_found(format!("No resources found for topic: {}", topic)))
    }

    pub async fn list_all_topics(&self) -> Result<Vec<String>, AppError> {
        self.store
            .list_topics()
            .await
            .map_err(|e| AppError::from_store("Error fetching topics", e))
    }

    pub async fn find_all_by_topic(&self, topic: &str) -> Result<Vec<Resource>, AppError> {
        require_topic(topic)?;
        let resources = self
            .store
            .find_resources_by_topic(topic)
            .await
            .map_err(|e| AppError::from_store("Error retrieving resources", e))?;

        if resources.is_empty() {
            return Err(AppError::not_found(format!(
                "No resources found for topic: {}",
                topic
            )));
        }
        Ok(resources)
    }
}

fn require_topic(topic: &str) -> Result<(), AppError> {
    if topic.is_empty() {
        return Err(AppError::validation("Please provide a topic name"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use serde_json::json;

    fn catalog() -> (Arc<MemoryStore>, ResourceCatalog) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ResourceCatalog::new(store))
    }

    fn input(value: Value) -> ResourceInput {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_add_twice_is_last_write_wins() {
        let (store, catalog) = catalog();

        let (first, _) = catalog
            .add_or_update(input(json!({
                "topic": "React",
                "level": "Beginner",
                "subcategories": { "Courses": ["https://a.example"] }
            })))
            .await
            .unwrap();
        let (second, resource) = catalog
            .add_or_update(input(json!({
                "topic": "React",
                "level": "Beginner",
                "subcategories": { "Roadmaps": ["https://roadmap.sh/react"] }
            })))
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        assert!(resource.subcategories.courses.is_empty());
        assert_eq!(resource.subcategories.roadmaps, vec!["https://roadmap.sh/react"]);
        assert_eq!(store.resources().await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_requires_all_fields() {
        let (_, catalog) = catalog();
        for payload in [
            json!({ "level": "Beginner", "subcategories": {} }),
            json!({ "topic": "", "level": "Beginner", "subcategories": {} }),
            json!({ "topic": "Go", "subcategories": {} }),
            json!({ "topic": "Go", "level": "Beginner" }),
            json!({ "topic": "Go", "level": "Beginner", "subcategories": null }),
        ] {
            let err = catalog.add_or_update(input(payload)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_level_and_bad_subcategories() {
        let (_, catalog) = catalog();
        let level = catalog
            .add_or_update(input(json!({
                "topic": "Go", "level": "Advanced", "subcategories": {}
            })))
            .await
            .unwrap_err();
        assert!(matches!(level, AppError::Validation(_)));

        let shape = catalog
            .add_or_update(input(json!({
                "topic": "Go", "level": "Expert", "subcategories": { "Courses": "not-a-list" }
            })))
            .await
            .unwrap_err();
        assert!(matches!(shape, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_topic_lookup_ignores_case_but_not_substrings() {
        let (_, catalog) = catalog();
        catalog
            .add_or_update(input(json!({
                "topic": "React", "level": "Beginner", "subcategories": {}
            })))
            .await
            .unwrap();

        for query in ["react", "REACT", "React"] {
            let found = catalog.find_by_topic_exact(query).await.unwrap();
            assert_eq!(found.topic, "React");
        }

        let err = catalog.find_by_topic_exact("Rea").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = catalog.find_by_topic_exact("React Native").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_topics_is_deduplicated() {
        let (_, catalog) = catalog();
        for (topic, level) in [
            ("React", "Beginner"),
            ("React", "Expert"),
            ("Rust", "Intermediate"),
            ("React", "Intermediate"),
        ] {
            catalog
                .add_or_update(input(json!({
                    "topic": topic, "level": level, "subcategories": {}
                })))
                .await
                .unwrap();
        }

        let topics = catalog.list_all_topics().await.unwrap();
        assert_eq!(topics, vec!["React".to_string(), "Rust".to_string()]);
    }

    #[tokio::test]
    async fn test_find_all_by_topic_returns_every_level() {
        let (_, catalog) = catalog();
        for level in ["Beginner", "Expert"] {
            catalog
                .add_or_update(input(json!({
                    "topic": "Docker", "level": level, "subcategories": {}
                })))
                .await
                .unwrap();
        }

        let all = catalog.find_all_by_topic("docker").await.unwrap();
        assert_eq!(all.len(), 2);

        let err = catalog.find_all_by_topic("kubernetes").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_reports_each_item_independently() {
        let (store, catalog) = catalog();
        catalog
            .add_or_update(input(json!({
                "topic": "Python", "level": "Beginner", "subcategories": {}
            })))
            .await
            .unwrap();

        let report = catalog
            .add_or_update_bulk(vec![
                json!({ "topic": "Python", "level": "Beginner", "subcategories": { "Courses": ["c"] } }),
                json!({ "topic": "Java", "level": "Expert", "subcategories": {} }),
                json!({ "topic": "Broken", "subcategories": {} }),
                json!({ "topic": "SQL", "level": "Intermediate", "subcategories": {} }),
            ])
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.details.failed[0].topic, "Broken");
        assert_eq!(
            report.details.created,
            vec!["Java (Expert)".to_string(), "SQL (Intermediate)".to_string()]
        );
        assert_eq!(report.details.updated, vec!["Python (Beginner)".to_string()]);
        assert_eq!(store.resources().await.len(), 3);
    }

    #[tokio::test]
    async fn test_bulk_handles_non_object_items_and_empty_batches() {
        let (_, catalog) = catalog();
        let report = catalog
            .add_or_update_bulk(vec![json!("nope"), json!(42)])
            .await
            .unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.details.failed[0].topic, "unknown");

        let err = catalog.add_or_update_bulk(vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
