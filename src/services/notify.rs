//! Best-effort login webhook.
//!
//! Each notification runs on its own task with its own timeout; the outcome is only logged.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub login_time: DateTime<Utc>,
}

#[derive(Clone)]
pub struct LoginNotifier {
    client: reqwest::Client,
    url: Option<String>,
    timeout: Duration,
}

impl LoginNotifier {
    pub fn new(url: Option<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), url, timeout)
    }

    pub fn with_client(client: reqwest::Client, url: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Spawn the webhook call. Returns `None` when no webhook is configured.
    pub fn notify(&self, event: LoginEvent) -> Option<JoinHandle<()>> {
        let url = self.url.clone()?;
        let client = self.client.clone();
        let timeout = self.timeout;

        Some(tokio::spawn(async move {
            match client.post(&url).timeout(timeout).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(email = %event.email, "login webhook delivered");
                }
                Ok(response) => {
                    tracing::warn!(
                        email = %event.email,
                        status = %response.status(),
                        "login webhook returned error"
                    );
                }
                Err(e) => {
                    tracing::warn!(email = %event.email, error = %e, "login webhook failed");
                }
            }
        }))
    }
}
