use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{debug, warn};

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

/// Runtime settings read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub login_webhook_url: Option<String>,
    pub login_webhook_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: load("HOST", "127.0.0.1".to_string()),
            port: load("PORT", 3000),
            environment: load("ENVIRONMENT", "development".to_string()),
            jwt_secret: load("JWT_SECRET", DEFAULT_JWT_SECRET.to_string()),
            token_ttl_secs: load("TOKEN_TTL_SECS", 3600),
            bcrypt_cost: load("BCRYPT_COST", 10),
            login_webhook_url: env::var("LOGIN_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            login_webhook_timeout: Duration::from_millis(load("LOGIN_WEBHOOK_TIMEOUT_MS", 3000)),
            body_limit_bytes: load("BODY_LIMIT_BYTES", 2 * 1024 * 1024),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl AppConfig {
    /// Cheap hashing and no webhook.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: 4,
            login_webhook_url: None,
            login_webhook_timeout: Duration::from_millis(200),
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// Parse `key`, warning and falling back to `default` when it is not a valid `T`.
pub(crate) fn load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        Err(_) => {
            debug!("{key} not set, using default: {default}");
            default
        }
    }
}
