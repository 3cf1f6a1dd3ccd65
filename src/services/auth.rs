/**
 * Auth Service
 * Registration, credential check and token issuance
 */
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::notify::{LoginEvent, LoginNotifier};
use super::password::{hash_password, verify_password};
use super::token::{Claims, TokenIssuer};
use crate::db::models::NewUser;
use crate::db::store::UserStore;
use crate::error::AppError;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_CHARS: usize = 4;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    notifier: LoginNotifier,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenIssuer,
        notifier: LoginNotifier,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tokens,
            notifier,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<(), AppError> {
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty()
        {
            return Err(AppError::validation(
                "Please provide username, email and password",
            ));
        }

        if request.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_CHARS
            )));
        }

        let existing = self
            .users
            .find_user_by_email(&request.email)
            .await
            .map_err(|e| AppError::from_store("Error creating user", e))?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;

        // The unique index still guards against a concurrent registration.
        let user = self
            .users
            .insert_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await
            .map_err(|e| AppError::from_store("Error creating user", e))?;

        tracing::info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Session, AppError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let user = self
            .users
            .find_user_by_email(&request.email)
            .await
            .map_err(|e| AppError::from_store("Error logging in user", e))?
            .ok_or_else(|| {
                tracing::warn!("Login attempt for unknown user: {}", request.email);
                AppError::not_found("User not found")
            })?;

        if !verify_password(request.password, user.password_hash.clone()).await {
            tracing::warn!("Failed login attempt for: {}", user.email);
            return Err(AppError::Auth("Invalid password".to_string()));
        }

        let user_id = user.id.to_string();
        let token = self
            .tokens
            .issue(&user_id, &user.email)
            .map_err(|e| AppError::server("Error logging in user", e))?;

        // Detached: the webhook never delays or fails the login.
        let _ = self.notifier.notify(LoginEvent {
            user_id: user_id.clone(),
            username: user.username,
            email: user.email.clone(),
            login_time: Utc::now(),
        });

        tracing::info!("Successful login for user: {}", user.email);

        Ok(Session { token, user_id })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens.verify(token).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            AppError::Auth("Invalid or expired token".to_string())
        })
    }
}
