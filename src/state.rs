use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::store::{HealthProbe, HistoryStore, ResourceStore, UserStore};
use crate::services::{
    auth::AuthService, catalog::ResourceCatalog, history::VisitHistory, notify::LoginNotifier,
    profile::ProfileService, token::TokenIssuer,
};

/// Everything a handler needs; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub profiles: ProfileService,
    pub catalog: ResourceCatalog,
    pub history: VisitHistory,
    pub probe: Arc<dyn HealthProbe>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, config: AppConfig) -> Self
    where
        S: UserStore + ResourceStore + HistoryStore + HealthProbe + 'static,
    {
        let notifier = LoginNotifier::new(
            config.login_webhook_url.clone(),
            config.login_webhook_timeout,
        );
        Self::with_notifier(store, config, notifier)
    }

    pub fn with_notifier<S>(store: Arc<S>, config: AppConfig, notifier: LoginNotifier) -> Self
    where
        S: UserStore + ResourceStore + HistoryStore + HealthProbe + 'static,
    {
        let tokens = TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_secs);

        Self {
            auth: AuthService::new(store.clone(), tokens, notifier, config.bcrypt_cost),
            profiles: ProfileService::new(store.clone(), config.bcrypt_cost),
            catalog: ResourceCatalog::new(store.clone()),
            history: VisitHistory::new(store.clone()),
            probe: store,
            config: Arc::new(config),
        }
    }
}
