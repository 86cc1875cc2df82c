use std::sync::Arc;

use log::info;
use url::Url;

use crate::{
    api::{
        subscriptions::{self, Plan},
        AccountClient, Gateway, StatusHook, SubscriptionClient,
    },
    config::Config,
    model::{Database, Storage, StorageError},
    store::{NotificationError, NotificationStore, SessionStore},
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to open storage: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to start notifications: {0}")]
    Notifications(#[from] NotificationError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid api url: {0}")]
    ApiUrl(#[from] url::ParseError),
}

/// Everything a page needs, built once at startup and passed around.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    pub notifications: NotificationStore,
    pub gateway: Gateway,
    pub account: AccountClient,
    pub subscriptions: SubscriptionClient,
}

impl AppState {
    /// Open the configured database and restore the session from it.
    pub fn build(config: Config) -> Result<AppState, BuildError> {
        let database = Database::open(&config.db_path)?;
        AppState::with_storage(config, Arc::new(database), None)
    }

    pub fn with_storage(
        config: Config,
        storage: Arc<dyn Storage>,
        status_hook: Option<Arc<dyn StatusHook>>,
    ) -> Result<AppState, BuildError> {
        let session = SessionStore::load(storage);
        let notifications = NotificationStore::new(config.notification_timeout)?;

        let base_url = Url::parse(&config.api_url)?;
        let mut gateway = Gateway::new(
            base_url,
            config.request_timeout,
            session.clone(),
            notifications.clone(),
        )?;
        if let Some(hook) = status_hook {
            gateway = gateway.with_status_hook(hook);
        }

        info!("Using api at {}", config.api_url);

        Ok(AppState {
            account: AccountClient::new(gateway.clone()),
            subscriptions: SubscriptionClient::new(gateway.clone()),
            config,
            session,
            notifications,
            gateway,
        })
    }

    pub fn plans(&self) -> Vec<Plan> {
        subscriptions::plans(&self.config.plans)
    }
}
