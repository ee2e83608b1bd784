use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::store::{PgStore, WallStore};
use crate::{config, database};

/// Process-wide handles, constructed once and injected into every handler.
#[derive(Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub db: Option<database::Pool>,
    store: Option<Arc<dyn WallStore>>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    #[tracing::instrument]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let db = match cfg.db.as_ref() {
            Some(db_cfg) => Some(database::Pool::new(db_cfg).await.change_context(AppError)?),
            None => {
                tracing::warn!("no [db] section configured, the wall starts in placeholder mode");
                None
            }
        };

        let store = db
            .clone()
            .map(|pool| Arc::new(PgStore::new(pool)) as Arc<dyn WallStore>);

        Ok(Self {
            config: Arc::new(cfg),
            db,
            store,
        })
    }

    /// Builds an app around an already-constructed store. Used by the test
    /// suite to run handlers against a fake.
    pub fn with_store(cfg: config::Server, store: Arc<dyn WallStore>) -> Self {
        Self {
            config: Arc::new(cfg),
            db: None,
            store: Some(store),
        }
    }

    /// `None` when the wall has no datastore configured; handlers
    /// short-circuit with their "not configured" response.
    pub fn store(&self) -> Option<&Arc<dyn WallStore>> {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("configured", &self.store.is_some())
            .finish()
    }
}
