use std::sync::Arc;

use chirpy_crypto::{SessionManager, SessionSecret};
use chirpy_store::{JsonFileStore, Repository};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::metrics::HitCounter;
use crate::moderation::ContentFilter;

/// Shared, cheaply cloneable handler state.
///
/// The repository is the only mutable shared resource besides the hit
/// counter; the session manager and filter are read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository<JsonFileStore>>,
    pub sessions: Arc<SessionManager>,
    pub filter: Arc<ContentFilter>,
    pub hits: Arc<HitCounter>,
}

impl AppState {
    /// Open (creating if needed) the database named by `config`.
    pub fn open(config: &ServerConfig, secret: SessionSecret) -> ServerResult<Self> {
        config.validate()?;
        let store = JsonFileStore::open(&config.database_path)?;
        Ok(Self {
            repo: Arc::new(Repository::new(store)),
            sessions: Arc::new(SessionManager::new(secret, config.session_config())),
            filter: Arc::new(ContentFilter::from_config(config)),
            hits: Arc::new(HitCounter::new()),
        })
    }

    /// Run `work` against the repository on the blocking pool.
    ///
    /// Repository calls do synchronous file I/O and Argon2 hashing, so they
    /// must not run on the async workers.
    pub async fn blocking<T, F>(&self, work: F) -> ServerResult<T>
    where
        F: FnOnce(&Repository<JsonFileStore>) -> ServerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || work(&repo))
            .await
            .map_err(|e| ServerError::Internal(format!("blocking task failed: {e}")))?
    }
}
