use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::session::SessionGate;
use crate::blog::store::ContentStore;
use crate::clock::Clock;
use crate::config::Config;
use crate::storage::KeyValueStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Everything one process shares. Built once at startup; the gate and the
/// store handed out here all point at the same backend.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            storage,
            clock,
        }
    }

    /// A gate that has already read the persisted session.
    pub fn session_gate(&self) -> SessionGate {
        let mut gate = SessionGate::new(
            self.storage.clone(),
            self.clock.clone(),
            self.config.reference_digest(),
        )
        .with_session_hours(self.config.auth.session_hours);
        gate.initialize();
        gate
    }

    pub fn content_store(&self) -> ContentStore {
        ContentStore::new(self.storage.clone(), self.clock.clone())
    }
}
