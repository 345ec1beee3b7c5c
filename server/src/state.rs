use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use shared::SessionGate;
use shared::config::LiveConfig;
use shared::types::AppConfig;

use crate::portfolio::PortfolioBook;
use crate::store::{MemoryStore, SessionStore};

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: LiveConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub gate: Arc<SessionGate>,
    pub portfolios: PortfolioBook,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// The public set is fixed here; later config reloads do not change it.
    pub fn with_store(config: AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        let gate = SessionGate::new(&config.session.extra_public_paths);
        Self {
            config: LiveConfig::new(config),
            sessions,
            gate: Arc::new(gate),
            portfolios: PortfolioBook::new(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
