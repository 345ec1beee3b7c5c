pub mod config;

pub use self::config::{load_config, validate_config};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::server_config::AppConfig;

/// Shared handle to the running configuration.
///
/// Every clone points at the same `RwLock<AppConfig>`, so a SIGHUP
/// [`reload`](LiveConfig::reload) reaches all connection tasks on their next
/// read. Copy values out of the guard before awaiting anything.
#[derive(Clone, Debug)]
pub struct LiveConfig(Arc<RwLock<AppConfig>>);

impl LiveConfig {
    pub fn new(config: AppConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.0.read().await
    }

    /// Cloned snapshot, for callers that hold values across `.await`.
    pub async fn snapshot(&self) -> AppConfig {
        self.0.read().await.clone()
    }

    pub async fn reload(&self, new: AppConfig) {
        *self.0.write().await = new;
    }
}
