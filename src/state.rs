use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::database::Datastores;

/// Shared application state
///
/// Built once by the lifespan and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service settings
    pub settings: Arc<Settings>,

    /// Datastore report gathered at startup
    pub datastores: Arc<Datastores>,

    started: Instant,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(settings: Settings, datastores: Datastores) -> Self {
        Self {
            settings: Arc::new(settings),
            datastores: Arc::new(datastores),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
