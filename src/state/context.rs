//! Application context shared by every request

use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::services::ServiceFactory;

/// Application-wide context containing services and settings
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub services: Arc<ServiceFactory>,
    pub started_at: Instant,
}

impl AppState {
    /// Build every service on top of the given storage backend
    pub fn new(settings: Settings, database: DatabaseService) -> Self {
        let services = ServiceFactory::new(&settings, database);
        Self::from_services(settings, services)
    }

    pub fn from_services(settings: Settings, services: ServiceFactory) -> Self {
        Self {
            settings: Arc::new(settings),
            services: Arc::new(services),
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was built
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
