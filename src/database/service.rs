//! Database service layer
//!
//! Bundles one handle per storage port so services can be built against either backend.

use std::sync::Arc;

use crate::database::memory::MemoryStore;
use crate::database::repositories::{
    AttendanceRepository, DonationRepository, EventRepository, GroupRepository, MemberRepository, UserRepository,
};
use crate::database::store::*;
use crate::database::DatabasePool;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: Arc<dyn UserStore>,
    pub members: Arc<dyn MemberStore>,
    pub groups: Arc<dyn GroupStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub donations: Arc<dyn DonationStore>,
    pub events: Arc<dyn EventStore>,
    pub health: Arc<dyn HealthProbe>,
}

impl DatabaseService {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            members: Arc::new(MemberRepository::new(pool.clone())),
            groups: Arc::new(GroupRepository::new(pool.clone())),
            attendance: Arc::new(AttendanceRepository::new(pool.clone())),
            donations: Arc::new(DonationRepository::new(pool.clone())),
            events: Arc::new(EventRepository::new(pool.clone())),
            health: Arc::new(pool),
        }
    }

    /// Fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Wrap an existing in-memory store, keeping a handle for direct manipulation
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            members: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            attendance: Arc::new(store.clone()),
            donations: Arc::new(store.clone()),
            events: Arc::new(store.clone()),
            health: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService").finish_non_exhaustive()
    }
}
