//! Database module
//!
//! This module handles database connections, the storage ports and their backends

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, DatabaseConfig, create_pool, run_migrations, health_check};
pub use memory::MemoryStore;
pub use repositories::{UserRepository, MemberRepository, GroupRepository, AttendanceRepository, DonationRepository, EventRepository};
pub use service::DatabaseService;
pub use store::{UserStore, MemberStore, GroupStore, AttendanceStore, DonationStore, EventStore, HealthProbe, AssignOutcome};
