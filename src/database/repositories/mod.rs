//! Database repositories module
//!
//! This module contains the PostgreSQL implementations of the storage ports

pub mod user;
pub mod member;
pub mod group;
pub mod attendance;
pub mod donation;
pub mod event;

// Re-export repositories
pub use user::UserRepository;
pub use member::MemberRepository;
pub use group::GroupRepository;
pub use attendance::AttendanceRepository;
pub use donation::DonationRepository;
pub use event::EventRepository;
