//! Services module
//!
//! This module contains business logic services

pub mod aggregation;
pub mod attendance;
pub mod auth;
pub mod donation;
pub mod event;
pub mod export;
pub mod member;
pub mod membership;
pub mod reports;

// Re-export commonly used services
pub use attendance::{AttendanceService, MarkAttendanceResponse};
pub use auth::{AuthService, Claims, SeedAdminResponse};
pub use donation::DonationService;
pub use event::EventService;
pub use export::CsvFile;
pub use member::MemberService;
pub use membership::MembershipService;
pub use reports::ReportService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub member_service: MemberService,
    pub membership_service: MembershipService,
    pub attendance_service: AttendanceService,
    pub donation_service: DonationService,
    pub event_service: EventService,
    pub report_service: ReportService,
    database: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: DatabaseService) -> Self {
        Self {
            auth_service: AuthService::new(database.users.clone(), settings.auth.clone()),
            member_service: MemberService::new(database.clone()),
            membership_service: MembershipService::new(database.clone()),
            attendance_service: AttendanceService::new(database.clone()),
            donation_service: DonationService::new(database.clone()),
            event_service: EventService::new(database.clone()),
            report_service: ReportService::new(database.clone()),
            database,
        }
    }

    /// Replace the auth service, e.g. to lower the bcrypt cost
    pub fn with_auth_service(mut self, auth_service: AuthService) -> Self {
        self.auth_service = auth_service;
        self
    }

    pub fn database(&self) -> &DatabaseService {
        &self.database
    }

    /// Storage reachability for the health endpoint
    pub async fn health_check(&self) -> ServiceHealthStatus {
        match self.database.health.ping().await {
            Ok(()) => ServiceHealthStatus { database_healthy: true, issue: None },
            Err(e) => ServiceHealthStatus { database_healthy: false, issue: Some(e.to_string()) },
        }
    }
}

/// Health status for the services' backing storage
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub issue: Option<String>,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }
}
