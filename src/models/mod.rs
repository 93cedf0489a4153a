//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod member;
pub mod group;
pub mod attendance;
pub mod donation;
pub mod event;

// Re-export commonly used models
pub use user::{User, Role, CreateUserRequest, LoginRequest, LoginResponse, UserSummary};
pub use member::{Member, MemberRef, MemberView, MemberPage, Gender, CreateMemberRequest, UpdateMemberRequest, MemberFilter, ListMembersQuery, MemberImportRow, ImportMembersRequest, ImportSummary};
pub use group::{SmallGroup, GroupRef, GroupView, CreateGroupRequest, UpdateGroupRequest, MembershipRequest};
pub use attendance::{AttendanceRecord, AttendanceView, AttendanceStatus, AttendanceMark, AttendanceEntry, AttendanceFilter, MarkAttendanceRequest};
pub use donation::{Donation, DonationType, CreateDonationRequest, UpdateDonationRequest, DonationFilter};
pub use event::{Event, CreateEventRequest, UpdateEventRequest};
