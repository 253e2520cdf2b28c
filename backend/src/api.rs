//! Public API surface for the helpdesk backend.
//!
//! This file consolidates the domain entities shared by the repository layer,
//! the service layer and the HTTP API. All types derive Serialize/Deserialize
//! for JSON serialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use crate::models::{
    CategoryCount, DailyCountSeries, DateRange, EventCategoryMap, ForecastPoint, ForecastSeries,
    TicketCriteria, TicketStats, TodayStats,
};

/// User identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Ticket identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TicketId(pub i64);

/// Calendar event identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        UserId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TicketId {
    pub fn new(value: i64) -> Self {
        TicketId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl EventId {
    pub fn new(value: i64) -> Self {
        EventId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares a closed string enum with its wire label, `as_str`, `Display`
/// and `FromStr` (exact label match).
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire label of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(format!("Unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

labelled_enum! {
    /// Role carried by a user and embedded in their access token.
    UserRole {
        Admin => "admin",
        Client => "client",
    }
}

labelled_enum! {
    /// Ticket workflow status.
    TicketStatus {
        Active => "active",
        Resolved => "resolved",
        InProgress => "in-progress",
        Pending => "pending",
    }
}

labelled_enum! {
    /// Category of a support ticket.
    IssueType {
        BugReport => "Bug Report",
        FeatureRequest => "Feature Request",
        UserInquiry => "User Inquiry",
        SystemOutage => "System Outage",
        PerformanceIssue => "Performance Issue",
        SecurityIncident => "Security Incident",
        DataDiscrepancy => "Data Discrepancy",
        AccessRequest => "Access Request",
        ComplianceCheck => "Compliance Check",
        HardwareFailure => "Hardware Failure",
        SoftwareUpdate => "Software Update",
        ConfigurationChange => "Configuration Change",
        MaintenanceTask => "Maintenance Task",
    }
}

labelled_enum! {
    IssuePriority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

labelled_enum! {
    IssueUrgency {
        Critical => "Critical",
        High => "High",
        Moderate => "Moderate",
        Low => "Low",
        Scheduled => "Scheduled",
        Routine => "Routine",
    }
}

labelled_enum! {
    /// Horizon requested from the forecasting service.
    ChartTrend {
        Monthly => "monthly",
        Weekly => "weekly",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Client
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Active
    }
}

// =============================================================================
// Users
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub created: DateTime<Utc>,
}

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Lightweight owner information attached to ticket listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Tickets
// =============================================================================

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub status: TicketStatus,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub urgency: IssueUrgency,
    pub expected_resolution_time: Option<DateTime<Utc>>,
    /// Only set while `status` is `Resolved`.
    pub actual_resolution_time: Option<DateTime<Utc>>,
    /// Creation timestamp; reset when the resolution estimate is recomputed.
    pub date: DateTime<Utc>,
}

impl Ticket {
    pub fn is_resolved(&self) -> bool {
        self.status == TicketStatus::Resolved
    }

    /// Resolution duration in hours, for resolved tickets with a recorded
    /// resolution time.
    pub fn resolution_hours(&self) -> Option<f64> {
        if !self.is_resolved() {
            return None;
        }
        let resolved_at = self.actual_resolution_time?;
        let elapsed_ms = (resolved_at - self.date).num_milliseconds();
        Some(elapsed_ms as f64 / 3_600_000.0)
    }
}

/// Data required to insert a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub status: TicketStatus,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub urgency: IssueUrgency,
    pub expected_resolution_time: Option<DateTime<Utc>>,
    pub date: DateTime<Utc>,
}

/// A ticket together with its owner, as shown on the admin overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketWithOwner {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub owner: Option<UserSummary>,
}

// =============================================================================
// Calendar events
// =============================================================================

/// Calendar details of a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDetails {
    /// Free-text label such as "Public Holiday" or "Product Release".
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_name: String,
    pub date: NaiveDate,
}

/// A scheduled calendar event (holiday, product launch, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub user_id: UserId,
    pub event_details: EventDetails,
}

/// Data required to insert an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: UserId,
    pub details: EventDetails,
}
