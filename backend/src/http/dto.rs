//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies and response envelopes. Entities are serialized straight
//! from [`crate::api`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    CategoryCount, Event, IssuePriority, IssueType, IssueUrgency, Ticket, TicketStats,
    TicketStatus, TodayStats, User,
};
use crate::services::tickets::{TicketDraft, TicketPatch};

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    /// First validation failure, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if !self.email.contains('@') {
            return Err("Please include a valid email".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// =============================================================================
// Tickets
// =============================================================================

/// Request body for creating a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub urgency: IssueUrgency,
}

impl From<CreateTicketRequest> for TicketDraft {
    fn from(request: CreateTicketRequest) -> Self {
        TicketDraft {
            name: request.name,
            description: request.description,
            status: request.status,
            issue_type: request.issue_type,
            priority: request.priority,
            urgency: request.urgency,
        }
    }
}

/// Request body for updating a ticket. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default, rename = "type")]
    pub issue_type: Option<IssueType>,
    #[serde(default)]
    pub priority: Option<IssuePriority>,
    #[serde(default)]
    pub urgency: Option<IssueUrgency>,
    #[serde(default)]
    pub actual_resolution_time: Option<DateTime<Utc>>,
}

impl From<UpdateTicketRequest> for TicketPatch {
    fn from(request: UpdateTicketRequest) -> Self {
        TicketPatch {
            name: request.name,
            description: request.description,
            status: request.status,
            issue_type: request.issue_type,
            priority: request.priority,
            urgency: request.urgency,
            actual_resolution_time: request.actual_resolution_time,
        }
    }
}

/// The caller's tickets with their status counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsWithStatsResponse {
    pub tickets: Vec<Ticket>,
    pub stats: TicketStats,
}

/// `{"tickets": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketListResponse<T> {
    pub tickets: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: TicketStats,
}

pub type CategoriesResponse = TicketListResponse<CategoryCount>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayStatsResponse {
    pub data: TodayStats,
}

// =============================================================================
// Users and events
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

/// Request body for scheduling a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_type: String,
    pub event_name: String,
    pub date: NaiveDate,
}

// =============================================================================
// Envelopes
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"message": ..., "data": ...}` envelope used by the forecast routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> MessageDataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup("ana", "ana@example.com", "secret").validate().is_ok());
        assert!(signup(" ", "ana@example.com", "secret").validate().is_err());
        assert!(signup("ana", "ana.example.com", "secret").validate().is_err());
        assert!(signup("ana", "ana@example.com", "short").validate().is_err());
    }

    #[test]
    fn test_update_request_accepts_partial_body() {
        let request: UpdateTicketRequest = serde_json::from_str(
            r#"{"status": "resolved", "actual_resolution_time": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(request.status, Some(TicketStatus::Resolved));
        assert!(request.issue_type.is_none());
        assert!(request.actual_resolution_time.is_some());
    }

    #[test]
    fn test_create_event_request_is_camel_case() {
        let request: CreateEventRequest = serde_json::from_str(
            r#"{"eventType": "Public Holiday", "eventName": "Labour Day", "date": "2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(request.event_type, "Public Holiday");
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
