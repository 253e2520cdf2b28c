use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{events, tickets, users};
use crate::api::{
    Event, EventDetails, EventId, NewEvent, NewTicket, NewUser, Ticket, TicketId, User, UserId,
};
use crate::db::repository::{RepositoryError, RepositoryResult};

fn parse_label<T: FromStr<Err = String>>(column: &str, value: &str) -> RepositoryResult<T> {
    value
        .parse()
        .map_err(|e: String| RepositoryError::internal(format!("Invalid {column}: {e}")))
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl From<&NewUser> for NewUserRow {
    fn from(user: &NewUser) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        Ok(User {
            id: UserId(row.id),
            role: parse_label("role", &row.role)?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created: row.created,
        })
    }
}

// =============================================================================
// Tickets
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub issue_type: String,
    pub priority: String,
    pub urgency: String,
    pub expected_resolution_time: Option<DateTime<Utc>>,
    pub actual_resolution_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(treat_none_as_null = true)]
pub struct TicketChangeset {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub issue_type: String,
    pub priority: String,
    pub urgency: String,
    pub expected_resolution_time: Option<DateTime<Utc>>,
    pub actual_resolution_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&NewTicket> for TicketChangeset {
    fn from(ticket: &NewTicket) -> Self {
        Self {
            user_id: ticket.user_id.value(),
            name: ticket.name.clone(),
            description: ticket.description.clone(),
            status: ticket.status.as_str().to_string(),
            issue_type: ticket.issue_type.as_str().to_string(),
            priority: ticket.priority.as_str().to_string(),
            urgency: ticket.urgency.as_str().to_string(),
            expected_resolution_time: ticket.expected_resolution_time,
            actual_resolution_time: None,
            created_at: ticket.date,
        }
    }
}

impl From<&Ticket> for TicketChangeset {
    fn from(ticket: &Ticket) -> Self {
        Self {
            user_id: ticket.user_id.value(),
            name: ticket.name.clone(),
            description: ticket.description.clone(),
            status: ticket.status.as_str().to_string(),
            issue_type: ticket.issue_type.as_str().to_string(),
            priority: ticket.priority.as_str().to_string(),
            urgency: ticket.urgency.as_str().to_string(),
            expected_resolution_time: ticket.expected_resolution_time,
            actual_resolution_time: ticket.actual_resolution_time,
            created_at: ticket.date,
        }
    }
}

impl TryFrom<TicketRow> for Ticket {
    type Error = RepositoryError;

    fn try_from(row: TicketRow) -> RepositoryResult<Self> {
        Ok(Ticket {
            id: TicketId(row.id),
            user_id: UserId(row.user_id),
            status: parse_label("status", &row.status)?,
            issue_type: parse_label("issue_type", &row.issue_type)?,
            priority: parse_label("priority", &row.priority)?,
            urgency: parse_label("urgency", &row.urgency)?,
            name: row.name,
            description: row.description,
            expected_resolution_time: row.expected_resolution_time,
            actual_resolution_time: row.actual_resolution_time,
            date: row.created_at,
        })
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: i64,
    pub user_id: i64,
    pub event_type: String,
    pub event_name: String,
    pub event_date: NaiveDate,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow {
    pub user_id: i64,
    pub event_type: String,
    pub event_name: String,
    pub event_date: NaiveDate,
}

impl From<&NewEvent> for NewEventRow {
    fn from(event: &NewEvent) -> Self {
        Self {
            user_id: event.user_id.value(),
            event_type: event.details.event_type.clone(),
            event_name: event.details.event_name.clone(),
            event_date: event.details.date,
        }
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId(row.id),
            user_id: UserId(row.user_id),
            event_details: EventDetails {
                event_type: row.event_type,
                event_name: row.event_name,
                date: row.event_date,
            },
        }
    }
}
