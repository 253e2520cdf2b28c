//! Ticket lifecycle: creation, update and deletion.
//!
//! Creating a ticket, or changing any of the fields the resolution model
//! reads, asks the forecasting service for a fresh resolution estimate.

use chrono::{DateTime, TimeDelta, Utc};
use log::info;

use crate::api::{
    IssuePriority, IssueType, IssueUrgency, NewTicket, Ticket, TicketId, TicketStatus, UserId,
};
use crate::db::repository::{FullRepository, RepositoryError};
use crate::services::forecast::{ForecastError, ForecastService, ResolutionFeatures};

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Actual Resolution Time is required when status is resolved")]
    MissingResolutionTime,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// Caller-supplied fields of a new ticket.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub name: String,
    pub description: String,
    /// Defaults to active.
    pub status: Option<TicketStatus>,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub urgency: IssueUrgency,
}

/// Partial update of a ticket. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub issue_type: Option<IssueType>,
    pub priority: Option<IssuePriority>,
    pub urgency: Option<IssueUrgency>,
    pub actual_resolution_time: Option<DateTime<Utc>>,
}

impl TicketPatch {
    /// Whether the patch changes an input of the resolution model.
    fn changes_features(&self, ticket: &Ticket) -> bool {
        self.issue_type.map_or(false, |v| v != ticket.issue_type)
            || self.priority.map_or(false, |v| v != ticket.priority)
            || self.urgency.map_or(false, |v| v != ticket.urgency)
    }

    fn apply(self, ticket: &mut Ticket) {
        if let Some(name) = self.name {
            ticket.name = name;
        }
        if let Some(description) = self.description {
            ticket.description = description;
        }
        if let Some(status) = self.status {
            ticket.status = status;
        }
        if let Some(issue_type) = self.issue_type {
            ticket.issue_type = issue_type;
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(urgency) = self.urgency {
            ticket.urgency = urgency;
        }
        if self.actual_resolution_time.is_some() {
            ticket.actual_resolution_time = self.actual_resolution_time;
        }
    }
}

fn features_of(ticket: &Ticket) -> ResolutionFeatures {
    ResolutionFeatures {
        issue_type: ticket.issue_type,
        urgency: ticket.urgency,
        priority: ticket.priority,
    }
}

/// `now` plus a predicted number of hours, at millisecond precision.
///
/// Predictions that are not finite or fall outside the representable date
/// range are reported as an unavailable forecast.
fn expected_resolution(now: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>, ForecastError> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(ForecastError::unavailable(
            "/predict",
            format!("unusable resolution time: {hours}"),
        ));
    }

    TimeDelta::try_milliseconds(millis as i64)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| {
            ForecastError::unavailable("/predict", format!("resolution time out of range: {hours}"))
        })
}

/// Create a ticket owned by `owner` with a predicted resolution time.
///
/// A prediction failure fails the creation; nothing is stored.
pub async fn create_ticket<R, F>(
    repo: &R,
    forecast: &F,
    owner: UserId,
    draft: TicketDraft,
    now: DateTime<Utc>,
) -> Result<Ticket, TicketError>
where
    R: FullRepository + ?Sized,
    F: ForecastService + ?Sized,
{
    let features = ResolutionFeatures {
        issue_type: draft.issue_type,
        urgency: draft.urgency,
        priority: draft.priority,
    };
    let hours = forecast.predict_resolution_hours(&features).await?;
    let expected = expected_resolution(now, hours)?;

    let new_ticket = NewTicket {
        user_id: owner,
        name: draft.name,
        description: draft.description,
        status: draft.status.unwrap_or_default(),
        issue_type: draft.issue_type,
        priority: draft.priority,
        urgency: draft.urgency,
        expected_resolution_time: Some(expected),
        date: now,
    };

    let ticket = repo.create_ticket(&new_ticket).await?;
    info!("New ticket created with ID: {}", ticket.id);
    Ok(ticket)
}

/// Apply `patch` to ticket `id`.
///
/// Changing the type, priority or urgency restarts the ticket: its date
/// becomes `now`, the expected resolution is predicted again and any actual
/// resolution time is dropped. A non-resolved ticket never keeps an actual
/// resolution time.
pub async fn update_ticket<R, F>(
    repo: &R,
    forecast: &F,
    id: TicketId,
    patch: TicketPatch,
    now: DateTime<Utc>,
) -> Result<Ticket, TicketError>
where
    R: FullRepository + ?Sized,
    F: ForecastService + ?Sized,
{
    let mut ticket = repo.get_ticket(id).await?;

    if patch.status == Some(TicketStatus::Resolved) && patch.actual_resolution_time.is_none() {
        return Err(TicketError::MissingResolutionTime);
    }

    let repredict = patch.changes_features(&ticket);
    patch.apply(&mut ticket);

    if repredict {
        let hours = forecast.predict_resolution_hours(&features_of(&ticket)).await?;
        ticket.date = now;
        ticket.expected_resolution_time = Some(expected_resolution(now, hours)?);
        ticket.actual_resolution_time = None;
    }

    if !ticket.is_resolved() {
        ticket.actual_resolution_time = None;
    }

    let updated = repo.update_ticket(&ticket).await?;
    info!("Ticket updated: {}", id);
    Ok(updated)
}

pub async fn delete_ticket<R: FullRepository + ?Sized>(
    repo: &R,
    id: TicketId,
) -> Result<(), TicketError> {
    repo.delete_ticket(id).await?;
    info!("Ticket deleted: {}", id);
    Ok(())
}
