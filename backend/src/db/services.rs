//! Repository-agnostic storage operations.
//!
//! These functions hold the cross-aggregate rules that must behave the same
//! on every backend: cascading user deletion, owner joins for the admin
//! overview, and the client-only user listing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / services::dashboard                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  db::services (this module)                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits: Ticket / Event / User               │
//! └───────────────────┬─────────────────────────────────────┘
//!           ┌─────────┴──────────┐
//!   LocalRepository      PostgresRepository
//! ```

use log::info;
use std::collections::HashMap;

use super::repository::{FullRepository, RepositoryResult};
use crate::api::{
    DateRange, Event, Ticket, TicketCriteria, TicketWithOwner, User, UserId, UserRole,
    UserSummary,
};

/// Pass-through to the repository health check.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Every ticket joined with a summary of its owner.
///
/// Tickets whose owner no longer exists carry `owner: None`.
pub async fn list_tickets_with_owners<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<TicketWithOwner>> {
    let tickets = repo.list_tickets(None).await?;
    let owners: HashMap<UserId, UserSummary> = repo
        .list_users()
        .await?
        .iter()
        .map(|user| (user.id, UserSummary::from(user)))
        .collect();

    Ok(tickets
        .into_iter()
        .map(|ticket| {
            let owner = owners.get(&ticket.user_id).cloned();
            TicketWithOwner { ticket, owner }
        })
        .collect())
}

/// Tickets visible to a caller: all of them for admins, their own otherwise.
pub async fn visible_tickets<R: FullRepository + ?Sized>(
    repo: &R,
    caller: UserId,
    role: UserRole,
) -> RepositoryResult<Vec<Ticket>> {
    match role {
        UserRole::Admin => repo.list_tickets(None).await,
        UserRole::Client => repo.list_tickets(Some(caller)).await,
    }
}

pub async fn tickets_in_range<R: FullRepository + ?Sized>(
    repo: &R,
    criteria: &TicketCriteria,
) -> RepositoryResult<Vec<Ticket>> {
    repo.list_tickets_in_range(criteria).await
}

pub async fn events_in_range<R: FullRepository + ?Sized>(
    repo: &R,
    range: &DateRange,
) -> RepositoryResult<Vec<Event>> {
    repo.list_events_in_range(range).await
}

/// Users without the admin role, ordered by id.
pub async fn list_client_users<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<User>> {
    let users = repo.list_users().await?;
    Ok(users
        .into_iter()
        .filter(|user| user.role != UserRole::Admin)
        .collect())
}

/// Delete a user and every ticket they own. Events the user scheduled are
/// kept.
///
/// Fails with `NotFound` when the user does not exist. Returns the number
/// of tickets removed.
pub async fn delete_user_cascade<R: FullRepository + ?Sized>(
    repo: &R,
    id: UserId,
) -> RepositoryResult<usize> {
    repo.get_user(id).await?;
    let removed = repo.delete_tickets_for_user(id).await?;
    repo.delete_user(id).await?;
    info!("Deleted user {} and {} ticket(s)", id, removed);
    Ok(removed)
}
