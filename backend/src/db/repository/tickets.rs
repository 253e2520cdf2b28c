//! Ticket repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{NewTicket, Ticket, TicketCriteria, TicketId, UserId};

/// Storage operations for support tickets.
///
/// Implementations must be `Send + Sync` to be shared across handlers.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backing store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Ticket CRUD ====================

    /// Insert a ticket and return it with its assigned id.
    ///
    /// # Errors
    /// * `Conflict` - a ticket with the same name exists
    async fn create_ticket(&self, ticket: &NewTicket) -> RepositoryResult<Ticket>;

    /// Retrieve a ticket by id.
    ///
    /// # Errors
    /// * `NotFound` - no ticket has this id
    async fn get_ticket(&self, id: TicketId) -> RepositoryResult<Ticket>;

    /// Replace the stored state of an existing ticket.
    ///
    /// # Errors
    /// * `NotFound` - no ticket has `ticket.id`
    /// * `Conflict` - the new name is taken by another ticket
    async fn update_ticket(&self, ticket: &Ticket) -> RepositoryResult<Ticket>;

    /// Delete a ticket by id.
    ///
    /// # Errors
    /// * `NotFound` - no ticket has this id
    async fn delete_ticket(&self, id: TicketId) -> RepositoryResult<()>;

    // ==================== Queries ====================

    /// List tickets, optionally restricted to one owner, oldest first.
    async fn list_tickets(&self, owner: Option<UserId>) -> RepositoryResult<Vec<Ticket>>;

    /// List tickets whose creation day falls within the criteria range.
    async fn list_tickets_in_range(&self, criteria: &TicketCriteria)
        -> RepositoryResult<Vec<Ticket>>;

    /// Delete every ticket owned by a user, returning how many were removed.
    async fn delete_tickets_for_user(&self, owner: UserId) -> RepositoryResult<usize>;
}
