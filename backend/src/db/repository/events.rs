//! Calendar event repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{DateRange, Event, EventId, NewEvent};

/// Storage operations for scheduled calendar events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert an event.
    ///
    /// # Errors
    /// * `Conflict` - the owner already has an event with the same type, name and date
    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event>;

    /// List all events in insertion order.
    async fn list_events(&self) -> RepositoryResult<Vec<Event>>;

    /// Delete an event by id.
    ///
    /// # Errors
    /// * `NotFound` - no event has this id
    async fn delete_event(&self, id: EventId) -> RepositoryResult<()>;

    /// List events dated within the inclusive range, in insertion order.
    async fn list_events_in_range(&self, range: &DateRange) -> RepositoryResult<Vec<Event>>;
}
