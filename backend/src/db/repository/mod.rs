//! Repository trait definitions for storage operations.
//!
//! Storage is split into focused traits, one per aggregate:
//!
//! - [`error`]: Error types shared by all repository operations
//! - [`tickets`]: Ticket CRUD and range queries
//! - [`events`]: Calendar event CRUD and range queries
//! - [`users`]: Account storage and lookup
//!
//! # Trait Composition
//!
//! Handlers and services that need every capability take the [`FullRepository`]
//! bound (or an `Arc<dyn FullRepository>`):
//!
//! ```ignore
//! async fn purge_user(repo: &dyn FullRepository, id: UserId) -> RepositoryResult<()> {
//!     repo.delete_tickets_for_user(id).await?;
//!     repo.delete_user(id).await
//! }
//! ```

pub mod error;
pub mod events;
pub mod tickets;
pub mod users;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use events::EventRepository;
pub use tickets::TicketRepository;
pub use users::UserRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Implemented automatically for any type implementing all three traits.
pub trait FullRepository: TicketRepository + EventRepository + UserRepository {}

impl<T> FullRepository for T where T: TicketRepository + EventRepository + UserRepository {}
