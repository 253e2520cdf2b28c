//! Storage for tickets, users and calendar events.
//!
//! Storage is reached through the Repository pattern so the backend can be
//! swapped without touching the service or HTTP layers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP API (axum handlers)                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Cascading user deletion                              │
//! │  - Owner joins for the admin overview                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!           ┌─────────┴──────────┐
//!   ┌───────▼───────┐    ┌───────▼────────┐
//!   │ Local (memory)│    │ Postgres/Diesel│
//!   └───────────────┘    └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use helpdesk::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let clients = services::list_client_users(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The repository is built once by the server and shared through the HTTP
//! state; there is no process-wide instance.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(test)]
#[path = "services_tests.rs"]
mod services_tests;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, EventRepository, FullRepository, RepositoryError, RepositoryResult,
    TicketRepository, UserRepository,
};
