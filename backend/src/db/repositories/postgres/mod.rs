//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{
    DateRange, Event, EventId, NewEvent, NewTicket, NewUser, Ticket, TicketCriteria, TicketId,
    User, UserId,
};
use crate::db::repository::{
    ErrorContext, EventRepository, RepositoryError, RepositoryResult, TicketRepository,
    UserRepository,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation on a blocking thread, retrying transient
    /// failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// Rewrite unique-constraint violations into the messages clients see.
fn with_conflict_message(err: RepositoryError, operation: &str) -> RepositoryError {
    let context = match err.with_operation(operation) {
        RepositoryError::Conflict { context, .. } => context,
        other => return other,
    };
    let message = match context.details.as_deref() {
        Some("users_email_key") => "Email already exists",
        Some("users_username_key") => "Username already exists",
        Some("tickets_name_key") => "Ticket name already exists",
        Some("uq_events_owner_details") => "Event already exists",
        _ => "Record already exists",
    };
    RepositoryError::conflict_with_context(message, context)
}

fn not_found(entity: &str, operation: &str, id: i64) -> RepositoryError {
    let label = format!("{}{} not found", entity[..1].to_uppercase(), &entity[1..]);
    RepositoryError::not_found_with_context(
        label,
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

/// Midnight UTC of `from` and of the day after `to`.
fn day_bounds(range: &DateRange) -> (chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) {
    let start = range.from().and_time(NaiveTime::MIN).and_utc();
    let end = range
        .to()
        .succ_opt()
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (start, end)
}

#[async_trait]
impl TicketRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> RepositoryResult<Ticket> {
        let row = TicketChangeset::from(ticket);
        self.with_conn(move |conn| {
            let inserted: TicketRow = diesel::insert_into(tickets::table)
                .values(&row)
                .returning(TicketRow::as_returning())
                .get_result(conn)
                .map_err(|e| with_conflict_message(map_diesel_error(e), "create_ticket"))?;
            Ticket::try_from(inserted)
        })
        .await
    }

    async fn get_ticket(&self, id: TicketId) -> RepositoryResult<Ticket> {
        self.with_conn(move |conn| {
            let row = tickets::table
                .find(id.value())
                .select(TicketRow::as_select())
                .first::<TicketRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| not_found("ticket", "get_ticket", id.value()))?;
            Ticket::try_from(row)
        })
        .await
    }

    async fn update_ticket(&self, ticket: &Ticket) -> RepositoryResult<Ticket> {
        let id = ticket.id.value();
        let changes = TicketChangeset::from(ticket);
        self.with_conn(move |conn| {
            let row = diesel::update(tickets::table.find(id))
                .set(&changes)
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(conn)
                .optional()
                .map_err(|e| with_conflict_message(map_diesel_error(e), "update_ticket"))?
                .ok_or_else(|| not_found("ticket", "update_ticket", id))?;
            Ticket::try_from(row)
        })
        .await
    }

    async fn delete_ticket(&self, id: TicketId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(tickets::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(not_found("ticket", "delete_ticket", id.value()));
            }
            Ok(())
        })
        .await
    }

    async fn list_tickets(&self, owner: Option<UserId>) -> RepositoryResult<Vec<Ticket>> {
        self.with_conn(move |conn| {
            let mut query = tickets::table
                .select(TicketRow::as_select())
                .order(tickets::id.asc())
                .into_boxed();
            if let Some(owner) = owner {
                query = query.filter(tickets::user_id.eq(owner.value()));
            }
            let rows = query.load::<TicketRow>(conn).map_err(map_diesel_error)?;
            rows.into_iter().map(Ticket::try_from).collect()
        })
        .await
    }

    async fn list_tickets_in_range(
        &self,
        criteria: &TicketCriteria,
    ) -> RepositoryResult<Vec<Ticket>> {
        let (start, end) = day_bounds(&criteria.range);
        let owner = criteria.owner;
        self.with_conn(move |conn| {
            let mut query = tickets::table
                .filter(tickets::created_at.ge(start))
                .filter(tickets::created_at.lt(end))
                .select(TicketRow::as_select())
                .order(tickets::id.asc())
                .into_boxed();
            if let Some(owner) = owner {
                query = query.filter(tickets::user_id.eq(owner.value()));
            }
            let rows = query.load::<TicketRow>(conn).map_err(map_diesel_error)?;
            rows.into_iter().map(Ticket::try_from).collect()
        })
        .await
    }

    async fn delete_tickets_for_user(&self, owner: UserId) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            diesel::delete(tickets::table.filter(tickets::user_id.eq(owner.value())))
                .execute(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl EventRepository for PostgresRepository {
    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        let row = NewEventRow::from(event);
        self.with_conn(move |conn| {
            let inserted: EventRow = diesel::insert_into(events::table)
                .values(&row)
                .returning(EventRow::as_returning())
                .get_result(conn)
                .map_err(|e| with_conflict_message(map_diesel_error(e), "create_event"))?;
            Ok(Event::from(inserted))
        })
        .await
    }

    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        self.with_conn(|conn| {
            let rows = events::table
                .select(EventRow::as_select())
                .order(events::id.asc())
                .load::<EventRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Event::from).collect())
        })
        .await
    }

    async fn delete_event(&self, id: EventId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(events::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(not_found("event", "delete_event", id.value()));
            }
            Ok(())
        })
        .await
    }

    async fn list_events_in_range(&self, range: &DateRange) -> RepositoryResult<Vec<Event>> {
        let (from, to) = (range.from(), range.to());
        self.with_conn(move |conn| {
            let rows = events::table
                .filter(events::event_date.between(from, to))
                .select(EventRow::as_select())
                .order(events::id.asc())
                .load::<EventRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Event::from).collect())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.with_conn(move |conn| {
            let inserted: UserRow = diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map_err(|e| with_conflict_message(map_diesel_error(e), "create_user"))?;
            User::try_from(inserted)
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            users::table
                .filter(users::email.eq(&email))
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(User::try_from)
                .transpose()
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            let row = users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| not_found("user", "get_user", id.value()))?;
            User::try_from(row)
        })
        .await
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.with_conn(|conn| {
            let rows = users::table
                .select(UserRow::as_select())
                .order(users::id.asc())
                .load::<UserRow>(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(User::try_from).collect()
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(users::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(not_found("user", "delete_user", id.value()));
            }
            Ok(())
        })
        .await
    }
}
