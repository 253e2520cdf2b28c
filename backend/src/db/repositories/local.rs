//! In-memory local repository implementation.
//!
//! Stores every aggregate in ordered maps behind a single `RwLock`, giving fast,
//! deterministic and isolated behaviour for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
/// ```
/// use helpdesk::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.ticket_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    tickets: BTreeMap<TicketId, Ticket>,
    events: BTreeMap<EventId, Event>,
    users: BTreeMap<UserId, User>,

    next_ticket_id: i64,
    next_event_id: i64,
    next_user_id: i64,

    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tickets: BTreeMap::new(),
            events: BTreeMap::new(),
            users: BTreeMap::new(),
            next_ticket_id: 1,
            next_event_id: 1,
            next_user_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn ticket_count(&self) -> usize {
        self.data.read().tickets.len()
    }

    pub fn event_count(&self) -> usize {
        self.data.read().events.len()
    }

    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    /// Insert a fully formed ticket, keeping its id.
    ///
    /// Lets tests seed tickets with arbitrary creation and resolution times.
    pub fn insert_ticket(&self, ticket: Ticket) {
        let mut data = self.data.write();
        data.next_ticket_id = data.next_ticket_id.max(ticket.id.value() + 1);
        data.tickets.insert(ticket.id, ticket);
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn name_taken(data: &LocalData, name: &str, except: Option<TicketId>) -> bool {
    data.tickets
        .values()
        .any(|t| t.name == name && Some(t.id) != except)
}

#[async_trait]
impl TicketRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> RepositoryResult<Ticket> {
        self.check_health()?;
        let mut data = self.data.write();

        if name_taken(&data, &ticket.name, None) {
            return Err(RepositoryError::conflict_with_context(
                format!("Ticket name '{}' already exists", ticket.name),
                ErrorContext::new("create_ticket").with_entity("ticket"),
            ));
        }

        let id = TicketId(data.next_ticket_id);
        data.next_ticket_id += 1;

        let stored = Ticket {
            id,
            user_id: ticket.user_id,
            name: ticket.name.clone(),
            description: ticket.description.clone(),
            status: ticket.status,
            issue_type: ticket.issue_type,
            priority: ticket.priority,
            urgency: ticket.urgency,
            expected_resolution_time: ticket.expected_resolution_time,
            actual_resolution_time: None,
            date: ticket.date,
        };
        data.tickets.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_ticket(&self, id: TicketId) -> RepositoryResult<Ticket> {
        self.check_health()?;
        self.data.read().tickets.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Ticket not found",
                ErrorContext::new("get_ticket")
                    .with_entity("ticket")
                    .with_entity_id(id),
            )
        })
    }

    async fn update_ticket(&self, ticket: &Ticket) -> RepositoryResult<Ticket> {
        self.check_health()?;
        let mut data = self.data.write();

        if !data.tickets.contains_key(&ticket.id) {
            return Err(RepositoryError::not_found_with_context(
                "Ticket not found",
                ErrorContext::new("update_ticket")
                    .with_entity("ticket")
                    .with_entity_id(ticket.id),
            ));
        }
        if name_taken(&data, &ticket.name, Some(ticket.id)) {
            return Err(RepositoryError::conflict_with_context(
                format!("Ticket name '{}' already exists", ticket.name),
                ErrorContext::new("update_ticket")
                    .with_entity("ticket")
                    .with_entity_id(ticket.id),
            ));
        }

        data.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: TicketId) -> RepositoryResult<()> {
        self.check_health()?;
        match self.data.write().tickets.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                "Ticket not found",
                ErrorContext::new("delete_ticket")
                    .with_entity("ticket")
                    .with_entity_id(id),
            )),
        }
    }

    async fn list_tickets(&self, owner: Option<UserId>) -> RepositoryResult<Vec<Ticket>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .tickets
            .values()
            .filter(|t| owner.map_or(true, |o| t.user_id == o))
            .cloned()
            .collect())
    }

    async fn list_tickets_in_range(
        &self,
        criteria: &TicketCriteria,
    ) -> RepositoryResult<Vec<Ticket>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .tickets
            .values()
            .filter(|t| criteria.matches(t.date.date_naive(), t.user_id))
            .cloned()
            .collect())
    }

    async fn delete_tickets_for_user(&self, owner: UserId) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let before = data.tickets.len();
        data.tickets.retain(|_, t| t.user_id != owner);
        Ok(before - data.tickets.len())
    }
}

#[async_trait]
impl EventRepository for LocalRepository {
    async fn create_event(&self, event: &NewEvent) -> RepositoryResult<Event> {
        self.check_health()?;
        let mut data = self.data.write();

        let duplicate = data
            .events
            .values()
            .any(|e| e.user_id == event.user_id && e.event_details == event.details);
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                "Event already exists",
                ErrorContext::new("create_event")
                    .with_entity("event")
                    .with_details(format!(
                        "{} / {} / {}",
                        event.details.event_type, event.details.event_name, event.details.date
                    )),
            ));
        }

        let id = EventId(data.next_event_id);
        data.next_event_id += 1;

        let stored = Event {
            id,
            user_id: event.user_id,
            event_details: event.details.clone(),
        };
        data.events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        self.check_health()?;
        Ok(self.data.read().events.values().cloned().collect())
    }

    async fn delete_event(&self, id: EventId) -> RepositoryResult<()> {
        self.check_health()?;
        match self.data.write().events.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                "Event not found",
                ErrorContext::new("delete_event")
                    .with_entity("event")
                    .with_entity_id(id),
            )),
        }
    }

    async fn list_events_in_range(&self, range: &DateRange) -> RepositoryResult<Vec<Event>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .events
            .values()
            .filter(|e| range.contains(e.event_details.date))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();

        if data.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::conflict_with_context(
                "Email already exists",
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }
        if data.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::conflict_with_context(
                "Username already exists",
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }

        let id = UserId(data.next_user_id);
        data.next_user_id += 1;

        let stored = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created: Utc::now(),
        };
        data.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.check_health()?;
        self.data.read().users.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "User not found",
                ErrorContext::new("get_user")
                    .with_entity("user")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        self.check_health()?;
        Ok(self.data.read().users.values().cloned().collect())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.check_health()?;
        match self.data.write().users.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                "User not found",
                ErrorContext::new("delete_user")
                    .with_entity("user")
                    .with_entity_id(id),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn new_ticket(name: &str, owner: i64) -> NewTicket {
        NewTicket {
            user_id: UserId(owner),
            name: name.to_string(),
            description: "details".to_string(),
            status: TicketStatus::Active,
            issue_type: IssueType::AccessRequest,
            priority: IssuePriority::Medium,
            urgency: IssueUrgency::Moderate,
            expected_resolution_time: None,
            date: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
        }
    }

    fn new_event(kind: &str, name: &str, date: NaiveDate) -> NewEvent {
        NewEvent {
            user_id: UserId(1),
            details: EventDetails {
                event_type: kind.to_string(),
                event_name: name.to_string(),
                date,
            },
        }
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
            role: UserRole::Client,
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        assert!(matches!(
            repo.list_tickets(None).await,
            Err(RepositoryError::ConnectionError { .. })
        ));
    }

    #[tokio::test]
    async fn test_ticket_crud() {
        let repo = LocalRepository::new();

        let created = repo.create_ticket(&new_ticket("printer", 1)).await.unwrap();
        assert_eq!(created.id, TicketId(1));
        assert_eq!(created.actual_resolution_time, None);

        let mut fetched = repo.get_ticket(created.id).await.unwrap();
        assert_eq!(fetched, created);

        fetched.status = TicketStatus::Pending;
        repo.update_ticket(&fetched).await.unwrap();
        assert_eq!(
            repo.get_ticket(created.id).await.unwrap().status,
            TicketStatus::Pending
        );

        repo.delete_ticket(created.id).await.unwrap();
        assert!(matches!(
            repo.get_ticket(created.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete_ticket(created.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_ticket_name_is_unique() {
        let repo = LocalRepository::new();
        repo.create_ticket(&new_ticket("printer", 1)).await.unwrap();
        let other = repo.create_ticket(&new_ticket("laptop", 1)).await.unwrap();

        assert!(matches!(
            repo.create_ticket(&new_ticket("printer", 2)).await,
            Err(RepositoryError::Conflict { .. })
        ));

        let mut renamed = other.clone();
        renamed.name = "printer".to_string();
        assert!(matches!(
            repo.update_ticket(&renamed).await,
            Err(RepositoryError::Conflict { .. })
        ));
        // Saving under its own name is fine
        repo.update_ticket(&other).await.unwrap();
    }

    #[tokio::test]
    async fn test_tickets_in_range_respect_owner() {
        let repo = LocalRepository::new();
        repo.create_ticket(&new_ticket("a", 1)).await.unwrap();
        repo.create_ticket(&new_ticket("b", 2)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let range = DateRange::new(day, day).unwrap();

        let all = repo
            .list_tickets_in_range(&TicketCriteria::new(range))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let mine = repo
            .list_tickets_in_range(&TicketCriteria::for_owner(range, UserId(2)))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "b");

        let next_day = day.succ_opt().unwrap();
        let empty = repo
            .list_tickets_in_range(&TicketCriteria::new(DateRange::new(next_day, next_day).unwrap()))
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_delete_tickets_for_user() {
        let repo = LocalRepository::new();
        repo.create_ticket(&new_ticket("a", 1)).await.unwrap();
        repo.create_ticket(&new_ticket("b", 1)).await.unwrap();
        repo.create_ticket(&new_ticket("c", 2)).await.unwrap();

        assert_eq!(repo.delete_tickets_for_user(UserId(1)).await.unwrap(), 2);
        assert_eq!(repo.ticket_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_event_rejected() {
        let repo = LocalRepository::new();
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();

        repo.create_event(&new_event("Holiday", "Christmas", date))
            .await
            .unwrap();
        assert!(matches!(
            repo.create_event(&new_event("Holiday", "Christmas", date)).await,
            Err(RepositoryError::Conflict { .. })
        ));
        // Same name on another date is a different event
        repo.create_event(&new_event("Holiday", "Christmas", date.succ_opt().unwrap()))
            .await
            .unwrap();
        assert_eq!(repo.event_count(), 2);
    }

    #[tokio::test]
    async fn test_events_in_range() {
        let repo = LocalRepository::new();
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        repo.create_event(&new_event("Holiday", "one", d(1))).await.unwrap();
        repo.create_event(&new_event("Holiday", "two", d(15))).await.unwrap();
        repo.create_event(&new_event("Holiday", "three", d(31))).await.unwrap();

        let events = repo
            .list_events_in_range(&DateRange::new(d(1), d(15)).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = events.iter().map(|e| e.event_details.event_name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_user_uniqueness_and_lookup() {
        let repo = LocalRepository::new();
        let ana = repo.create_user(&new_user("ana")).await.unwrap();

        assert!(matches!(
            repo.create_user(&new_user("ana")).await,
            Err(RepositoryError::Conflict { .. })
        ));

        let found = repo.find_user_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(ana.id));
        assert!(repo.find_user_by_email("nobody@example.com").await.unwrap().is_none());

        repo.delete_user(ana.id).await.unwrap();
        assert!(matches!(
            repo.get_user(ana.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_ticket_advances_id_counter() {
        let repo = LocalRepository::new();
        let seeded = repo.create_ticket(&new_ticket("seed", 1)).await.unwrap();
        let mut copy = seeded.clone();
        copy.id = TicketId(10);
        copy.name = "imported".to_string();
        repo.insert_ticket(copy);

        let next = repo.create_ticket(&new_ticket("next", 1)).await.unwrap();
        assert_eq!(next.id, TicketId(11));
    }
}
