#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::api::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::{EventRepository, RepositoryError, TicketRepository, UserRepository};
    use crate::db::services;

    async fn user(repo: &LocalRepository, name: &str, role: UserRole) -> User {
        repo.create_user(&NewUser {
            username: name.to_string(),
            email: format!("{}@helpdesk.test", name),
            password_hash: "hash".to_string(),
            role,
        })
        .await
        .unwrap()
    }

    async fn ticket(repo: &LocalRepository, name: &str, owner: UserId) -> Ticket {
        repo.create_ticket(&NewTicket {
            user_id: owner,
            name: name.to_string(),
            description: String::new(),
            status: TicketStatus::Active,
            issue_type: IssueType::SoftwareUpdate,
            priority: IssuePriority::Low,
            urgency: IssueUrgency::Scheduled,
            expected_resolution_time: None,
            date: Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(services::health_check(&repo).await.unwrap());
    }

    #[tokio::test]
    async fn test_tickets_with_owners() {
        let repo = LocalRepository::new();
        let ana = user(&repo, "ana", UserRole::Client).await;
        ticket(&repo, "first", ana.id).await;
        ticket(&repo, "orphan", UserId(404)).await;

        let rows = services::list_tickets_with_owners(&repo).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].owner.as_ref().map(|o| o.username.as_str()), Some("ana"));
        assert!(rows[1].owner.is_none());

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["name"], "first");
        assert_eq!(json["owner"]["email"], "ana@helpdesk.test");
    }

    #[tokio::test]
    async fn test_visible_tickets_by_role() {
        let repo = LocalRepository::new();
        let ana = user(&repo, "ana", UserRole::Client).await;
        let boss = user(&repo, "boss", UserRole::Admin).await;
        ticket(&repo, "a", ana.id).await;
        ticket(&repo, "b", boss.id).await;

        let mine = services::visible_tickets(&repo, ana.id, UserRole::Client)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let all = services::visible_tickets(&repo, boss.id, UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_client_users_exclude_admins() {
        let repo = LocalRepository::new();
        user(&repo, "ana", UserRole::Client).await;
        user(&repo, "boss", UserRole::Admin).await;

        let clients = services::list_client_users(&repo).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].username, "ana");
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_tickets() {
        let repo = LocalRepository::new();
        let ana = user(&repo, "ana", UserRole::Client).await;
        let bob = user(&repo, "bob", UserRole::Client).await;
        ticket(&repo, "a1", ana.id).await;
        ticket(&repo, "a2", ana.id).await;
        ticket(&repo, "b1", bob.id).await;

        let removed = services::delete_user_cascade(&repo, ana.id).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.ticket_count(), 1);
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_keeps_scheduled_events() {
        let repo = LocalRepository::new();
        let admin = user(&repo, "root", UserRole::Admin).await;
        ticket(&repo, "r1", admin.id).await;
        repo.create_event(&NewEvent {
            user_id: admin.id,
            details: EventDetails {
                event_type: "Holiday".to_string(),
                event_name: "Summer break".to_string(),
                date: chrono::NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            },
        })
        .await
        .unwrap();

        services::delete_user_cascade(&repo, admin.id).await.unwrap();

        let events = repo.list_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, admin.id);
        assert_eq!(events[0].event_details.event_name, "Summer break");
        assert_eq!(repo.ticket_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_user_keeps_tickets() {
        let repo = LocalRepository::new();
        ticket(&repo, "stray", UserId(9)).await;

        let result = services::delete_user_cascade(&repo, UserId(9)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(repo.ticket_count(), 1);
    }
}
