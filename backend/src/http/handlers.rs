//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use super::dto::{
    AuthResponse, CategoriesResponse, CreateEventRequest, CreateTicketRequest, EventsResponse,
    HealthResponse, LoginRequest, MessageDataResponse, MessageResponse, SignupRequest,
    StatsResponse, TicketListResponse, TicketsWithStatsResponse, TodayStatsResponse,
    UpdateTicketRequest, UsersResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    DailyCountSeries, Event, EventDetails, EventId, ForecastSeries, NewEvent, NewUser, Ticket,
    TicketId, TicketWithOwner, UserId, UserRole,
};
use crate::auth::{hash_password, verify_password, AuthError, AuthUser};
use crate::db::repository::{EventRepository, RepositoryError, TicketRepository, UserRepository};
use crate::db::services as db_services;
use crate::services::{compute_ticket_stats, dashboard, group_by_issue_type, tickets, today_stats};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /
pub async fn root() -> &'static str {
    "API is running..."
}

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Auth
// =============================================================================

/// POST /api/signup
///
/// Register a client account and return an access token for it.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> HandlerResult<AuthResponse> {
    request.validate().map_err(AppError::BadRequest)?;

    let repo = state.repository.as_ref();
    if repo.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let new_user = NewUser {
        username: request.username.trim().to_string(),
        email: request.email,
        password_hash: hash_password(&request.password)?,
        role: UserRole::default(),
    };
    let user = repo.create_user(&new_user).await.map_err(|e| match e {
        RepositoryError::Conflict { message, .. } => AppError::BadRequest(message),
        other => other.into(),
    })?;

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, "User signed up");
    Ok(Json(AuthResponse { token, user }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<AuthResponse> {
    let user = state
        .repository
        .find_user_by_email(&request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.issue(&user)?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(AuthResponse { token, user }))
}

// =============================================================================
// Tickets
// =============================================================================

/// GET /api/tickets
///
/// The caller's own tickets with their status counters.
pub async fn list_own_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> HandlerResult<TicketsWithStatsResponse> {
    let tickets = state.repository.list_tickets(Some(user.id)).await?;
    let stats = compute_ticket_stats(&tickets);
    info!("Tickets Fetched Successfully");
    Ok(Json(TicketsWithStatsResponse { tickets, stats }))
}

/// GET /api/tickets/all
pub async fn list_all_tickets(
    State(state): State<AppState>,
) -> HandlerResult<TicketListResponse<TicketWithOwner>> {
    let tickets = db_services::list_tickets_with_owners(state.repository.as_ref()).await?;
    info!("All tickets fetched ({})", tickets.len());
    Ok(Json(TicketListResponse { tickets }))
}

/// POST /api/tickets
///
/// Create a ticket owned by the caller with a predicted resolution time.
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    let ticket = tickets::create_ticket(
        state.repository.as_ref(),
        state.forecast.as_ref(),
        user.id,
        request.into(),
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// PUT /api/tickets/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTicketRequest>,
) -> HandlerResult<Ticket> {
    let ticket = tickets::update_ticket(
        state.repository.as_ref(),
        state.forecast.as_ref(),
        TicketId::new(id),
        request.into(),
        Utc::now(),
    )
    .await?;

    Ok(Json(ticket))
}

/// DELETE /api/tickets/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    tickets::delete_ticket(state.repository.as_ref(), TicketId::new(id)).await?;
    Ok(Json(MessageResponse::new("Ticket deleted successfully")))
}

/// GET /api/tickets/monthly-tickets
///
/// Daily ticket counts for the last 30 days.
pub async fn monthly_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> HandlerResult<DailyCountSeries> {
    let counts = dashboard::monthly_ticket_counts(
        state.repository.as_ref(),
        user.id,
        user.role,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(counts))
}

/// GET /api/tickets/top-cards
pub async fn top_cards(
    State(state): State<AppState>,
    user: AuthUser,
) -> HandlerResult<StatsResponse> {
    let tickets =
        db_services::visible_tickets(state.repository.as_ref(), user.id, user.role).await?;
    info!("Tickets Top Card Data Fetched Successfully");
    Ok(Json(StatsResponse {
        stats: compute_ticket_stats(&tickets),
    }))
}

/// GET /api/tickets/employee/{id}
pub async fn employee_tickets(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<TicketListResponse<Ticket>> {
    let tickets = state.repository.list_tickets(Some(UserId::new(id))).await?;
    info!("Tickets fetched for user {}", id);
    Ok(Json(TicketListResponse { tickets }))
}

/// GET /api/tickets/man-hours
pub async fn man_hours(
    State(state): State<AppState>,
) -> HandlerResult<MessageDataResponse<dashboard::ManHours>> {
    let data = dashboard::man_hours(
        state.repository.as_ref(),
        state.forecast.as_ref(),
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(MessageDataResponse::new(
        "Fetched man hours successfully",
        data,
    )))
}

/// GET /api/tickets/categories
pub async fn categories(State(state): State<AppState>) -> HandlerResult<CategoriesResponse> {
    let tickets = state.repository.list_tickets(None).await?;
    Ok(Json(CategoriesResponse {
        tickets: group_by_issue_type(&tickets),
    }))
}

/// GET /api/tickets/today-stats
pub async fn today_ticket_stats(
    State(state): State<AppState>,
) -> HandlerResult<TodayStatsResponse> {
    let tickets = state.repository.list_tickets(None).await?;
    Ok(Json(TodayStatsResponse {
        data: today_stats(&tickets, Utc::now()),
    }))
}

// =============================================================================
// Users
// =============================================================================

/// GET /api/users
///
/// Every account except administrators.
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<UsersResponse> {
    let users = db_services::list_client_users(state.repository.as_ref()).await?;
    Ok(Json(UsersResponse { users }))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    db_services::delete_user_cascade(state.repository.as_ref(), UserId::new(id)).await?;
    Ok(Json(MessageResponse::new(
        "User and associated tickets deleted successfully",
    )))
}

// =============================================================================
// Event Schedule
// =============================================================================

/// GET /api/event-schedule
pub async fn list_events(State(state): State<AppState>) -> HandlerResult<EventsResponse> {
    let events = state.repository.list_events().await?;
    Ok(Json(EventsResponse { events }))
}

/// POST /api/event-schedule
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let new_event = NewEvent {
        user_id: user.id,
        details: EventDetails {
            event_type: request.event_type,
            event_name: request.event_name,
            date: request.date,
        },
    };
    let event = state.repository.create_event(&new_event).await?;
    info!("New event created with ID: {}", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// DELETE /api/event-schedule/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<MessageResponse> {
    state.repository.delete_event(EventId::new(id)).await?;
    info!("Event deleted: {}", id);
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

/// GET /api/event-schedule/forecast/{filter}
///
/// Ticket volume forecast from recent counts and calendar events.
pub async fn volume_forecast(
    State(state): State<AppState>,
    Path(filter): Path<String>,
) -> HandlerResult<MessageDataResponse<ForecastSeries>> {
    let filter = dashboard::parse_filter(&filter)?;
    let data = dashboard::forecast_ticket_volume(
        state.repository.as_ref(),
        state.forecast.as_ref(),
        filter,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(MessageDataResponse::new(
        "Fetched forecast successfully",
        data,
    )))
}

/// GET /api/event-schedule/pre-trained/{filter}
pub async fn pretrained_forecast(
    State(state): State<AppState>,
    Path(filter): Path<String>,
) -> HandlerResult<MessageDataResponse<ForecastSeries>> {
    let filter = dashboard::parse_filter(&filter)?;
    let data = dashboard::forecast_pretrained(
        state.forecast.as_ref(),
        filter,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(MessageDataResponse::new(
        "Fetched pre-trained forecast successfully",
        data,
    )))
}
