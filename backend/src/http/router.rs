//! Router configuration for the HTTP API.
//!
//! Routes fall into three groups sharing one state:
//!
//! | Group | Guard |
//! |---|---|
//! | health, signup, login | none |
//! | own tickets, dashboard counts | `require_auth` |
//! | overview, users, events, forecasts | `require_auth` + `require_admin` |

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers;
use super::state::AppState;
use crate::auth::{require_admin, require_auth};

/// CORS layer for the configured origins; any origin when none are given.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/api/signup", post(handlers::signup))
        .route("/api/login", post(handlers::login));

    let authenticated = Router::new()
        .route(
            "/api/tickets",
            get(handlers::list_own_tickets).post(handlers::create_ticket),
        )
        .route(
            "/api/tickets/{id}",
            put(handlers::update_ticket).delete(handlers::delete_ticket),
        )
        .route("/api/tickets/monthly-tickets", get(handlers::monthly_tickets))
        .route("/api/tickets/top-cards", get(handlers::top_cards))
        .route_layer(from_fn_with_state(state.jwt.clone(), require_auth));

    let admin = Router::new()
        .route("/api/tickets/all", get(handlers::list_all_tickets))
        .route("/api/tickets/employee/{id}", get(handlers::employee_tickets))
        .route("/api/tickets/man-hours", get(handlers::man_hours))
        .route("/api/tickets/categories", get(handlers::categories))
        .route("/api/tickets/today-stats", get(handlers::today_ticket_stats))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/{id}", delete(handlers::delete_user))
        .route(
            "/api/event-schedule",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/api/event-schedule/{id}", delete(handlers::delete_event))
        .route(
            "/api/event-schedule/forecast/{filter}",
            get(handlers::volume_forecast),
        )
        .route(
            "/api/event-schedule/pre-trained/{filter}",
            get(handlers::pretrained_forecast),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.jwt.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
