//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::JwtService;
use crate::db::repository::FullRepository;
use crate::services::forecast::ForecastService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Client of the external forecasting service
    pub forecast: Arc<dyn ForecastService>,
    /// Access token issuer and validator
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        forecast: Arc<dyn ForecastService>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            repository,
            forecast,
            jwt,
        }
    }
}
