//! In-process application harness driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use helpdesk::api::{ForecastPoint, ForecastSeries, NewUser, User, UserRole};
use helpdesk::auth::{hash_password, JwtService};
use helpdesk::db::{FullRepository, LocalRepository, UserRepository};
use helpdesk::http::{create_router, AppState};
use helpdesk::services::forecast::{
    ForecastError, ForecastService, PretrainedForecastRequest, ResolutionFeatures,
    VolumeForecastRequest,
};

pub const PASSWORD: &str = "correct-horse";

/// Forecast service answering with fixed values.
pub struct FakeForecast {
    pub hours: f64,
    pub volume: ForecastSeries,
    pub pretrained: ForecastSeries,
    pub available: bool,
}

impl FakeForecast {
    pub fn new(hours: f64) -> Self {
        Self {
            hours,
            volume: Vec::new(),
            pretrained: Vec::new(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0.0)
        }
    }

    /// Both series cover the next `values.len()` days.
    pub fn with_series(mut self, volume: &[f64], pretrained: &[f64]) -> Self {
        self.volume = series(volume);
        self.pretrained = series(pretrained);
        self
    }

    fn check(&self) -> Result<(), ForecastError> {
        if self.available {
            Ok(())
        } else {
            Err(ForecastError::Unavailable {
                endpoint: "http://forecast.test".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }
}

fn series(values: &[f64]) -> ForecastSeries {
    let today = Utc::now().date_naive();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let day = today + Duration::days(i as i64 + 1);
            ForecastPoint::new(day.format("%Y-%m-%d").to_string(), *v)
        })
        .collect()
}

#[async_trait]
impl ForecastService for FakeForecast {
    async fn predict_resolution_hours(
        &self,
        _features: &ResolutionFeatures,
    ) -> Result<f64, ForecastError> {
        self.check()?;
        Ok(self.hours)
    }

    async fn forecast_ticket_volume(
        &self,
        _request: &VolumeForecastRequest,
    ) -> Result<ForecastSeries, ForecastError> {
        self.check()?;
        Ok(self.volume.clone())
    }

    async fn forecast_pretrained(
        &self,
        _request: &PretrainedForecastRequest,
    ) -> Result<ForecastSeries, ForecastError> {
        self.check()?;
        Ok(self.pretrained.clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<LocalRepository>,
    pub jwt: Arc<JwtService>,
}

impl TestApp {
    pub fn new(forecast: FakeForecast) -> Self {
        let repo = Arc::new(LocalRepository::new());
        let jwt = Arc::new(JwtService::new("integration-secret", 3600));
        let state = AppState::new(
            repo.clone() as Arc<dyn FullRepository>,
            Arc::new(forecast),
            jwt.clone(),
        );

        Self {
            router: create_router(state, &[]),
            repo,
            jwt,
        }
    }

    /// Store a user with [`PASSWORD`] and return it with a valid token.
    pub async fn user(&self, name: &str, role: UserRole) -> (User, String) {
        let user = self
            .repo
            .create_user(&NewUser {
                username: name.to_string(),
                email: format!("{}@helpdesk.test", name),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
            })
            .await
            .unwrap();
        let token = self.jwt.issue(&user).unwrap();
        (user, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }
}
