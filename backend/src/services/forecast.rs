//! Client for the external forecasting service.
//!
//! The service exposes three endpoints:
//!
//! | Operation | HTTP |
//! |---|---|
//! | resolution-time prediction | `GET /predict` (query parameters) |
//! | ticket volume forecast | `POST /predict_ticket_volume` |
//! | pre-trained volume forecast | `POST /predict_ticket_volume_using_external` |
//!
//! Failures are reported as [`ForecastError::Unavailable`] and never retried.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{ChartTrend, IssuePriority, IssueType, IssueUrgency};
use crate::models::{DailyCountSeries, EventCategoryMap, ForecastSeries};

/// Fixed model inputs sent with every resolution-time prediction.
pub const CURRENT_TICKET_VOLUME: u32 = 1000;
pub const HOLIDAY_SEASON: u8 = 1;
pub const PRODUCT_LAUNCH_NEAR: u8 = 0;

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Forecast service unavailable at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },
}

impl ForecastError {
    pub(crate) fn unavailable(endpoint: &str, reason: impl ToString) -> Self {
        Self::Unavailable {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Inputs of a resolution-time prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionFeatures {
    pub issue_type: IssueType,
    pub urgency: IssueUrgency,
    pub priority: IssuePriority,
}

/// Body of a ticket volume forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeForecastRequest {
    pub holidays: BTreeMap<NaiveDate, String>,
    pub product_launches: BTreeMap<NaiveDate, String>,
    pub ticket_data: DailyCountSeries,
    pub range: ChartTrend,
}

impl VolumeForecastRequest {
    pub fn new(events: EventCategoryMap, ticket_data: DailyCountSeries, range: ChartTrend) -> Self {
        Self {
            holidays: events.holidays,
            product_launches: events.product_launches,
            ticket_data,
            range,
        }
    }
}

/// Body of a pre-trained forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PretrainedForecastRequest {
    /// Serialized as `YYYY-MM-DD`.
    pub current_date: NaiveDate,
    pub date_range: ChartTrend,
}

#[derive(Debug, Deserialize)]
struct ResolutionPrediction {
    resolution_time: f64,
}

/// Forecasting operations used by the ticket and dashboard services.
#[async_trait]
pub trait ForecastService: Send + Sync {
    /// Predicted resolution time in hours.
    async fn predict_resolution_hours(
        &self,
        features: &ResolutionFeatures,
    ) -> Result<f64, ForecastError>;

    /// Forecast of ticket volume from recent counts and calendar events.
    async fn forecast_ticket_volume(
        &self,
        request: &VolumeForecastRequest,
    ) -> Result<ForecastSeries, ForecastError>;

    /// Forecast of ticket volume from the service's pre-trained model.
    async fn forecast_pretrained(
        &self,
        request: &PretrainedForecastRequest,
    ) -> Result<ForecastSeries, ForecastError>;
}

/// [`ForecastService`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpForecastClient {
    client: Client,
    base_url: String,
}

impl HttpForecastClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ForecastError> {
        if !response.status().is_success() {
            return Err(ForecastError::unavailable(
                endpoint,
                format!("status {}", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ForecastError::unavailable(endpoint, format!("invalid body: {e}")))
    }

    async fn post_forecast<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ForecastSeries, ForecastError> {
        let endpoint = self.endpoint(path);
        let response = self
            .client
            .post(&endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| ForecastError::unavailable(&endpoint, e))?;

        Self::decode(&endpoint, response).await
    }
}

#[async_trait]
impl ForecastService for HttpForecastClient {
    async fn predict_resolution_hours(
        &self,
        features: &ResolutionFeatures,
    ) -> Result<f64, ForecastError> {
        let endpoint = self.endpoint("/predict");
        let volume = CURRENT_TICKET_VOLUME.to_string();
        let holiday = HOLIDAY_SEASON.to_string();
        let launch = PRODUCT_LAUNCH_NEAR.to_string();

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("Issue Type", features.issue_type.as_str()),
                ("Urgency", features.urgency.as_str()),
                ("Priority", features.priority.as_str()),
                ("Current Ticket Volume", volume.as_str()),
                ("Holiday Season", holiday.as_str()),
                ("Product Launch Near", launch.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ForecastError::unavailable(&endpoint, e))?;

        let prediction: ResolutionPrediction = Self::decode(&endpoint, response).await?;
        log::debug!(
            "Predicted {:.2}h for {} / {} / {}",
            prediction.resolution_time,
            features.issue_type,
            features.urgency,
            features.priority
        );
        Ok(prediction.resolution_time)
    }

    async fn forecast_ticket_volume(
        &self,
        request: &VolumeForecastRequest,
    ) -> Result<ForecastSeries, ForecastError> {
        self.post_forecast("/predict_ticket_volume", request).await
    }

    async fn forecast_pretrained(
        &self,
        request: &PretrainedForecastRequest,
    ) -> Result<ForecastSeries, ForecastError> {
        self.post_forecast("/predict_ticket_volume_using_external", request)
            .await
    }
}
