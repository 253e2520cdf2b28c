use chrono::NaiveDate;
use serde::*;
use std::collections::BTreeMap;

/// Ticket counts keyed by calendar day.
///
/// Contains exactly one entry per day of the range it was built for, iterated
/// in ascending order. Serialized as a JSON object with `YYYY-MM-DD` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyCountSeries(pub BTreeMap<NaiveDate, u64>);

impl DailyCountSeries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<u64> {
        self.0.get(date).copied()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &u64)> {
        self.0.iter()
    }
}

/// Calendar events split into the two categories the forecaster understands.
///
/// Both buckets are always serialized, empty or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCategoryMap {
    pub holidays: BTreeMap<NaiveDate, String>,
    pub product_launches: BTreeMap<NaiveDate, String>,
}

/// A single forecasted day as returned by the forecasting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub forecasted_value: f64,
}

impl ForecastPoint {
    pub fn new(date: impl Into<String>, forecasted_value: f64) -> Self {
        Self {
            date: date.into(),
            forecasted_value,
        }
    }
}

pub type ForecastSeries = Vec<ForecastPoint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_series_serializes_as_date_keyed_object() {
        let mut counts = BTreeMap::new();
        counts.insert(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 3);
        counts.insert(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 0);
        let series = DailyCountSeries(counts);

        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"2024-01-01":0,"2024-01-02":3}"#);
        assert_eq!(series.total(), 3);
    }

    #[test]
    fn test_empty_category_map_keeps_both_buckets() {
        let json = serde_json::to_value(EventCategoryMap::default()).unwrap();
        assert_eq!(json, serde_json::json!({"holidays": {}, "product_launches": {}}));
    }

    #[test]
    fn test_forecast_point_wire_shape() {
        let point: ForecastPoint =
            serde_json::from_str(r#"{"date":"2024-01-01","forecasted_value":12.5}"#).unwrap();
        assert_eq!(point, ForecastPoint::new("2024-01-01", 12.5));
    }
}
