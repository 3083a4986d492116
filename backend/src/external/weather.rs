//! Weather archive client for fetching historical daily weather
//!
//! Integrates with the Open-Meteo archive API

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shared::{DailySeries, DateRange, GpsCoordinates};

use crate::error::{AppError, AppResult};

const SERVICE: &str = "Weather archive";

/// Daily variables requested from the archive
const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min,windspeed_10m_max,shortwave_radiation_sum,relative_humidity_2m_min";

/// Weather archive API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    archive_url: String,
    timezone: String,
}

/// Open-Meteo archive response
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: DailySeries,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(archive_url: String, timezone: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            archive_url,
            timezone,
        })
    }

    /// Fetch the daily series for a coordinate over an inclusive date range
    pub async fn get_daily_series(
        &self,
        coordinates: &GpsCoordinates,
        range: &DateRange,
    ) -> AppResult<DailySeries> {
        let start_date = range.start.format("%Y-%m-%d").to_string();
        let end_date = range.end.format("%Y-%m-%d").to_string();
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        tracing::debug!(
            "Fetching archive weather for {} from {} to {}",
            coordinates,
            start_date,
            end_date
        );

        let response = self
            .client
            .get(&self.archive_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
                ("daily", DAILY_VARIABLES),
                ("timezone", self.timezone.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(SERVICE, format!("{} - {}", status, body)));
        }

        let data: ArchiveResponse = response.json().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("failed to parse response: {}", e))
        })?;

        Ok(data.daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WeatherClient {
        WeatherClient::new(
            format!("{}/v1/archive", server.uri()),
            "auto".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn coordinates() -> GpsCoordinates {
        GpsCoordinates::new(Decimal::new(190, 1), Decimal::new(745, 1))
    }

    #[tokio::test]
    async fn test_fetches_daily_series() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/archive"))
            .and(query_param("latitude", "19.0"))
            .and(query_param("longitude", "74.5"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-12-31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 19.0,
                "longitude": 74.5,
                "daily": {
                    "time": ["2024-01-01"],
                    "temperature_2m_max": [30.2],
                    "temperature_2m_min": [14.1],
                    "relative_humidity_2m_min": [null],
                    "windspeed_10m_max": [11.0],
                    "shortwave_radiation_sum": [17.3]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let range = DateRange::calendar_year(2024).unwrap();
        let series = client(&server)
            .get_daily_series(&coordinates(), &range)
            .await
            .unwrap();
        assert_eq!(series.time.len(), 1);
        assert_eq!(series.temperature_2m_max, vec![Some(30.2)]);
        assert_eq!(series.relative_humidity_2m_min, Some(vec![None]));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid date range"))
            .mount(&server)
            .await;

        let range = DateRange::calendar_year(2024).unwrap();
        let error = client(&server)
            .get_daily_series(&coordinates(), &range)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::UpstreamService { .. }));
    }
}
