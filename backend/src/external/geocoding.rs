//! Reverse geocoding client
//!
//! Resolves coordinates to a human-readable address via Nominatim

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shared::GpsCoordinates;

use crate::error::{AppError, AppResult};

const SERVICE: &str = "Reverse geocoding";

#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl GeocodingClient {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Geocoding HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Look up the address for a coordinate.
    ///
    /// Returns `Ok(None)` when the service answers but knows no address
    /// (open sea, invalid coordinates).
    pub async fn reverse(&self, coordinates: &GpsCoordinates) -> AppResult<Option<String>> {
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", latitude.as_str()),
                ("lon", longitude.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(SERVICE, format!("{} - {}", status, body)));
        }

        // Unknown locations come back as `{"error": "Unable to geocode"}`
        let data: ReverseResponse = response.json().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("failed to parse response: {}", e))
        })?;

        Ok(data
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}
