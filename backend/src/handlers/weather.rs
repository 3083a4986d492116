//! HTTP handlers for location and weather record endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{GpsCoordinates, LocationInput};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{weather::WeatherRecord, WeatherService};
use crate::AppState;

/// Address preview for a coordinate
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

fn validated_coordinates(input: &LocationInput) -> AppResult<GpsCoordinates> {
    input.validate()?;
    input.coordinates().ok_or_else(|| AppError::Validation {
        field: "latitude".to_string(),
        message: "Coordinates must be finite numbers".to_string(),
    })
}

/// Resolve coordinates to an address without storing anything
pub async fn reverse_geocode(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(input): Query<LocationInput>,
) -> AppResult<Json<AddressResponse>> {
    let coordinates = validated_coordinates(&input)?;
    let address = state
        .geocoder
        .reverse(&coordinates)
        .await?
        .ok_or_else(|| AppError::LocationNotFound(coordinates.to_string()))?;

    Ok(Json(AddressResponse {
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        address,
    }))
}

/// Submit the user's location and rebuild their weather record
pub async fn submit_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<LocationInput>,
) -> AppResult<Json<WeatherRecord>> {
    let coordinates = validated_coordinates(&input)?;
    let service = WeatherService::new(state.db.clone());
    let record = service
        .submit_location(
            &current_user.0.user_id,
            coordinates,
            &state.geocoder,
            &state.weather,
            state.config.weather.archive_year,
        )
        .await?;
    Ok(Json(record))
}

/// Get the current user's weather record
pub async fn get_weather(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<WeatherRecord>> {
    let service = WeatherService::new(state.db);
    let record = service.get_record(&current_user.0.user_id).await?;
    Ok(Json(record))
}

/// Whether the current user has submitted a location yet
pub async fn weather_exists(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ExistsResponse>> {
    let service = WeatherService::new(state.db);
    let exists = service.has_record(&current_user.0.user_id).await?;
    Ok(Json(ExistsResponse { exists }))
}
