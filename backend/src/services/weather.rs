//! Weather service: per-user location and monthly weather record

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{aggregate_series, DateRange, GpsCoordinates, MonthlyWeatherSummary};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{GeocodingClient, WeatherClient};

/// Stored weather record, one per user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WeatherRecord {
    pub id: Uuid,
    pub user_id: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub location_label: String,
    pub monthly_summaries: Json<Vec<MonthlyWeatherSummary>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Weather service for managing weather records
#[derive(Clone)]
pub struct WeatherService {
    db: PgPool,
}

impl WeatherService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve the address, fetch a year of archive data, aggregate it and
    /// store it as the user's record. Nothing is written if any step fails.
    pub async fn submit_location(
        &self,
        user_id: &str,
        coordinates: GpsCoordinates,
        geocoder: &GeocodingClient,
        archive: &WeatherClient,
        archive_year: Option<i32>,
    ) -> AppResult<WeatherRecord> {
        let location_label = geocoder
            .reverse(&coordinates)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(coordinates.to_string()))?;

        let range = archive_window(archive_year, Utc::now().date_naive().year())?;
        let series = archive.get_daily_series(&coordinates, &range).await?;
        let aggregation = aggregate_series(&series).map_err(|e| {
            AppError::upstream("Weather archive", format!("malformed daily series: {}", e))
        })?;

        if aggregation.skipped_days > 0 {
            tracing::warn!(
                "Skipped {} days with missing values for {}",
                aggregation.skipped_days,
                coordinates
            );
        }

        self.upsert_record(user_id, coordinates, &location_label, aggregation.summaries)
            .await
    }

    /// Create the user's record or overwrite it in place
    pub async fn upsert_record(
        &self,
        user_id: &str,
        coordinates: GpsCoordinates,
        location_label: &str,
        summaries: Vec<MonthlyWeatherSummary>,
    ) -> AppResult<WeatherRecord> {
        let record = sqlx::query_as::<_, WeatherRecord>(
            r#"
            INSERT INTO weather_records (user_id, latitude, longitude, location_label, monthly_summaries)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                location_label = EXCLUDED.location_label,
                monthly_summaries = EXCLUDED.monthly_summaries,
                updated_at = NOW()
            RETURNING id, user_id, latitude, longitude, location_label, monthly_summaries,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(coordinates.latitude)
        .bind(coordinates.longitude)
        .bind(location_label)
        .bind(Json(summaries))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Stored weather record for {} with {} months",
            user_id,
            record.monthly_summaries.len()
        );

        Ok(record)
    }

    /// Get the user's record, if any
    pub async fn find_record(&self, user_id: &str) -> AppResult<Option<WeatherRecord>> {
        let record = sqlx::query_as::<_, WeatherRecord>(
            r#"
            SELECT id, user_id, latitude, longitude, location_label, monthly_summaries,
                   created_at, updated_at
            FROM weather_records
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// Get the user's record
    pub async fn get_record(&self, user_id: &str) -> AppResult<WeatherRecord> {
        self.find_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Weather record".to_string()))
    }

    pub async fn has_record(&self, user_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM weather_records WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }
}

/// Archive date range: the configured year, or the last full year
fn archive_window(archive_year: Option<i32>, current_year: i32) -> AppResult<DateRange> {
    let year = archive_year.unwrap_or(current_year - 1);
    if year >= current_year {
        return Err(AppError::Configuration(format!(
            "Archive year {} is not a completed year",
            year
        )));
    }

    DateRange::calendar_year(year)
        .ok_or_else(|| AppError::Configuration(format!("Invalid archive year {}", year)))
}
