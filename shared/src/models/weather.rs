//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One calendar day of historical weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity_min: Option<f64>,
    pub windspeed_max: f64,
    pub radiation_sum: f64,
}

/// Daily series in the columnar shape returned by the weather archive.
///
/// Every entry may be `null`. The humidity column is not available for every
/// location and period, in which case the archive omits it or sends `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub relative_humidity_2m_min: Option<Vec<Option<f64>>>,
    pub windspeed_10m_max: Vec<Option<f64>>,
    pub shortwave_radiation_sum: Vec<Option<f64>>,
}

/// Malformed daily series
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("column {column} has {actual} entries, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl DailySeries {
    /// Zip the columns into per-day observations.
    ///
    /// Days missing any required value are skipped; the second element of the
    /// result is the number of skipped days.
    pub fn observations(&self) -> Result<(Vec<DailyObservation>, usize), SeriesError> {
        let expected = self.time.len();
        let check = |column: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(SeriesError::ColumnLength {
                    column,
                    expected,
                    actual,
                })
            }
        };
        check("temperature_2m_min", self.temperature_2m_min.len())?;
        check("temperature_2m_max", self.temperature_2m_max.len())?;
        check("windspeed_10m_max", self.windspeed_10m_max.len())?;
        check("shortwave_radiation_sum", self.shortwave_radiation_sum.len())?;
        if let Some(humidity) = &self.relative_humidity_2m_min {
            check("relative_humidity_2m_min", humidity.len())?;
        }

        let mut observations = Vec::with_capacity(expected);
        let mut skipped = 0;
        for i in 0..expected {
            match self.day(i) {
                Some(observation) => observations.push(observation),
                None => skipped += 1,
            }
        }

        Ok((observations, skipped))
    }

    /// Column lengths must already be checked
    fn day(&self, i: usize) -> Option<DailyObservation> {
        Some(DailyObservation {
            date: self.time[i],
            temperature_min: self.temperature_2m_min[i]?,
            temperature_max: self.temperature_2m_max[i]?,
            humidity_min: self
                .relative_humidity_2m_min
                .as_ref()
                .and_then(|humidity| humidity[i]),
            windspeed_max: self.windspeed_10m_max[i]?,
            radiation_sum: self.shortwave_radiation_sum[i]?,
        })
    }
}

/// Aggregated weather for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyWeatherSummary {
    /// Month number (1 for January, 12 for December)
    pub month: u32,
    pub min_temperature: f64,
    pub max_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_humidity: Option<f64>,
    pub average_windspeed: f64,
    pub average_radiation: f64,
}
