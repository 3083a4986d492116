//! Monthly aggregation of daily weather observations

use chrono::Datelike;
use serde::Serialize;

use crate::models::{DailyObservation, DailySeries, MonthlyWeatherSummary, SeriesError};

/// Running sum and count for one variable
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| round2(self.sum / f64::from(self.count)))
    }
}

#[derive(Debug, Default)]
struct MonthBucket {
    temperature_min: Accumulator,
    temperature_max: Accumulator,
    humidity: Accumulator,
    windspeed: Accumulator,
    radiation: Accumulator,
}

impl MonthBucket {
    fn add(&mut self, observation: &DailyObservation) {
        self.temperature_min.add(observation.temperature_min);
        self.temperature_max.add(observation.temperature_max);
        if let Some(humidity) = observation.humidity_min {
            self.humidity.add(humidity);
        }
        self.windspeed.add(observation.windspeed_max);
        self.radiation.add(observation.radiation_sum);
    }

    fn summarize(&self, month: u32) -> Option<MonthlyWeatherSummary> {
        Some(MonthlyWeatherSummary {
            month,
            min_temperature: self.temperature_min.mean()?,
            max_temperature: self.temperature_max.mean()?,
            average_humidity: self.humidity.mean(),
            average_windspeed: self.windspeed.mean()?,
            average_radiation: self.radiation.mean()?,
        })
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduce daily observations to one summary per month that has data.
///
/// Observations from different years falling in the same calendar month
/// share a bucket. The result is ordered January to December.
pub fn aggregate_monthly(observations: &[DailyObservation]) -> Vec<MonthlyWeatherSummary> {
    let mut buckets: [Option<MonthBucket>; 12] = Default::default();

    for observation in observations {
        buckets[observation.date.month0() as usize]
            .get_or_insert_with(MonthBucket::default)
            .add(observation);
    }

    buckets
        .iter()
        .zip(1u32..)
        .filter_map(|(bucket, month)| bucket.as_ref()?.summarize(month))
        .collect()
}

/// Result of aggregating an archive series
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub summaries: Vec<MonthlyWeatherSummary>,
    /// Days dropped because a required value was missing
    pub skipped_days: usize,
}

/// Aggregate a columnar archive series
pub fn aggregate_series(series: &DailySeries) -> Result<Aggregation, SeriesError> {
    let (observations, skipped_days) = series.observations()?;
    Ok(Aggregation {
        summaries: aggregate_monthly(&observations),
        skipped_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn observation(y: i32, m: u32, d: u32, humidity: Option<f64>) -> DailyObservation {
        DailyObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            temperature_min: 10.0 + f64::from(d),
            temperature_max: 25.0 + f64::from(d),
            humidity_min: humidity,
            windspeed_max: 5.0,
            radiation_sum: 20.0 + f64::from(d) / 3.0,
        }
    }

    #[test]
    fn test_empty_input_yields_no_summaries() {
        assert!(aggregate_monthly(&[]).is_empty());
    }

    #[test]
    fn test_single_month_means() {
        let observations = vec![
            observation(2024, 2, 1, Some(40.0)),
            observation(2024, 2, 2, Some(45.0)),
            observation(2024, 2, 3, Some(50.0)),
        ];

        let summaries = aggregate_monthly(&observations);
        assert_eq!(summaries.len(), 1);

        let feb = &summaries[0];
        assert_eq!(feb.month, 2);
        assert_eq!(feb.min_temperature, 12.0);
        assert_eq!(feb.max_temperature, 27.0);
        assert_eq!(feb.average_humidity, Some(45.0));
        assert_eq!(feb.average_windspeed, 5.0);
        // (20.333.. + 20.666.. + 21.0) / 3
        assert_eq!(feb.average_radiation, 20.67);
    }

    #[test]
    fn test_months_without_data_are_omitted() {
        let observations = vec![
            observation(2024, 11, 5, None),
            observation(2024, 1, 5, None),
            observation(2024, 6, 5, None),
        ];

        let months: Vec<u32> = aggregate_monthly(&observations)
            .iter()
            .map(|s| s.month)
            .collect();
        assert_eq!(months, vec![1, 6, 11]);
    }

    #[test]
    fn test_humidity_absent_everywhere() {
        let observations: Vec<_> = (1..=28)
            .flat_map(|d| [observation(2024, 1, d, None), observation(2024, 2, d, None)])
            .collect();

        let summaries = aggregate_monthly(&observations);
        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.average_humidity.is_none()));
    }

    #[test]
    fn test_humidity_mean_ignores_days_without_humidity() {
        let observations = vec![
            observation(2024, 5, 1, Some(30.0)),
            observation(2024, 5, 2, None),
            observation(2024, 5, 3, Some(60.0)),
            observation(2024, 6, 1, None),
        ];

        let summaries = aggregate_monthly(&observations);
        assert_eq!(summaries[0].average_humidity, Some(45.0));
        assert_eq!(summaries[1].average_humidity, None);
    }

    #[test]
    fn test_full_year_has_twelve_months() {
        let mut observations = Vec::new();
        let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while day.year() == 2024 {
            observations.push(DailyObservation {
                date: day,
                temperature_min: 18.0,
                temperature_max: 32.0,
                humidity_min: Some(35.5),
                windspeed_max: 11.2,
                radiation_sum: 21.4,
            });
            day = day.succ_opt().unwrap();
        }

        let summaries = aggregate_monthly(&observations);
        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0].month, 1);
        assert_eq!(summaries[11].month, 12);
        assert!(summaries.iter().all(|s| s.average_humidity == Some(35.5)));
    }

    #[test]
    fn test_aggregate_series_reports_skipped_days() {
        let series = DailySeries {
            time: vec![
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            ],
            temperature_2m_min: vec![Some(24.0), Some(25.0)],
            temperature_2m_max: vec![Some(30.0), None],
            relative_humidity_2m_min: Some(vec![Some(80.0), Some(85.0)]),
            windspeed_10m_max: vec![Some(14.0), Some(16.0)],
            shortwave_radiation_sum: vec![Some(12.0), Some(10.0)],
        };

        let aggregation = aggregate_series(&series).unwrap();
        assert_eq!(aggregation.skipped_days, 1);
        assert_eq!(aggregation.summaries.len(), 1);
        assert_eq!(aggregation.summaries[0].min_temperature, 24.0);
        assert_eq!(aggregation.summaries[0].average_humidity, Some(80.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(20.666_666), 20.67);
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(7.0), 7.0);
    }

    fn day_strategy() -> impl Strategy<Value = DailyObservation> {
        (
            1u32..=12,
            1u32..=28,
            -20.0f64..20.0,
            20.0f64..45.0,
            proptest::option::of(0.0f64..100.0),
            0.0f64..60.0,
            0.0f64..35.0,
        )
            .prop_map(|(month, day, tmin, tmax, humidity, wind, radiation)| {
                DailyObservation {
                    date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
                    temperature_min: tmin,
                    temperature_max: tmax,
                    humidity_min: humidity,
                    windspeed_max: wind,
                    radiation_sum: radiation,
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// One summary per month with data, each value the rounded mean
        #[test]
        fn prop_summaries_match_monthly_means(
            observations in proptest::collection::vec(day_strategy(), 0..200)
        ) {
            let summaries = aggregate_monthly(&observations);

            let mut months: Vec<u32> = observations.iter().map(|o| o.date.month()).collect();
            months.sort_unstable();
            months.dedup();
            prop_assert_eq!(
                summaries.iter().map(|s| s.month).collect::<Vec<_>>(),
                months
            );

            for summary in &summaries {
                let days: Vec<&DailyObservation> = observations
                    .iter()
                    .filter(|o| o.date.month() == summary.month)
                    .collect();
                let mean = |f: fn(&DailyObservation) -> f64| {
                    days.iter().map(|o| f(o)).sum::<f64>() / days.len() as f64
                };

                prop_assert!((summary.min_temperature - mean(|o| o.temperature_min)).abs() <= 0.005 + 1e-9);
                prop_assert!((summary.max_temperature - mean(|o| o.temperature_max)).abs() <= 0.005 + 1e-9);
                prop_assert!((summary.average_windspeed - mean(|o| o.windspeed_max)).abs() <= 0.005 + 1e-9);
                prop_assert!((summary.average_radiation - mean(|o| o.radiation_sum)).abs() <= 0.005 + 1e-9);

                let humidity: Vec<f64> = days.iter().filter_map(|o| o.humidity_min).collect();
                match summary.average_humidity {
                    Some(avg) => {
                        let expected = humidity.iter().sum::<f64>() / humidity.len() as f64;
                        prop_assert!((avg - expected).abs() <= 0.005 + 1e-9);
                    }
                    None => {
                        prop_assert!(humidity.is_empty());
                    }
                }
            }
        }

        /// Without any humidity input no summary carries humidity
        #[test]
        fn prop_no_humidity_in_no_humidity_out(
            observations in proptest::collection::vec(day_strategy(), 1..100)
        ) {
            let stripped: Vec<DailyObservation> = observations
                .into_iter()
                .map(|o| DailyObservation { humidity_min: None, ..o })
                .collect();

            prop_assert!(aggregate_monthly(&stripped)
                .iter()
                .all(|s| s.average_humidity.is_none()));
        }
    }
}
