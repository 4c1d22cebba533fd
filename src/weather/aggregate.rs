/// Forecast aggregation
///
/// Reduces raw three-hour samples to one summary per calendar date. Totally
/// deterministic for a given ordered sample list: groups are emitted in
/// ascending date order and the mode tie-break is fixed (see `mode`).
use crate::weather::{provider::ForecastSample, DailyForecast};
use std::collections::{BTreeMap, HashMap};

/// Number of daily entries emitted at most; upstream windows may exceed
/// 5 calendar days when the first day is partial.
const MAX_DAYS: usize = 5;

#[derive(Default)]
struct DayBucket {
    temps: Vec<f64>,
    conditions: Vec<String>,
    icons: Vec<String>,
    humidity: Vec<f64>,
    pop: Vec<f64>,
}

/// Aggregate raw samples into daily summaries.
///
/// An empty sample set yields an empty output, not an error. Samples with no
/// condition entry contribute empty condition/icon strings; a missing pop
/// counts as 0.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<DailyForecast> {
    let mut days: BTreeMap<String, DayBucket> = BTreeMap::new();

    for sample in samples {
        let date = sample
            .dt_txt
            .split(' ')
            .next()
            .unwrap_or(sample.dt_txt.as_str());

        let bucket = days.entry(date.to_string()).or_default();
        bucket.temps.push(sample.main.temp);
        bucket.humidity.push(sample.main.humidity);
        bucket.pop.push(sample.pop.unwrap_or(0.0));

        let condition = sample.weather.first();
        bucket
            .conditions
            .push(condition.map(|c| c.description.clone()).unwrap_or_default());
        bucket
            .icons
            .push(condition.map(|c| c.icon.clone()).unwrap_or_default());
    }

    days.into_iter()
        .take(MAX_DAYS)
        .map(|(date, bucket)| {
            let temp_min = bucket.temps.iter().cloned().fold(f64::INFINITY, f64::min);
            let temp_max = bucket
                .temps
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let mean_humidity =
                bucket.humidity.iter().sum::<f64>() / bucket.humidity.len() as f64;
            let max_pop = bucket.pop.iter().cloned().fold(0.0, f64::max);

            DailyForecast {
                date,
                temp_min_c: round1(temp_min),
                temp_max_c: round1(temp_max),
                condition: mode(&bucket.conditions),
                icon: mode(&bucket.icons),
                humidity_percent: mean_humidity.round() as i64,
                precipitation_chance: (max_pop * 100.0).round() as i64,
            }
        })
        .collect()
}

/// Most frequent value; ties go to whichever value reached the winning
/// frequency first in iteration order.
fn mode(values: &[String]) -> String {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    let mut max_freq = 0;
    let mut mode = values.first().cloned().unwrap_or_default();

    for value in values {
        let count = frequency.entry(value.as_str()).or_insert(0);
        *count += 1;
        if *count > max_freq {
            max_freq = *count;
            mode = value.clone();
        }
    }

    mode
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::provider::{SampleCondition, SampleMain};

    fn sample(dt_txt: &str, temp: f64, humidity: f64, pop: f64, condition: &str) -> ForecastSample {
        ForecastSample {
            dt_txt: dt_txt.to_string(),
            main: SampleMain { temp, humidity },
            weather: vec![SampleCondition {
                description: condition.to_string(),
                icon: format!("{}-icon", condition),
            }],
            pop: Some(pop),
        }
    }

    #[test]
    fn test_empty_samples_yield_empty_output() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_mode_prefers_most_frequent() {
        let values: Vec<String> = ["clear", "clear", "rain"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(mode(&values), "clear");
    }

    #[test]
    fn test_mode_tie_break_is_first_encountered() {
        let values: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(mode(&values), "a");

        let values: Vec<String> = ["b", "a", "a", "b"].iter().map(|s| s.to_string()).collect();
        // "a" reaches frequency 2 first
        assert_eq!(mode(&values), "a");
    }

    #[test]
    fn test_single_day_statistics() {
        let temps = [1.0, 2.5, -1.0, 3.0, 0.0, 1.5, 2.0, 0.5];
        let humidity = [60.0, 62.0, 58.0, 65.0, 61.0, 59.0, 63.0, 60.0];
        let pop = [0.1, 0.2, 0.4, 0.0, 0.1, 0.3, 0.2, 0.1];

        let samples: Vec<ForecastSample> = (0..8)
            .map(|i| {
                sample(
                    &format!("2024-01-15 {:02}:00:00", i * 3),
                    temps[i],
                    humidity[i],
                    pop[i],
                    "light rain",
                )
            })
            .collect();

        let daily = aggregate_daily(&samples);
        assert_eq!(daily.len(), 1);

        let day = &daily[0];
        assert_eq!(day.date, "2024-01-15");
        assert_eq!(day.temp_min_c, -1.0);
        assert_eq!(day.temp_max_c, 3.0);
        assert_eq!(day.humidity_percent, 61);
        assert_eq!(day.precipitation_chance, 40);
        assert_eq!(day.condition, "light rain");
        assert_eq!(day.icon, "light rain-icon");
    }

    #[test]
    fn test_groups_emitted_ascending_and_capped_at_five() {
        let mut samples = Vec::new();
        // 6 days, deliberately inserted newest first
        for day in (15..21).rev() {
            for hour in [0, 12] {
                samples.push(sample(
                    &format!("2024-01-{} {:02}:00:00", day, hour),
                    5.0,
                    50.0,
                    0.0,
                    "clear sky",
                ));
            }
        }

        let daily = aggregate_daily(&samples);
        assert_eq!(daily.len(), 5);
        let dates: Vec<&str> = daily.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2024-01-15",
                "2024-01-16",
                "2024-01-17",
                "2024-01-18",
                "2024-01-19"
            ]
        );
    }

    #[test]
    fn test_condition_mode_per_day() {
        let samples = vec![
            sample("2024-01-15 00:00:00", 1.0, 60.0, 0.0, "rain"),
            sample("2024-01-15 03:00:00", 1.0, 60.0, 0.0, "clear"),
            sample("2024-01-15 06:00:00", 1.0, 60.0, 0.0, "clear"),
        ];

        let daily = aggregate_daily(&samples);
        assert_eq!(daily[0].condition, "clear");
    }

    #[test]
    fn test_temperatures_rounded_to_one_decimal() {
        let samples = vec![
            sample("2024-01-15 00:00:00", 1.26, 60.0, 0.0, "clear"),
            sample("2024-01-15 03:00:00", 3.44, 60.0, 0.0, "clear"),
        ];

        let daily = aggregate_daily(&samples);
        assert_eq!(daily[0].temp_min_c, 1.3);
        assert_eq!(daily[0].temp_max_c, 3.4);
    }

    #[test]
    fn test_missing_pop_and_condition_are_defaulted() {
        let samples = vec![ForecastSample {
            dt_txt: "2024-01-15 00:00:00".to_string(),
            main: SampleMain {
                temp: 2.0,
                humidity: 55.0,
            },
            weather: vec![],
            pop: None,
        }];

        let daily = aggregate_daily(&samples);
        assert_eq!(daily[0].precipitation_chance, 0);
        assert_eq!(daily[0].condition, "");
        assert_eq!(daily[0].icon, "");
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let samples: Vec<ForecastSample> = (0..40)
            .map(|i| {
                sample(
                    &format!("2024-01-{:02} {:02}:00:00", 15 + i / 8, (i % 8) * 3),
                    (i as f64) * 0.3 - 2.0,
                    55.0 + (i % 10) as f64,
                    (i % 5) as f64 / 10.0,
                    if i % 3 == 0 { "rain" } else { "clouds" },
                )
            })
            .collect();

        let first = aggregate_daily(&samples);
        let second = aggregate_daily(&samples);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
