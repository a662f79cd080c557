//! Seven-day rate history for a currency pair.

use crate::core::currency::RateSource;
use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument, warn};

pub const HISTORY_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    /// Missing when that day's request failed or the target was absent.
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistorySummary {
    pub percent_change: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub base: String,
    pub target: String,
    pub points: Vec<HistoryPoint>,
    pub summary: HistorySummary,
}

/// The trailing window of days ending at `today`, oldest first.
pub fn history_window(today: NaiveDate) -> [NaiveDate; HISTORY_DAYS] {
    std::array::from_fn(|i| today - Duration::days((HISTORY_DAYS - 1 - i) as i64))
}

/// Percent change between the first and last points, plus the range of the
/// points that have a rate.
pub fn summarize(points: &[HistoryPoint]) -> HistorySummary {
    let percent_change = match (
        points.first().and_then(|p| p.rate),
        points.last().and_then(|p| p.rate),
    ) {
        (Some(first), Some(last)) if first != 0.0 => Some((last - first) / first * 100.0),
        _ => None,
    };

    let rates = points.iter().filter_map(|p| p.rate);
    let min = rates.clone().reduce(f64::min);
    let max = rates.reduce(f64::max);

    HistorySummary {
        percent_change,
        min,
        max,
    }
}

/// Fetches one rate per day for the window ending at `today`.
///
/// Requests run one after another so the points come back in date order. A
/// failed day is kept as a gap and the remaining days are still fetched.
/// `on_step` is called after each day completes.
#[instrument(name = "HistoryLoad", skip_all, fields(base = %base, target = %target))]
pub async fn load_history(
    source: &dyn RateSource,
    base: &str,
    target: &str,
    today: NaiveDate,
    on_step: &(dyn Fn() + Send + Sync),
) -> History {
    let mut points = Vec::with_capacity(HISTORY_DAYS);

    for date in history_window(today) {
        let rate = match source.fetch_history(base, date).await {
            Ok(rates) => {
                let rate = rates.get(target).copied();
                if rate.is_none() {
                    debug!(%date, "Target missing from historical rates");
                }
                rate
            }
            Err(e) => {
                warn!(%date, error = %e, "Failed to fetch historical rate");
                None
            }
        };
        points.push(HistoryPoint { date, rate });
        on_step();
    }

    let summary = summarize(&points);
    History {
        base: base.to_string(),
        target: target.to_string(),
        points,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::RateTable;
    use crate::core::currency::tests::StaticRateSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn points(rates: &[Option<f64>]) -> Vec<HistoryPoint> {
        let window = history_window(day("2025-03-07"));
        window
            .iter()
            .zip(rates)
            .map(|(date, rate)| HistoryPoint {
                date: *date,
                rate: *rate,
            })
            .collect()
    }

    #[test]
    fn test_history_window_is_seven_consecutive_days_ending_today() {
        let today = day("2025-03-02");
        let window = history_window(today);

        assert_eq!(window.len(), 7);
        assert_eq!(window[0], day("2025-02-24"));
        assert_eq!(window[6], today);
        for pair in window.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn test_percent_change_first_vs_last() {
        let summary = summarize(&points(&[
            Some(100.0),
            Some(130.0),
            Some(90.0),
            Some(105.0),
            Some(101.0),
            Some(99.0),
            Some(110.0),
        ]));
        assert!((summary.percent_change.unwrap() - 10.0).abs() < 1e-6);
        assert_eq!(summary.min, Some(90.0));
        assert_eq!(summary.max, Some(130.0));
    }

    #[test]
    fn test_min_max_exclude_missing_points() {
        let summary = summarize(&points(&[
            Some(1.10),
            Some(1.12),
            None,
            Some(1.08),
            Some(1.11),
            Some(1.09),
            Some(1.13),
        ]));
        assert_eq!(summary.min, Some(1.08));
        assert_eq!(summary.max, Some(1.13));
        assert!(summary.percent_change.is_some());
    }

    #[test]
    fn test_percent_change_missing_endpoint_is_none() {
        let summary = summarize(&points(&[
            None,
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.0),
            Some(1.2),
        ]));
        assert_eq!(summary.percent_change, None);
        assert_eq!(summary.max, Some(1.2));

        let empty = summarize(&points(&[None; 7]));
        assert_eq!(empty, HistorySummary::default());
    }

    #[tokio::test]
    async fn test_load_history_isolates_failed_days() {
        let today = day("2025-03-07");
        let window = history_window(today);
        let mut source = StaticRateSource::default();
        for (i, date) in window.iter().enumerate() {
            // Day 2 errors, day 4 lacks the target.
            if i == 2 {
                continue;
            }
            let mut table = RateTable::new();
            table.insert("GBP".to_string(), 0.8);
            if i != 4 {
                table.insert("EUR".to_string(), 0.90 + i as f64 * 0.01);
            }
            source.history.insert(("USD".to_string(), *date), table);
        }

        let steps = AtomicUsize::new(0);
        let history = load_history(&source, "USD", "EUR", today, &|| {
            steps.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(steps.load(Ordering::SeqCst), 7);
        assert_eq!(history.points.len(), 7);
        assert_eq!(history.points[6].date, today);
        assert_eq!(history.points[2].rate, None);
        assert_eq!(history.points[4].rate, None);
        assert_eq!(history.points[0].rate, Some(0.90));
        assert_eq!(history.summary.min, Some(0.90));
        let last = 0.90 + 6.0 * 0.01;
        assert!((history.summary.max.unwrap() - last).abs() < 1e-12);
        let expected = (last - 0.90) / 0.90 * 100.0;
        assert!((history.summary.percent_change.unwrap() - expected).abs() < 1e-6);
    }
}
