//! Shared daily climate series and date-window summaries.

use chrono::NaiveDate;

use crate::{WeatherMode, WeatherRecord, WeatherSummary};

/// Date-ordered daily weather, immutable once built and shared via `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSeries {
    records: Vec<WeatherRecord>,
}

impl WeatherSeries {
    /// Sorts by date; later duplicates of a date are dropped.
    pub fn new(mut records: Vec<WeatherRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&WeatherRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records with `from <= date < to_exclusive`.
    pub fn range(&self, from: NaiveDate, to_exclusive: NaiveDate) -> &[WeatherRecord] {
        let start = self.records.partition_point(|r| r.date < from);
        let end = self.records.partition_point(|r| r.date < to_exclusive);
        if start >= end {
            return &[];
        }
        &self.records[start..end]
    }

    /// Summarise `[from, to_exclusive)`. `None` when no record falls inside.
    pub fn window(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
        mode: WeatherMode,
    ) -> Option<WeatherSummary> {
        let records = self.range(from, to_exclusive);
        if records.is_empty() {
            return None;
        }
        let days = records.len();
        let summary = match mode {
            WeatherMode::Actual => WeatherSummary {
                mode,
                min_temp: records
                    .iter()
                    .map(|r| r.min_temp)
                    .fold(f64::INFINITY, f64::min),
                max_temp: records
                    .iter()
                    .map(|r| r.max_temp)
                    .fold(f64::NEG_INFINITY, f64::max),
                precipitation: records.iter().map(|r| r.precipitation).sum(),
                days,
            },
            WeatherMode::Forecast => {
                let n = days as f64;
                let window_days = (to_exclusive - from).num_days() as f64;
                WeatherSummary {
                    mode,
                    min_temp: records.iter().map(|r| r.min_temp).sum::<f64>() / n,
                    max_temp: records.iter().map(|r| r.max_temp).sum::<f64>() / n,
                    precipitation: records.iter().map(|r| r.precipitation).sum::<f64>() / n
                        * window_days,
                    days,
                }
            }
        };
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2001, 3, d).unwrap()
    }

    fn record(d: u32, min_temp: f64, max_temp: f64, precipitation: f64) -> WeatherRecord {
        WeatherRecord {
            date: day(d),
            min_temp,
            max_temp,
            precipitation,
            reference_et: 3.0,
        }
    }

    fn series() -> WeatherSeries {
        WeatherSeries::new(vec![
            record(3, 8.0, 20.0, 0.0),
            record(1, 5.0, 15.0, 2.0),
            record(2, 3.0, 18.0, 4.0),
            record(4, 6.0, 22.0, 6.0),
        ])
    }

    #[test]
    fn new_sorts_records_by_date() {
        let series = series();
        let dates: Vec<NaiveDate> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3), day(4)]);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(4)));
    }

    #[test]
    fn range_is_half_open() {
        let series = series();
        let records = series.range(day(2), day(4));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, day(2));
        assert_eq!(records[1].date, day(3));
    }

    #[test]
    fn actual_window_reports_extremes_and_total_rain() {
        let summary = series().window(day(1), day(4), WeatherMode::Actual).unwrap();
        assert!((summary.min_temp - 3.0).abs() < 1e-9);
        assert!((summary.max_temp - 20.0).abs() < 1e-9);
        assert!((summary.precipitation - 6.0).abs() < 1e-9);
        assert_eq!(summary.days, 3);
    }

    #[test]
    fn forecast_window_scales_mean_rain_by_window_length() {
        // Window spans 10 days but only 4 records exist: mean rain 3mm/day * 10.
        let summary = series()
            .window(day(1), day(11), WeatherMode::Forecast)
            .unwrap();
        assert!((summary.min_temp - 5.5).abs() < 1e-9);
        assert!((summary.max_temp - 18.75).abs() < 1e-9);
        assert!((summary.precipitation - 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_window_has_no_data() {
        let series = series();
        assert!(series.window(day(2), day(2), WeatherMode::Actual).is_none());
        assert!(series.window(day(10), day(20), WeatherMode::Forecast).is_none());
        assert!(series.window(day(4), day(1), WeatherMode::Actual).is_none());
    }
}
