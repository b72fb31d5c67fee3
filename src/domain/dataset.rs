//! The loaded dataset and period selection.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::types::Reading;
use crate::error::{AnalysisError, Result};

/// Readings sorted ascending by timestamp. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    readings: Vec<Reading>,
}

impl Dataset {
    /// Build a dataset; rows are stable-sorted by timestamp (ties keep input order).
    pub fn new(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.readings.first().map(|r| r.timestamp.date())
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.readings.last().map(|r| r.timestamp.date())
    }

    /// The period covering every reading.
    pub fn full_period(&self) -> Option<Period> {
        Some(Period {
            start: self.min_date()?,
            end: self.max_date()?,
        })
    }

    /// Validate a requested interval and clamp it to the dataset's dates.
    ///
    /// Missing bounds default to the dataset's first/last date.
    pub fn select_period(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Period> {
        let full = self.full_period().ok_or(AnalysisError::EmptyDataset)?;
        let start = start.unwrap_or(full.start);
        let end = end.unwrap_or(full.end);
        if end < start {
            return Err(AnalysisError::Period { start, end });
        }
        Ok(Period {
            start: start.clamp(full.start, full.end),
            end: end.clamp(full.start, full.end),
        })
    }

    /// Borrow the readings whose date falls inside `period`.
    pub fn view(&self, period: &Period) -> PeriodView<'_> {
        PeriodView {
            period: *period,
            readings: slice_dates(&self.readings, period.start, period.end),
        }
    }

    /// Distinct dates, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        distinct_days(&self.readings)
    }
}

/// A closed date interval `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AnalysisError::Period { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Readings of one period, borrowed from a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct PeriodView<'a> {
    period: Period,
    readings: &'a [Reading],
}

impl<'a> PeriodView<'a> {
    pub fn period(&self) -> Period {
        self.period
    }

    pub fn readings(&self) -> &'a [Reading] {
        self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct dates present in the view, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        distinct_days(self.readings)
    }

    /// Readings of a single date (empty when the date is outside the view).
    pub fn day(&self, date: NaiveDate) -> &'a [Reading] {
        slice_dates(self.readings, date, date)
    }
}

fn slice_dates(readings: &[Reading], start: NaiveDate, end: NaiveDate) -> &[Reading] {
    let lo = readings.partition_point(|r| r.timestamp.date() < start);
    let hi = readings.partition_point(|r| r.timestamp.date() <= end);
    &readings[lo..hi.max(lo)]
}

fn distinct_days(readings: &[Reading]) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = readings.iter().map(|r| r.timestamp.date()).collect();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::Status;

    fn reading(ts: &str) -> Reading {
        Reading {
            timestamp: chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            power_grid: None,
            power_genset: None,
            power_solar: None,
            power_load: None,
            energy_grid: None,
            energy_genset: None,
            energy_solar: None,
            energy_solar_theoretical: None,
            energy_load: None,
            status_grid: Status::Unknown,
            status_genset: Status::Unknown,
            status_solar: Status::Unknown,
            status_installation: Status::Unknown,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            reading("2025-07-12 08:00:00"),
            reading("2025-07-10 08:10:00"),
            reading("2025-07-10 08:00:00"),
            reading("2025-07-11 23:50:00"),
        ])
    }

    #[test]
    fn sorts_and_reports_bounds() {
        let ds = sample();
        assert_eq!(ds.min_date(), Some(date("2025-07-10")));
        assert_eq!(ds.max_date(), Some(date("2025-07-12")));
        assert_eq!(
            ds.days(),
            vec![date("2025-07-10"), date("2025-07-11"), date("2025-07-12")]
        );
    }

    #[test]
    fn reversed_period_is_rejected() {
        let ds = sample();
        let err = ds
            .select_period(Some(date("2025-07-12")), Some(date("2025-07-11")))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Period { .. }));
    }

    #[test]
    fn period_is_clamped_to_dataset() {
        let ds = sample();
        let period = ds
            .select_period(Some(date("2025-01-01")), Some(date("2026-01-01")))
            .unwrap();
        assert_eq!(period.start(), date("2025-07-10"));
        assert_eq!(period.end(), date("2025-07-12"));
    }

    #[test]
    fn view_is_inclusive_on_both_ends() {
        let ds = sample();
        let period = Period::new(date("2025-07-10"), date("2025-07-11")).unwrap();
        let view = ds.view(&period);
        assert_eq!(view.len(), 3);
        assert_eq!(view.day(date("2025-07-11")).len(), 1);
        assert!(view.day(date("2025-07-12")).is_empty());
    }
}
