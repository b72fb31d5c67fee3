//! Time groupings for the evolution charts.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::domain::{Channel, PeriodView};

/// Solar energy summed over one hour-of-day bucket (dates ignored).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyEnergy {
    /// 0..=23
    pub hour: u32,
    pub actual: f64,
    pub theoretical: f64,
}

impl HourlyEnergy {
    pub fn label(&self) -> String {
        format!("{:02}", self.hour)
    }
}

/// Group the view by hour of day; only hours with readings are returned,
/// ascending. Missing energy counts as zero.
pub fn hourly_solar_energy(view: &PeriodView<'_>) -> Vec<HourlyEnergy> {
    let mut buckets: [Option<(f64, f64)>; 24] = [None; 24];
    for r in view.readings() {
        let (actual, theoretical) = buckets[r.timestamp.hour() as usize].get_or_insert((0.0, 0.0));
        *actual += r.energy_solar.unwrap_or(0.0);
        *theoretical += r.energy_solar_theoretical.unwrap_or(0.0);
    }

    buckets
        .iter()
        .enumerate()
        .filter_map(|(hour, bucket)| {
            bucket.map(|(actual, theoretical)| HourlyEnergy {
                hour: hour as u32,
                actual,
                theoretical,
            })
        })
        .collect()
}

/// Power of every channel at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayPowerPoint {
    pub time: NaiveTime,
    /// Indexed by [`Channel::index`].
    pub power: [Option<f64>; 4],
}

impl DayPowerPoint {
    pub fn power(&self, channel: Channel) -> Option<f64> {
        self.power[channel.index()]
    }
}

/// Same-day power readings, time-ordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPowerSeries {
    pub date: NaiveDate,
    pub points: Vec<DayPowerPoint>,
}

impl DayPowerSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn day_power_series(view: &PeriodView<'_>, date: NaiveDate) -> DayPowerSeries {
    let points = view
        .day(date)
        .iter()
        .map(|r| DayPowerPoint {
            time: r.timestamp.time(),
            power: Channel::ALL.map(|c| c.power(r)),
        })
        .collect();
    DayPowerSeries { date, points }
}
