//! Aggregation engine: everything the tables and charts are computed from.
//!
//! All functions take a [`PeriodView`] and never mutate the dataset. An empty
//! view degrades every numeric figure to `None` instead of failing.

pub mod series;
pub mod status;
pub mod summary;

pub use series::*;
pub use status::*;
pub use summary::*;

use serde::Serialize;

use crate::domain::{Channel, Period, PeriodView, Status};

/// Figures computed once per selected period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub period: Period,
    pub rows: usize,
    /// One entry per channel, in [`Channel::ALL`] order.
    pub channels: Vec<ChannelSummary>,
    pub solar_theoretical_energy: Option<f64>,
    pub solar_loss: Option<f64>,
    /// Dominant status per channel, in [`Channel::ALL`] order.
    pub dominant: Vec<(Channel, Status)>,
    /// Distribution of the installation status.
    pub distribution: StatusDistribution,
}

impl Aggregates {
    pub fn channel(&self, channel: Channel) -> &ChannelSummary {
        &self.channels[channel.index()]
    }

    pub fn dominant(&self, channel: Channel) -> &Status {
        &self.dominant[channel.index()].1
    }
}

pub fn aggregate(view: &PeriodView<'_>) -> Aggregates {
    tracing::debug!(
        rows = view.len(),
        start = %view.period().start(),
        end = %view.period().end(),
        "aggregating period"
    );
    Aggregates {
        period: view.period(),
        rows: view.len(),
        channels: Channel::ALL
            .iter()
            .map(|&c| summarize_channel(view, c))
            .collect(),
        solar_theoretical_energy: theoretical_solar_energy(view),
        solar_loss: solar_loss(view),
        dominant: Channel::ALL
            .iter()
            .map(|&c| (c, channel_dominant_status(view, c)))
            .collect(),
        distribution: StatusDistribution::for_channel(view, Channel::Installation),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{Dataset, Reading};
    use chrono::{NaiveDate, NaiveDateTime};

    pub(crate) fn blank(ts: &str) -> Reading {
        Reading {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
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

    fn full_view(ds: &Dataset) -> PeriodView<'_> {
        let period = ds.full_period().unwrap();
        ds.view(&period)
    }

    fn solar_day() -> Vec<Reading> {
        let powers = [3.4, 0.0, 3.6, 0.0];
        let times = ["2025-07-10 08:00", "2025-07-10 08:10", "2025-07-10 08:20", "2025-07-10 08:30"];
        times
            .iter()
            .zip(powers)
            .map(|(ts, p)| Reading {
                power_solar: Some(p),
                energy_solar: Some(p / 6.0),
                energy_solar_theoretical: Some(0.5),
                status_installation: Status::known("normal"),
                ..blank(ts)
            })
            .collect()
    }

    #[test]
    fn operating_hours_count_positive_samples() {
        let ds = Dataset::new(solar_day());
        let agg = aggregate(&full_view(&ds));
        let solar = agg.channel(Channel::Solar);
        assert!((solar.operating_hours.unwrap() - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(solar.peak_power, Some(3.6));
        // Other channels have readings but no values.
        assert_eq!(agg.channel(Channel::Grid).peak_power, None);
        assert_eq!(agg.channel(Channel::Grid).operating_hours, Some(0.0));
        assert_eq!(agg.channel(Channel::Grid).energy, Some(0.0));
    }

    #[test]
    fn loss_may_be_negative() {
        let mut readings = solar_day();
        for r in &mut readings {
            r.energy_solar = Some(1.0);
        }
        let ds = Dataset::new(readings);
        let agg = aggregate(&full_view(&ds));
        assert_eq!(agg.solar_theoretical_energy, Some(2.0));
        assert_eq!(agg.solar_loss, Some(-2.0));
    }

    #[test]
    fn empty_view_degrades_to_none() {
        let ds = Dataset::new(solar_day());
        let period = Period::new(date("2025-07-11"), date("2025-07-12")).unwrap();
        let agg = aggregate(&ds.view(&period));
        assert_eq!(agg.rows, 0);
        for summary in &agg.channels {
            assert_eq!(summary.peak_power, None);
            assert_eq!(summary.operating_hours, None);
            assert_eq!(summary.energy, None);
        }
        assert_eq!(agg.solar_loss, None);
        assert!(agg.distribution.is_empty());
        assert_eq!(agg.dominant(Channel::Installation), &Status::Unknown);
    }

    #[test]
    fn results_do_not_depend_on_input_order() {
        let forward = Dataset::new(solar_day());
        let mut reversed = solar_day();
        reversed.reverse();
        let reversed = Dataset::new(reversed);
        assert_eq!(aggregate(&full_view(&forward)), aggregate(&full_view(&reversed)));
    }

    #[test]
    fn hourly_energy_keeps_only_present_hours() {
        let mut readings = solar_day();
        readings.push(Reading {
            energy_solar: Some(1.5),
            ..blank("2025-07-11 08:40")
        });
        readings.push(Reading {
            energy_solar: Some(2.0),
            energy_solar_theoretical: Some(2.5),
            ..blank("2025-07-11 13:00")
        });
        let ds = Dataset::new(readings);
        let hourly = hourly_solar_energy(&full_view(&ds));
        assert_eq!(hourly.iter().map(|h| h.hour).collect::<Vec<_>>(), vec![8, 13]);
        assert!((hourly[0].actual - (7.0 / 6.0 + 1.5)).abs() < 1e-9);
        assert!((hourly[0].theoretical - 2.0).abs() < 1e-9);
        assert_eq!(hourly[1].label(), "13");
    }

    #[test]
    fn day_series_is_limited_to_one_date() {
        let mut readings = solar_day();
        readings.push(Reading {
            power_grid: Some(12.0),
            ..blank("2025-07-11 00:00")
        });
        let ds = Dataset::new(readings);
        let view = full_view(&ds);
        let series = day_power_series(&view, date("2025-07-10"));
        assert_eq!(series.points.len(), 4);
        assert_eq!(series.points[2].power(Channel::Solar), Some(3.6));
        assert!(day_power_series(&view, date("2025-07-09")).is_empty());
    }
}
