//! Aggregates → chart specifications.

use crate::aggregate::{Aggregates, DayPowerSeries, HourlyEnergy, StatusDistribution};
use crate::chart::{
    CURTAILMENT_COLOR, CartesianChart, ChartSpec, GENSET_COLOR, GRID_COLOR, GRID_FAULT_COLOR,
    LOAD_COLOR, Mark, NORMAL_COLOR, OTHER_STATUS_COLOR, PieChart, Rgb, SOLAR_COLOR, Series, Slice,
    THEORETICAL_COLOR,
};
use crate::domain::{Channel, Status};

pub fn channel_color(channel: Channel) -> Rgb {
    match channel {
        Channel::Grid => GRID_COLOR,
        Channel::Genset => GENSET_COLOR,
        Channel::Solar => SOLAR_COLOR,
        Channel::Installation => LOAD_COLOR,
    }
}

pub fn status_color(status: &Status) -> Rgb {
    match status.as_str() {
        "grid-fault" => GRID_FAULT_COLOR,
        "client-curtailment" => CURTAILMENT_COLOR,
        "normal" => NORMAL_COLOR,
        _ => OTHER_STATUS_COLOR,
    }
}

/// Share of actual energy produced by grid, genset and solar.
pub fn production_share_chart(agg: &Aggregates) -> ChartSpec {
    let slices = [Channel::Grid, Channel::Genset, Channel::Solar]
        .iter()
        .map(|&c| Slice {
            label: c.label().to_string(),
            value: agg.channel(c).energy.unwrap_or(0.0),
            color: channel_color(c),
        })
        .collect();
    ChartSpec::Pie(PieChart {
        title: "Energy production share".to_string(),
        slices,
    })
}

/// Share of each installation status value.
pub fn status_share_chart(distribution: &StatusDistribution) -> ChartSpec {
    let slices = distribution
        .entries()
        .iter()
        .map(|(status, count)| Slice {
            label: status.to_string(),
            value: *count as f64,
            color: status_color(status),
        })
        .collect();
    ChartSpec::Pie(PieChart {
        title: "Installation status distribution".to_string(),
        slices,
    })
}

/// Actual solar energy bars with the theoretical energy as a line.
pub fn hourly_solar_chart(hours: &[HourlyEnergy]) -> ChartSpec {
    ChartSpec::Cartesian(CartesianChart {
        title: "Solar energy: actual vs theoretical".to_string(),
        x_label: "Hour".to_string(),
        y_label: "Energy (kWh)".to_string(),
        categories: hours.iter().map(HourlyEnergy::label).collect(),
        series: vec![
            Series {
                name: "Actual energy".to_string(),
                mark: Mark::Bar,
                color: SOLAR_COLOR,
                values: hours.iter().map(|h| Some(h.actual)).collect(),
            },
            Series {
                name: "Theoretical energy".to_string(),
                mark: Mark::LineWithMarkers,
                color: THEORETICAL_COLOR,
                values: hours.iter().map(|h| Some(h.theoretical)).collect(),
            },
        ],
    })
}

/// Power of every channel over a single day; the load is dashed.
pub fn day_power_chart(series: &DayPowerSeries) -> ChartSpec {
    let lines = Channel::ALL
        .iter()
        .map(|&c| Series {
            name: c.label().to_string(),
            mark: match c {
                Channel::Installation => Mark::DashedLine,
                _ => Mark::Line,
            },
            color: channel_color(c),
            values: series.points.iter().map(|p| p.power(c)).collect(),
        })
        .collect();

    ChartSpec::Cartesian(CartesianChart {
        title: format!("Power by source on {}", series.date),
        x_label: "Time".to_string(),
        y_label: "Power (kW)".to_string(),
        categories: series
            .points
            .iter()
            .map(|p| p.time.format("%H:%M").to_string())
            .collect(),
        series: lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{DayPowerPoint, StatusDistribution};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn status_colors_fall_back_to_grey() {
        let statuses = vec![
            Status::known("grid-fault"),
            Status::known("normal"),
            Status::known("normal"),
            Status::Unknown,
            Status::known("maintenance"),
        ];
        let ChartSpec::Pie(pie) = status_share_chart(&StatusDistribution::from_statuses(&statuses)) else {
            panic!("expected a pie chart");
        };
        assert_eq!(pie.slices[0].label, "normal");
        assert_eq!(pie.slices[0].color.hex(), "#2CA02C");
        let unknown = pie.slices.iter().find(|s| s.label == "unknown").unwrap();
        assert_eq!(unknown.color, OTHER_STATUS_COLOR);
        let other = pie.slices.iter().find(|s| s.label == "maintenance").unwrap();
        assert_eq!(other.color, OTHER_STATUS_COLOR);
        assert_eq!(pie.total(), 5.0);
    }

    #[test]
    fn hourly_chart_pairs_bars_with_a_line() {
        let hours = [
            HourlyEnergy { hour: 7, actual: 1.0, theoretical: 1.2 },
            HourlyEnergy { hour: 12, actual: 4.0, theoretical: 3.5 },
        ];
        let ChartSpec::Cartesian(chart) = hourly_solar_chart(&hours) else {
            panic!("expected a cartesian chart");
        };
        assert_eq!(chart.categories, vec!["07", "12"]);
        assert_eq!(chart.series[0].mark, Mark::Bar);
        assert_eq!(chart.series[1].color.hex(), "#EC0E0E");
        assert_eq!(chart.value_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn day_chart_dashes_the_load() {
        let series = DayPowerSeries {
            date: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            points: vec![DayPowerPoint {
                time: NaiveTime::from_hms_opt(8, 10, 0).unwrap(),
                power: [Some(10.0), None, Some(3.2), Some(13.0)],
            }],
        };
        let ChartSpec::Cartesian(chart) = day_power_chart(&series) else {
            panic!("expected a cartesian chart");
        };
        assert_eq!(chart.categories, vec!["08:10"]);
        assert_eq!(chart.series.len(), 4);
        assert_eq!(chart.series[3].mark, Mark::DashedLine);
        assert_eq!(chart.series[3].color.hex(), "#6B6767");
        assert_eq!(chart.series[1].values, vec![None]);
    }
}
