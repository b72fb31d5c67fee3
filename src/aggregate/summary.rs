//! Per-channel production figures: peaks, operating hours, energy totals.

use serde::Serialize;

use crate::domain::{Channel, PeriodView, Reading, sampling_interval_hours};

/// Production figures of one channel over a period.
///
/// Every field is `None` when the period holds no readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    /// Maximum power (kW); `None` also when every reading is missing.
    pub peak_power: Option<f64>,
    /// Hours with strictly positive power.
    pub operating_hours: Option<f64>,
    /// Sum of actual energy (kWh); missing readings count as zero.
    pub energy: Option<f64>,
}

pub fn summarize_channel(view: &PeriodView<'_>, channel: Channel) -> ChannelSummary {
    ChannelSummary {
        channel,
        peak_power: peak_power(view, channel),
        operating_hours: operating_hours(view, channel),
        energy: energy_total(view, channel),
    }
}

pub fn peak_power(view: &PeriodView<'_>, channel: Channel) -> Option<f64> {
    view.readings()
        .iter()
        .filter_map(|r| channel.power(r))
        .fold(None, |peak: Option<f64>, v| Some(peak.map_or(v, |p| p.max(v))))
}

pub fn operating_hours(view: &PeriodView<'_>, channel: Channel) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    let running = view
        .readings()
        .iter()
        .filter(|r| channel.power(r).is_some_and(|p| p > 0.0))
        .count();
    Some(running as f64 * sampling_interval_hours())
}

pub fn energy_total(view: &PeriodView<'_>, channel: Channel) -> Option<f64> {
    sum_or_none(view, |r| channel.energy(r))
}

/// Sum of theoretical solar energy (kWh).
pub fn theoretical_solar_energy(view: &PeriodView<'_>) -> Option<f64> {
    sum_or_none(view, |r| r.energy_solar_theoretical)
}

/// Theoretical minus actual solar energy. Negative when production beat
/// the model; never clamped.
pub fn solar_loss(view: &PeriodView<'_>) -> Option<f64> {
    Some(theoretical_solar_energy(view)? - energy_total(view, Channel::Solar)?)
}

fn sum_or_none(view: &PeriodView<'_>, value: impl Fn(&Reading) -> Option<f64>) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    Some(view.readings().iter().filter_map(value).sum())
}
