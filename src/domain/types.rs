//! Shared domain types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::status::Status;

/// Number of positional columns an input file must have.
pub const COLUMN_COUNT: usize = 15;

/// Canonical column names, in positional order. Source headers are ignored.
pub const CANONICAL_COLUMNS: [&str; COLUMN_COUNT] = [
    "date",
    "time",
    "power_grid",
    "power_genset",
    "power_solar",
    "power_load",
    "energy_grid",
    "energy_genset",
    "energy_solar",
    "energy_solar_theoretical",
    "energy_load",
    "status_grid",
    "status_genset",
    "status_solar",
    "status_installation",
];

/// Fixed spacing between consecutive readings.
pub const SAMPLING_INTERVAL_MINUTES: u32 = 10;

/// Sampling interval expressed in hours.
pub fn sampling_interval_hours() -> f64 {
    f64::from(SAMPLING_INTERVAL_MINUTES) / 60.0
}

/// One of the four monitored sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Grid,
    Genset,
    Solar,
    /// Whole-installation load.
    Installation,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Grid,
        Channel::Genset,
        Channel::Solar,
        Channel::Installation,
    ];

    /// Label used in tables, legends and reports.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Grid => "Grid",
            Channel::Genset => "Genset",
            Channel::Solar => "Solar",
            Channel::Installation => "Installation",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Channel::Grid => 0,
            Channel::Genset => 1,
            Channel::Solar => 2,
            Channel::Installation => 3,
        }
    }

    pub fn power(self, reading: &Reading) -> Option<f64> {
        match self {
            Channel::Grid => reading.power_grid,
            Channel::Genset => reading.power_genset,
            Channel::Solar => reading.power_solar,
            Channel::Installation => reading.power_load,
        }
    }

    /// Actual energy for the channel (kWh).
    pub fn energy(self, reading: &Reading) -> Option<f64> {
        match self {
            Channel::Grid => reading.energy_grid,
            Channel::Genset => reading.energy_genset,
            Channel::Solar => reading.energy_solar,
            Channel::Installation => reading.energy_load,
        }
    }

    pub fn status(self, reading: &Reading) -> &Status {
        match self {
            Channel::Grid => &reading.status_grid,
            Channel::Genset => &reading.status_genset,
            Channel::Solar => &reading.status_solar,
            Channel::Installation => &reading.status_installation,
        }
    }
}

/// One normalized row of the input file.
///
/// Numeric fields that failed coercion are `None`; they are never replaced by
/// zero at this stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,

    /// Power (kW).
    pub power_grid: Option<f64>,
    pub power_genset: Option<f64>,
    pub power_solar: Option<f64>,
    pub power_load: Option<f64>,

    /// Energy (kWh).
    pub energy_grid: Option<f64>,
    pub energy_genset: Option<f64>,
    pub energy_solar: Option<f64>,
    pub energy_solar_theoretical: Option<f64>,
    pub energy_load: Option<f64>,

    pub status_grid: Status,
    pub status_genset: Status,
    pub status_solar: Status,
    pub status_installation: Status,
}

/// Which report sections and sub-elements to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub production: bool,
    pub synthesis_table: bool,
    pub production_chart: bool,

    pub operating_status: bool,
    pub dominant_table: bool,
    pub status_chart: bool,

    pub evolution: bool,
    pub solar_chart: bool,
    pub day_chart: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            production: true,
            synthesis_table: true,
            production_chart: true,
            operating_status: true,
            dominant_table: true,
            status_chart: true,
            evolution: true,
            solar_chart: true,
            day_chart: true,
        }
    }
}

impl ReportConfig {
    /// Number of toggleable flags (see [`ReportConfig::flag_mut`]).
    pub const FLAG_COUNT: usize = 9;

    /// Display label and value of the flag at `idx`, in document order.
    pub fn flag(&self, idx: usize) -> Option<(&'static str, bool)> {
        let entry = match idx {
            0 => ("1. Energy production", self.production),
            1 => ("   Production summary table", self.synthesis_table),
            2 => ("   Production share chart", self.production_chart),
            3 => ("2. Operating status", self.operating_status),
            4 => ("   Dominant status table", self.dominant_table),
            5 => ("   Installation status chart", self.status_chart),
            6 => ("3. Time evolution", self.evolution),
            7 => ("   Solar actual vs theoretical", self.solar_chart),
            8 => ("   Daily power by source", self.day_chart),
            _ => return None,
        };
        Some(entry)
    }

    pub fn flag_mut(&mut self, idx: usize) -> Option<&mut bool> {
        match idx {
            0 => Some(&mut self.production),
            1 => Some(&mut self.synthesis_table),
            2 => Some(&mut self.production_chart),
            3 => Some(&mut self.operating_status),
            4 => Some(&mut self.dominant_table),
            5 => Some(&mut self.status_chart),
            6 => Some(&mut self.evolution),
            7 => Some(&mut self.solar_chart),
            8 => Some(&mut self.day_chart),
            _ => None,
        }
    }

    /// Flip the flag at `idx`; returns the new value.
    pub fn toggle(&mut self, idx: usize) -> Option<bool> {
        let flag = self.flag_mut(idx)?;
        *flag = !*flag;
        Some(*flag)
    }
}
