//! Tabular report content shared by the terminal, CSV and HTML outputs.

use serde::Serialize;

use crate::aggregate::Aggregates;
use crate::domain::Channel;

/// Placeholder shown for cells with no value.
pub const MISSING_CELL: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Two-decimal number, or [`Cell::Missing`].
    pub fn rounded(value: Option<f64>) -> Self {
        match value {
            Some(v) => Cell::Number(round2(v)),
            None => Cell::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numbers are right-aligned in the report.
    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Number(v) => format!("{v:.2}"),
            Cell::Text(s) => s.clone(),
            Cell::Missing => MISSING_CELL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// A labelled grid of cells. `index_label` names the row-label column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub index_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Whether the row labels are shown as a leading column.
    pub show_index: bool,
}

impl SummaryTable {
    pub fn cell(&self, row: &str, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.iter().find(|r| r.label == row)?.cells.get(col)
    }
}

pub const ROW_PEAK_POWER: &str = "Peak power (kW)";
pub const ROW_OPERATING_HOURS: &str = "Operating hours (h)";
pub const ROW_ACTUAL_ENERGY: &str = "Actual energy (kWh)";
pub const ROW_THEORETICAL_ENERGY: &str = "Theoretical energy (kWh)";
pub const ROW_ENERGY_LOSSES: &str = "Energy losses (kWh)";

/// Production synthesis: one column per channel, one row per figure.
///
/// The load has no operating hours; only the solar column carries theoretical
/// energy and losses.
pub fn synthesis_table(agg: &Aggregates) -> SummaryTable {
    let per_channel = |f: &dyn Fn(Channel) -> Option<f64>| -> Vec<Cell> {
        Channel::ALL.iter().map(|&c| Cell::rounded(f(c))).collect()
    };
    let solar_only = |value: Option<f64>| -> Vec<Cell> {
        Channel::ALL
            .iter()
            .map(|&c| match c {
                Channel::Solar => Cell::rounded(value),
                _ => Cell::Missing,
            })
            .collect()
    };

    let rows = vec![
        TableRow {
            label: ROW_PEAK_POWER.to_string(),
            cells: per_channel(&|c: Channel| agg.channel(c).peak_power),
        },
        TableRow {
            label: ROW_OPERATING_HOURS.to_string(),
            cells: per_channel(&|c: Channel| match c {
                Channel::Installation => None,
                _ => agg.channel(c).operating_hours,
            }),
        },
        TableRow {
            label: ROW_ACTUAL_ENERGY.to_string(),
            cells: per_channel(&|c: Channel| agg.channel(c).energy),
        },
        TableRow {
            label: ROW_THEORETICAL_ENERGY.to_string(),
            cells: solar_only(agg.solar_theoretical_energy),
        },
        TableRow {
            label: ROW_ENERGY_LOSSES.to_string(),
            cells: solar_only(agg.solar_loss),
        },
    ];

    SummaryTable {
        index_label: "Figure".to_string(),
        columns: Channel::ALL.iter().map(|c| c.label().to_string()).collect(),
        rows,
        show_index: true,
    }
}

/// Rows of `(Source, Dominant status)`.
pub fn dominant_status_table(agg: &Aggregates) -> SummaryTable {
    let rows = agg
        .dominant
        .iter()
        .map(|(channel, status)| TableRow {
            label: channel.label().to_string(),
            cells: vec![
                Cell::Text(channel.label().to_string()),
                Cell::Text(status.to_string()),
            ],
        })
        .collect();

    SummaryTable {
        index_label: "Source".to_string(),
        columns: vec!["Source".to_string(), "Dominant status".to_string()],
        rows,
        show_index: false,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
