//! Declarative chart descriptions and their materialization.
//!
//! - `builder`: aggregates → [`ChartSpec`] (pure, no drawing)
//! - `render`: [`ChartSpec`] → image bytes behind [`ChartRenderer`]
//! - `materialize`: renders the report's charts into a temporary directory

pub mod builder;
pub mod materialize;
pub mod render;

pub use builder::*;
pub use materialize::*;
pub use render::*;

use serde::Serialize;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RRGGBB`
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

pub const GRID_COLOR: Rgb = Rgb(0x8B, 0x2A, 0x03);
pub const GENSET_COLOR: Rgb = Rgb(0x00, 0x33, 0x66);
pub const SOLAR_COLOR: Rgb = Rgb(0xFF, 0xA5, 0x00);
pub const LOAD_COLOR: Rgb = Rgb(0x6B, 0x67, 0x67);
pub const THEORETICAL_COLOR: Rgb = Rgb(0xEC, 0x0E, 0x0E);

pub const GRID_FAULT_COLOR: Rgb = Rgb(0xD6, 0x27, 0x28);
pub const CURTAILMENT_COLOR: Rgb = Rgb(0x0F, 0x58, 0xDF);
pub const NORMAL_COLOR: Rgb = Rgb(0x2C, 0xA0, 0x2C);
pub const OTHER_STATUS_COLOR: Rgb = Rgb(0xB0, 0xB0, 0xB0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartSpec {
    Pie(PieChart),
    Cartesian(CartesianChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(p) => &p.title,
            ChartSpec::Cartesian(c) => &c.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value.max(0.0)).sum()
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mark {
    Bar,
    Line,
    LineWithMarkers,
    DashedLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub mark: Mark,
    pub color: Rgb,
    /// One value per category; `None` leaves a gap.
    pub values: Vec<Option<f64>>,
}

/// Chart over a categorical x axis (hour or time labels).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartesianChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl CartesianChart {
    /// `(min, max)` over every present value, `None` when there is none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
