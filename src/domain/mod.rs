//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the positional input schema and monitored channels (`Channel`, `Reading`)
//! - normalized status values and their synonym table (`Status`, `StatusSynonyms`)
//! - the loaded dataset and period selection (`Dataset`, `Period`, `PeriodView`)
//! - report inclusion flags (`ReportConfig`)

pub mod dataset;
pub mod status;
pub mod types;

pub use dataset::*;
pub use status::*;
pub use types::*;
