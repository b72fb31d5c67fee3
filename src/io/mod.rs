//! Input/output helpers.
//!
//! - dataset ingest + normalization (`ingest`)
//! - summary table exports (CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
