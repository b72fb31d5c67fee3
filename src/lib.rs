//! `site-analyzer` library crate.
//!
//! The binary (`site-analyzer`) is a thin wrapper around this library so that:
//!
//! - ingest, aggregation and report code is testable without spawning processes
//! - the CLI and the TUI share one analysis pipeline
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
