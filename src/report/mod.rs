//! Reporting: summary tables, terminal formatting and the HTML report.

pub mod document;
pub mod format;
pub mod table;

pub use document::*;
pub use format::*;
pub use table::*;
