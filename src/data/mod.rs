//! Built-in reference data: the input format guide and its example dataset.

pub mod guide;

pub use guide::*;
