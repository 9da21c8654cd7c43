//! Chart rendering for decomposed series.

pub mod chart;

pub use chart::*;
