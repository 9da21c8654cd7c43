//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw table and the schema describing its layout
//! - per-city series (`CitySeries`, `DecomposedSeries`)
//! - fit outputs (`FitStatistics`, `SummaryRow`)
//! - run configuration (`RunConfig`, `ChartStyle`, `OutputNaming`)

pub mod types;

pub use types::*;
