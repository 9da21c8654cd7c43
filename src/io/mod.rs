//! Input/output helpers.
//!
//! - raw table ingest + schema extraction (`ingest`)
//! - table, chart and summary exports (`export`)
//! - optional TOML run file (`config`)

pub mod config;
pub mod export;
pub mod ingest;

pub use config::*;
pub use export::*;
pub use ingest::*;
