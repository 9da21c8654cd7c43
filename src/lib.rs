//! `hp-yield` library crate.
//!
//! The binary (`hpy`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the decomposition and statistics are reusable outside the CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
