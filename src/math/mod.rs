//! Mathematical utilities: HP decomposition and fit statistics.

pub mod hp;
pub mod stats;

pub use hp::*;
pub use stats::*;
