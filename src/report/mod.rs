//! Per-city analysis: decomposition, fit statistics, and summary formatting.

pub mod format;

pub use format::*;

use crate::domain::{CitySeries, DecomposedSeries, FitStatistics, SummaryRow};
use crate::error::AppError;
use crate::math::{hp_filter, mape_percent, pearson};

/// Split a city series into trend and cycle.
pub fn decompose(series: CitySeries, lambda: f64) -> Result<DecomposedSeries, AppError> {
    let out = hp_filter(&series.yield_per_area, lambda)
        .map_err(|e| match e {
            AppError::Numeric(msg) => AppError::Numeric(format!("{}: {msg}", series.city)),
            other => other,
        })?;
    Ok(DecomposedSeries {
        series,
        trend: out.trend,
        cycle: out.cycle,
    })
}

/// Correlation and MAPE of the trend against the raw series (unrounded).
pub fn fit_statistics(decomposed: &DecomposedSeries) -> FitStatistics {
    let raw = &decomposed.series.yield_per_area;
    FitStatistics {
        correlation: pearson(raw, &decomposed.trend),
        mape_pct: mape_percent(raw, &decomposed.trend),
    }
}

/// Summary line for a city, using reporting precision.
pub fn summary_row(city: &str, stats: FitStatistics) -> SummaryRow {
    let rounded = stats.rounded();
    SummaryRow {
        city: city.to_string(),
        correlation: rounded.correlation,
        mape_pct: rounded.mape_pct,
    }
}
