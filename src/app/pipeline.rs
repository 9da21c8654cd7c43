//! The decomposition pipeline: Loader -> per-city processor -> Aggregator.
//!
//! Cities are processed one at a time in source order. Each city's series is
//! owned by its iteration and dropped once its chart and table are on disk;
//! only the summary rows outlive the loop. The summary file is written once,
//! after the last city, so an aborted run leaves no summary behind.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::domain::{CityFailure, CityRows, CitySeries, FailurePolicy, FitStatistics, RunConfig, SummaryRow};
use crate::error::AppError;
use crate::io::{
    CityOutputPaths, check_distinct_stems, ensure_out_dir, load_input, write_decomposition_csv, write_summary_csv, write_svg,
};
use crate::plot::render_chart_svg;
use crate::report::{decompose, fit_statistics, summary_row};

/// Outputs of one processed city.
#[derive(Debug, Clone)]
pub struct CityReport {
    pub row: SummaryRow,
    /// Unrounded statistics.
    pub stats: FitStatistics,
    pub paths: CityOutputPaths,
}

/// All outputs of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One row per successfully processed city, in source order.
    pub rows: Vec<SummaryRow>,
    /// Cities skipped under `FailurePolicy::KeepGoing`.
    pub failures: Vec<CityFailure>,
    pub summary_path: PathBuf,
}

/// Execute the full run described by `config`.
pub fn run_pipeline(config: &RunConfig) -> Result<RunSummary, AppError> {
    config.validate()?;
    ensure_out_dir(&config.out_dir)?;

    let loaded = load_input(&config.input, &config.schema)?;
    info!(
        input = %config.input.display(),
        cities = loaded.cities.len(),
        years = loaded.years.len(),
        "loaded input table"
    );
    check_distinct_stems(loaded.cities.iter().map(|c| c.city.as_str()))?;

    let mut rows = Vec::with_capacity(loaded.cities.len());
    let mut failures = Vec::new();

    for city in &loaded.cities {
        match process_city(city, &loaded.years, config) {
            Ok(report) => {
                info!(
                    city = %report.row.city,
                    r_c = %format!("{:.4}", report.stats.correlation),
                    mape_pct = %format!("{:.2}", report.stats.mape_pct),
                    "city done"
                );
                rows.push(report.row);
            }
            Err(err) => match config.failure_policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::KeepGoing => {
                    warn!(city = %city.city, error = %err, "city skipped");
                    failures.push(CityFailure {
                        city: city.city.clone(),
                        message: err.to_string(),
                    });
                }
            },
        }
    }

    let summary_path = config.out_dir.join(&config.naming.summary_name);
    write_summary_csv(&summary_path, &rows)?;
    info!(path = %summary_path.display(), rows = rows.len(), "summary written");

    Ok(RunSummary {
        rows,
        failures,
        summary_path,
    })
}

/// Decompose one city, write its chart and table, and return its summary row.
pub fn process_city(rows: &CityRows, years: &[i32], config: &RunConfig) -> Result<CityReport, AppError> {
    let series = CitySeries::from_rows(rows, years, config.schema.unit_factor);
    let decomposed = decompose(series, config.lambda)?;
    let stats = fit_statistics(&decomposed);

    let paths = CityOutputPaths::new(&config.out_dir, &rows.city, &config.naming);
    let svg = render_chart_svg(&decomposed, &config.chart, config.lambda)?;
    write_svg(&paths.image, &svg)?;
    write_decomposition_csv(&paths.table, &decomposed)?;

    Ok(CityReport {
        row: summary_row(&rows.city, stats),
        stats,
        paths,
    })
}
