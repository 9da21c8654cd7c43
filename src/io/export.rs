//! Write per-city decomposition tables, charts, and the run summary.
//!
//! Tables are plain CSV so they open directly in spreadsheets. Non-finite
//! values are written as-is (`NaN`, `inf`) rather than blanked.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{DecomposedSeries, OutputNaming, SummaryRow};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct DecompositionRecord {
    year: i32,
    yield_per_area: f64,
    trend: f64,
    cycle: f64,
}

/// Output paths for a single city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityOutputPaths {
    pub image: PathBuf,
    pub table: PathBuf,
}

impl CityOutputPaths {
    pub fn new(out_dir: &Path, city: &str, naming: &OutputNaming) -> Self {
        let stem = file_stem_for_city(city);
        Self {
            image: out_dir.join(format!("{stem}{}", naming.image_suffix)),
            table: out_dir.join(format!("{stem}{}", naming.table_suffix)),
        }
    }
}

/// Make a city name safe to use as a file name.
///
/// Path separators, control characters and characters Windows refuses in file
/// names become `_`. Other Unicode (e.g. CJK city names) is kept.
pub fn file_stem_for_city(city: &str) -> String {
    let stem: String = city
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => stem,
    }
}

/// Fail if two cities would write to the same output files.
pub fn check_distinct_stems<'a>(cities: impl IntoIterator<Item = &'a str>) -> Result<(), AppError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for city in cities {
        if let Some(previous) = seen.insert(file_stem_for_city(city), city) {
            return Err(AppError::InputFormat(format!(
                "Cities '{previous}' and '{city}' map to the same output file name '{}'.",
                file_stem_for_city(city)
            )));
        }
    }
    Ok(())
}

pub fn ensure_out_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create output directory '{}'", dir.display()), e))
}

/// Write the per-year table (year, raw, trend, cycle) for one city.
pub fn write_decomposition_csv(path: &Path, decomposed: &DecomposedSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create table '{}'", path.display()), e))?;
    let mut writer = csv::Writer::from_writer(file);

    let series = &decomposed.series;
    for i in 0..series.len() {
        writer
            .serialize(DecompositionRecord {
                year: series.years[i],
                yield_per_area: series.yield_per_area[i],
                trend: decomposed.trend[i],
                cycle: decomposed.cycle[i],
            })
            .map_err(|e| AppError::from_csv_write(format!("Failed to write table row to '{}'", path.display()), e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush table '{}'", path.display()), e))
}

/// Write the summary table (city, correlation, mape_pct).
pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary '{}'", path.display()), e))?;
    // Header written by hand so an empty run still produces a well-formed table.
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(["city", "correlation", "mape_pct"])
        .map_err(|e| AppError::from_csv_write(format!("Failed to write summary header to '{}'", path.display()), e))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::from_csv_write(format!("Failed to write summary row to '{}'", path.display()), e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush summary '{}'", path.display()), e))
}

/// Persist an already rendered SVG document.
pub fn write_svg(path: &Path, svg: &str) -> Result<(), AppError> {
    fs::write(path, svg).map_err(|e| AppError::io(format!("Failed to write chart '{}'", path.display()), e))
}
