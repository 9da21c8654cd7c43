//! Synthetic yield workbook generation.
//!
//! Produces a raw table in the default layout (year header, yield rows,
//! spacer row, area rows) so the pipeline can be tried without real data.
//! Output is fully determined by the seed.

use std::fs::File;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RawTable, SchemaDescriptor, YearRange};
use crate::error::AppError;

/// Columns added on each side of the requested years, so the loader's year
/// filtering has something to drop.
const EDGE_YEARS: i32 = 2;

/// Parameters for a synthetic table.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub cities: Vec<String>,
    pub years: YearRange,
    pub seed: u64,
    /// Same multiplier the loader uses (`yield * unit_factor / area`).
    pub unit_factor: f64,
}

/// Generate a raw table: row 0 header, one yield row per city, a spacer row,
/// then one area row per city.
///
/// The city count must match the default schema's row groups, so the table
/// loads without a run file.
pub fn generate_sample(spec: &SampleSpec) -> Result<RawTable, AppError> {
    let layout = SchemaDescriptor::default();
    if spec.cities.len() != layout.yield_rows.count {
        return Err(AppError::Config(format!(
            "Sample needs exactly {} cities to match the default layout, got {}.",
            layout.yield_rows.count,
            spec.cities.len()
        )));
    }
    if spec.years.is_empty() {
        return Err(AppError::Config("Sample year range is empty.".into()));
    }
    if !spec.unit_factor.is_finite() || spec.unit_factor <= 0.0 {
        return Err(AppError::Config("Sample unit factor must be finite and > 0.".into()));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, 0.18)
        .map_err(|e| AppError::Numeric(format!("Noise distribution error: {e}")))?;

    let (Some(first), Some(last)) = (
        spec.years.start.checked_sub(EDGE_YEARS),
        spec.years.end.checked_add(EDGE_YEARS),
    ) else {
        return Err(AppError::Config(format!(
            "Sample years {}..={} leave no room for edge columns.",
            spec.years.start, spec.years.end
        )));
    };
    let n = YearRange { start: first, end: last }.len();

    let mut header = Vec::with_capacity(n + 1);
    header.push("city".to_string());
    header.extend((first..=last).map(|y| y.to_string()));

    let mut yield_rows = Vec::with_capacity(spec.cities.len());
    let mut area_rows = Vec::with_capacity(spec.cities.len());

    for city in &spec.cities {
        // Per-city level and growth so the series differ visibly.
        let base = rng.gen_range(4.2..5.6);
        let growth = rng.gen_range(0.05..0.12);
        let area_base = rng.gen_range(250.0..650.0);

        let mut yields = vec![city.clone()];
        let mut areas = vec![city.clone()];
        for i in 0..n {
            let t = i as f64;
            // Yield per area in ton/hectare with a mild weather cycle.
            let per_area = base + growth * t + 0.25 * (t * 0.9).sin() + noise.sample(&mut rng);
            let area = area_base * (1.0 + rng.gen_range(-0.04..0.04));
            let total = per_area * area / spec.unit_factor;
            yields.push(format!("{total:.2}"));
            areas.push(format!("{area:.2}"));
        }
        yield_rows.push(yields);
        area_rows.push(areas);
    }

    let mut rows = Vec::with_capacity(2 + 2 * spec.cities.len());
    rows.push(header);
    rows.extend(yield_rows);
    // The CSV reader skips blank lines, so the spacer keeps its delimiters.
    rows.push(vec![String::new(); n + 1]);
    rows.extend(area_rows);

    Ok(RawTable::new(rows))
}

/// Write a raw table as CSV.
pub fn write_raw_table(path: &Path, table: &RawTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create sample '{}'", path.display()), e))?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| AppError::from_csv_write(format!("Failed to write sample row to '{}'", path.display()), e))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush sample '{}'", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowGroup;
    use crate::io::{load_cities, read_raw_table};

    fn spec(seed: u64) -> SampleSpec {
        SampleSpec {
            cities: vec!["Zhengzhou".into(), "Kaifeng".into(), "Luoyang".into()],
            years: YearRange { start: 2002, end: 2021 },
            seed,
            unit_factor: 10.0,
        }
    }

    #[test]
    fn same_seed_same_table() {
        assert_eq!(generate_sample(&spec(7)).unwrap(), generate_sample(&spec(7)).unwrap());
        assert_ne!(generate_sample(&spec(7)).unwrap(), generate_sample(&spec(8)).unwrap());
    }

    #[test]
    fn sample_round_trips_through_loader_with_default_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        write_raw_table(&path, &generate_sample(&spec(42)).unwrap()).unwrap();

        let table = read_raw_table(&path).unwrap();
        let schema = SchemaDescriptor::default();
        assert_eq!(schema.area_rows, RowGroup { start: 5, count: 3 });
        let loaded = load_cities(&table, &schema).unwrap();

        assert_eq!(loaded.years.len(), 20);
        assert_eq!(loaded.years[0], 2002);
        let names: Vec<&str> = loaded.cities.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Zhengzhou", "Kaifeng", "Luoyang"]);
        assert!(loaded.cities.iter().all(|c| c.yields.iter().all(|v| v.is_finite() && *v > 0.0)));
    }

    #[test]
    fn rejects_city_counts_the_default_layout_cannot_load() {
        let mut s = spec(1);
        s.cities.clear();
        assert!(matches!(generate_sample(&s), Err(AppError::Config(_))));

        s.cities = vec!["A".into(), "B".into()];
        assert!(matches!(generate_sample(&s), Err(AppError::Config(_))));

        s.cities = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        assert!(matches!(generate_sample(&s), Err(AppError::Config(_))));
    }

    #[test]
    fn custom_city_names_round_trip_with_default_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        let mut s = spec(3);
        s.cities = vec!["Xinxiang".into(), "Anyang".into(), "Nanyang".into()];
        write_raw_table(&path, &generate_sample(&s).unwrap()).unwrap();

        let loaded = load_cities(&read_raw_table(&path).unwrap(), &SchemaDescriptor::default()).unwrap();
        let names: Vec<&str> = loaded.cities.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(names, vec!["Xinxiang", "Anyang", "Nanyang"]);
    }

    #[test]
    fn extreme_years_are_a_config_error() {
        let mut s = spec(1);
        s.years = YearRange { start: 2002, end: i32::MAX };
        assert!(matches!(generate_sample(&s), Err(AppError::Config(_))));

        s.years = YearRange { start: i32::MIN, end: 2002 };
        assert!(matches!(generate_sample(&s), Err(AppError::Config(_))));
    }
}
