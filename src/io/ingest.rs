//! Raw table ingest and schema-driven extraction.
//!
//! This module turns a CSV grid (year header row, yield rows, area rows) into
//! per-city rows restricted to the configured year range.
//!
//! Design goals:
//! - **Fail fast**: any mismatch between the file and the `SchemaDescriptor`
//!   is an `InputFormat` error naming the offending row/cell
//! - **No synthetic fills**: empty value cells become NaN and stay NaN
//! - **Separation of concerns**: no filtering or statistics here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::{CityRows, RawTable, SchemaDescriptor};
use crate::error::AppError;

/// Loader output: selected years plus one entry per city, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub years: Vec<i32>,
    pub cities: Vec<CityRows>,
}

/// Read a raw CSV grid from disk.
pub fn read_raw_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open input table '{}'", path.display()), e))?;
    let table = read_raw_table_from(file)?;
    debug!(path = %path.display(), rows = table.row_count(), "read raw table");
    Ok(table)
}

/// Read a raw CSV grid from any reader. Every line is data; rows may be ragged.
///
/// The CSV reader skips completely blank lines, so spacer rows must carry at
/// least one delimiter (`,,,`) to keep row offsets stable.
pub fn read_raw_table_from<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::from_csv_read(format!("CSV parse error on line {}", idx + 1), e))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if idx == 0 {
            // Spreadsheet exports often prefix the first cell with a BOM.
            if let Some(first) = row.first_mut() {
                *first = first.trim_start_matches('\u{feff}').to_string();
            }
        }
        rows.push(row);
    }

    Ok(RawTable::new(rows))
}

/// Load the input table named by `path` and apply `schema`.
pub fn load_input(path: &Path, schema: &SchemaDescriptor) -> Result<LoadedTable, AppError> {
    let table = read_raw_table(path)?;
    load_cities(&table, schema)
}

/// Extract the year header and the paired yield/area rows.
pub fn load_cities(table: &RawTable, schema: &SchemaDescriptor) -> Result<LoadedTable, AppError> {
    schema.validate()?;

    let header = table.row(schema.header_row).ok_or_else(|| {
        AppError::InputFormat(format!(
            "Header row {} is missing (table has {} rows).",
            schema.header_row,
            table.row_count()
        ))
    })?;

    // Column index + year for every header cell after the name column.
    let mut selected: Vec<(usize, i32)> = Vec::new();
    for col in (schema.name_column + 1)..header.len() {
        let year = parse_year(table.cell(schema.header_row, col)).ok_or_else(|| {
            AppError::InputFormat(format!(
                "Header cell (row {}, column {}) is not a year: '{}'.",
                schema.header_row,
                col,
                table.cell(schema.header_row, col)
            ))
        })?;
        if schema.years.contains(year) {
            selected.push((col, year));
        }
    }

    let years: Vec<i32> = selected.iter().map(|&(_, y)| y).collect();
    let expected: Vec<i32> = schema.years.years().collect();
    if years != expected {
        return Err(AppError::InputFormat(format!(
            "Header years within {}..={} must be consecutive and complete; found {:?}.",
            schema.years.start, schema.years.end, years
        )));
    }

    let mut cities = Vec::with_capacity(schema.yield_rows.count);
    for (yield_row, area_row) in schema.yield_rows.rows().zip(schema.area_rows.rows()) {
        let city = city_name(table, yield_row, schema.name_column)?;
        let area_city = city_name(table, area_row, schema.name_column)?;
        if city != area_city {
            return Err(AppError::InputFormat(format!(
                "Yield row {yield_row} ('{city}') and area row {area_row} ('{area_city}') name different cities."
            )));
        }

        let yields = parse_values(table, yield_row, &selected)?;
        let areas = parse_values(table, area_row, &selected)?;
        cities.push(CityRows { city, yields, areas });
    }

    debug!(cities = cities.len(), years = years.len(), "loaded city rows");
    Ok(LoadedTable { years, cities })
}

fn city_name(table: &RawTable, row: usize, col: usize) -> Result<String, AppError> {
    if table.row(row).is_none() {
        return Err(AppError::InputFormat(format!(
            "Row {row} is missing (table has {} rows).",
            table.row_count()
        )));
    }
    let name = table.cell(row, col);
    if name.is_empty() {
        return Err(AppError::InputFormat(format!("Row {row} has no city name in column {col}.")));
    }
    Ok(name.to_string())
}

fn parse_values(table: &RawTable, row: usize, selected: &[(usize, i32)]) -> Result<Vec<f64>, AppError> {
    selected
        .iter()
        .map(|&(col, year)| {
            parse_value(table.cell(row, col)).ok_or_else(|| {
                AppError::InputFormat(format!(
                    "Cell (row {row}, column {col}, year {year}) is not numeric: '{}'.",
                    table.cell(row, col)
                ))
            })
        })
        .collect()
}

/// Accept integer years written either as `2002` or `2002.0`.
fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// Empty cells are undefined (NaN); anything else must be a number.
fn parse_value(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RowGroup, YearRange};

    const SMALL: &str = "\
city,2000,2001,2002,2003,2004
A,300,310,320,330,340
B,200,,220,230,240
,,,,,
A,500,500,500,500,0
B,400,400,400,400,400
";

    fn small_schema() -> SchemaDescriptor {
        SchemaDescriptor {
            yield_rows: RowGroup { start: 1, count: 2 },
            area_rows: RowGroup { start: 4, count: 2 },
            years: YearRange { start: 2001, end: 2003 },
            ..SchemaDescriptor::default()
        }
    }

    fn table(text: &str) -> RawTable {
        read_raw_table_from(text.as_bytes()).unwrap()
    }

    #[test]
    fn selects_only_configured_years() {
        let loaded = load_cities(&table(SMALL), &small_schema()).unwrap();
        assert_eq!(loaded.years, vec![2001, 2002, 2003]);
        assert_eq!(loaded.cities.len(), 2);
        assert_eq!(loaded.cities[0].city, "A");
        assert_eq!(loaded.cities[0].yields, vec![310.0, 320.0, 330.0]);
        assert_eq!(loaded.cities[0].areas, vec![500.0, 500.0, 500.0]);
    }

    #[test]
    fn empty_cells_become_nan() {
        let loaded = load_cities(&table(SMALL), &small_schema()).unwrap();
        let b = &loaded.cities[1];
        assert!(b.yields[0].is_nan());
        assert_eq!(b.yields[1], 220.0);
    }

    #[test]
    fn float_years_are_accepted() {
        let text = "city,2001.0,2002.0,2003.0\nA,1,2,3\nA,1,1,1\n";
        let schema = SchemaDescriptor {
            yield_rows: RowGroup { start: 1, count: 1 },
            area_rows: RowGroup { start: 2, count: 1 },
            years: YearRange { start: 2001, end: 2003 },
            ..SchemaDescriptor::default()
        };
        let loaded = load_cities(&table(text), &schema).unwrap();
        assert_eq!(loaded.years, vec![2001, 2002, 2003]);
    }

    #[test]
    fn bom_is_stripped_from_first_cell() {
        let t = table("\u{feff}city,2001\nA,1\n");
        assert_eq!(t.cell(0, 0), "city");
    }

    #[test]
    fn non_numeric_year_is_fatal() {
        let text = SMALL.replacen("2003", "n/a", 1);
        let err = load_cities(&table(&text), &small_schema()).unwrap_err();
        assert!(matches!(err, AppError::InputFormat(_)), "{err}");
    }

    #[test]
    fn gap_in_years_is_fatal() {
        let text = SMALL.replacen("2002", "1999", 1);
        let err = load_cities(&table(&text), &small_schema()).unwrap_err();
        assert!(matches!(err, AppError::InputFormat(_)), "{err}");
    }

    #[test]
    fn mismatched_city_names_are_fatal() {
        let text = SMALL.replacen("B,400", "C,400", 1);
        let err = load_cities(&table(&text), &small_schema()).unwrap_err();
        assert!(matches!(err, AppError::InputFormat(_)), "{err}");
    }

    #[test]
    fn non_numeric_value_is_fatal() {
        let text = SMALL.replacen("320", "abc", 1);
        let err = load_cities(&table(&text), &small_schema()).unwrap_err();
        assert!(matches!(err, AppError::InputFormat(_)), "{err}");
    }

    #[test]
    fn missing_area_rows_are_fatal() {
        let text = "city,2001,2002,2003\nA,1,2,3\nB,1,2,3\n";
        let err = load_cities(&table(text), &small_schema()).unwrap_err();
        assert!(matches!(err, AppError::InputFormat(_)), "{err}");
    }
}
