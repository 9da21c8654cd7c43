//! Shared domain types.
//!
//! These types describe one run end to end:
//!
//! - the raw input grid and the schema used to read it (`RawTable`, `SchemaDescriptor`)
//! - per-city series before and after decomposition (`CitySeries`, `DecomposedSeries`)
//! - fit diagnostics and the run summary (`FitStatistics`, `SummaryRow`)
//! - run configuration (`RunConfig`, `ChartStyle`, `OutputNaming`)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Smoothing parameter conventionally used for annual series.
pub const DEFAULT_LAMBDA: f64 = 100.0;

/// An untyped 2D grid of cells, read once and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> Option<&[String]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Cell text, trimmed. Cells past the end of a ragged row read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A contiguous block of rows in the raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowGroup {
    pub start: usize,
    pub count: usize,
}

impl RowGroup {
    pub fn end(self) -> usize {
        self.start + self.count
    }

    pub fn contains(self, row: usize) -> bool {
        row >= self.start && row < self.end()
    }

    pub fn overlaps(self, other: RowGroup) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    pub fn rows(self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// Inclusive year bound used to select columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn contains(self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn len(self) -> usize {
        if self.end < self.start {
            0
        } else {
            (i64::from(self.end) - i64::from(self.start)) as usize + 1
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn years(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

/// Describes where the loader finds each piece of the raw table.
///
/// The default reproduces the layout of the yearly wheat workbook: a year
/// header on row 0, three yield rows, a spacer row, then three area rows, with
/// city names in column 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaDescriptor {
    pub header_row: usize,
    pub name_column: usize,
    pub yield_rows: RowGroup,
    pub area_rows: RowGroup,
    pub years: YearRange,
    /// Multiplier applied before dividing by area (10 turns 10k tons per
    /// thousand hectares into ton/hectare).
    pub unit_factor: f64,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self {
            header_row: 0,
            name_column: 0,
            yield_rows: RowGroup { start: 1, count: 3 },
            area_rows: RowGroup { start: 5, count: 3 },
            years: YearRange {
                start: 2002,
                end: 2021,
            },
            unit_factor: 10.0,
        }
    }
}

impl SchemaDescriptor {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.years.is_empty() {
            return Err(AppError::Config(format!(
                "Year range {}..={} is empty.",
                self.years.start, self.years.end
            )));
        }
        if self.yield_rows.count == 0 || self.area_rows.count == 0 {
            return Err(AppError::Config("Yield and area row groups must not be empty.".into()));
        }
        if self.yield_rows.count != self.area_rows.count {
            return Err(AppError::Config(format!(
                "Yield rows ({}) and area rows ({}) must pair up one to one.",
                self.yield_rows.count, self.area_rows.count
            )));
        }
        if self.yield_rows.overlaps(self.area_rows) {
            return Err(AppError::Config("Yield and area row groups overlap.".into()));
        }
        if self.yield_rows.contains(self.header_row) || self.area_rows.contains(self.header_row) {
            return Err(AppError::Config("Header row lies inside a data row group.".into()));
        }
        if !self.unit_factor.is_finite() || self.unit_factor == 0.0 {
            return Err(AppError::Config(format!(
                "Unit factor must be finite and non-zero, got {}.",
                self.unit_factor
            )));
        }
        Ok(())
    }
}

/// Yield and area figures for one city, restricted to the selected years.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRows {
    pub city: String,
    pub yields: Vec<f64>,
    pub areas: Vec<f64>,
}

/// Ordered `(year, yield_per_area)` observations for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySeries {
    pub city: String,
    pub years: Vec<i32>,
    pub yield_per_area: Vec<f64>,
}

impl CitySeries {
    /// Build the series as `yield * unit_factor / area`.
    ///
    /// Zero or missing areas give non-finite values; they are kept as-is.
    pub fn from_rows(rows: &CityRows, years: &[i32], unit_factor: f64) -> Self {
        let yield_per_area = rows
            .yields
            .iter()
            .zip(rows.areas.iter())
            .map(|(&y, &a)| y * unit_factor / a)
            .collect();

        Self {
            city: rows.city.clone(),
            years: years.to_vec(),
            yield_per_area,
        }
    }

    pub fn len(&self) -> usize {
        self.yield_per_area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.yield_per_area.is_empty()
    }
}

/// A city series plus its trend and cycle components.
///
/// `trend[i] + cycle[i] == yield_per_area[i]` up to rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedSeries {
    pub series: CitySeries,
    pub trend: Vec<f64>,
    pub cycle: Vec<f64>,
}

/// Fit diagnostics of trend against raw series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    /// Pearson correlation between raw and trend.
    pub correlation: f64,
    /// Mean absolute percentage error of trend vs raw, in percent.
    pub mape_pct: f64,
}

impl FitStatistics {
    /// Reporting precision: 4 places for r, 2 for MAPE.
    pub fn rounded(self) -> Self {
        Self {
            correlation: crate::math::round_to(self.correlation, 4),
            mape_pct: crate::math::round_to(self.mape_pct, 2),
        }
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub city: String,
    pub correlation: f64,
    pub mape_pct: f64,
}

/// A city that failed while the run kept going.
#[derive(Debug, Clone, PartialEq)]
pub struct CityFailure {
    pub city: String,
    pub message: String,
}

/// What to do when one city fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run; no summary is written.
    #[default]
    Abort,
    /// Log the failure, skip the city and continue.
    KeepGoing,
}

/// Chart appearance. Passed explicitly to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    /// Chart caption; `{lambda}` is replaced by the smoothing parameter.
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub font_family: String,
    pub yield_color: [u8; 3],
    pub trend_color: [u8; 3],
    pub cycle_color: [u8; 3],
    pub yield_width: u32,
    pub trend_width: u32,
    pub cycle_width: u32,
    /// Opacity of the cycle line, 0..=1.
    pub cycle_opacity: f64,
    pub grid_color: [u8; 3],
    pub grid_opacity: f64,
}

impl ChartStyle {
    pub fn caption(&self, lambda: f64) -> String {
        self.title.replace("{lambda}", &lambda.to_string())
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 750,
            title: "Hodrick-Prescott Filter (lambda={lambda})".to_string(),
            x_label: "Year".to_string(),
            y_label: "Yield (ton/hectare)".to_string(),
            font_family: "sans-serif".to_string(),
            yield_color: [0, 102, 204],
            trend_color: [192, 0, 0],
            cycle_color: [0, 153, 0],
            yield_width: 2,
            trend_width: 3,
            cycle_width: 1,
            cycle_opacity: 0.6,
            grid_color: [192, 192, 192],
            grid_opacity: 0.4,
        }
    }
}

/// File naming for per-city outputs and the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputNaming {
    pub image_suffix: String,
    pub table_suffix: String,
    pub summary_name: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            image_suffix: "_hp_filter.svg".to_string(),
            table_suffix: "_hp_filter.csv".to_string(),
            summary_name: "hp_filter_summary.csv".to_string(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags layered over an optional TOML run file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub schema: SchemaDescriptor,
    pub lambda: f64,
    pub chart: ChartStyle,
    pub naming: OutputNaming,
    pub failure_policy: FailurePolicy,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            out_dir: out_dir.into(),
            schema: SchemaDescriptor::default(),
            lambda: DEFAULT_LAMBDA,
            chart: ChartStyle::default(),
            naming: OutputNaming::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.schema.validate()?;
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(AppError::Config(format!(
                "Smoothing parameter must be finite and >= 0, got {}.",
                self.lambda
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(AppError::Config("Chart dimensions must be > 0.".into()));
        }
        if !(0.0..=1.0).contains(&self.chart.cycle_opacity) || !(0.0..=1.0).contains(&self.chart.grid_opacity) {
            return Err(AppError::Config("Chart opacities must lie in [0, 1].".into()));
        }
        let naming = &self.naming;
        if naming.image_suffix == naming.table_suffix {
            return Err(AppError::Config("Image and table suffixes must differ.".into()));
        }
        if naming.summary_name.trim().is_empty() {
            return Err(AppError::Config("Summary file name must not be empty.".into()));
        }
        Ok(())
    }
}
