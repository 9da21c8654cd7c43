//! Optional TOML run file.
//!
//! Every section and field is optional; missing values keep their defaults.
//!
//! ```toml
//! [schema]
//! header_row = 0
//! yield_rows = { start = 1, count = 3 }
//! area_rows = { start = 5, count = 3 }
//! years = { start = 2002, end = 2021 }
//!
//! [filter]
//! lambda = 100.0
//!
//! [chart]
//! width = 1200
//! trend_color = [192, 0, 0]
//!
//! [output]
//! summary_name = "hp_filter_summary.csv"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{ChartStyle, DEFAULT_LAMBDA, OutputNaming, SchemaDescriptor};
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunFile {
    pub schema: SchemaDescriptor,
    pub filter: FilterSection,
    pub chart: ChartStyle,
    pub output: OutputNaming,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSection {
    pub lambda: f64,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self { lambda: DEFAULT_LAMBDA }
    }
}

/// Read and parse a run file.
pub fn read_run_file(path: &Path) -> Result<RunFile, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read run file '{}'", path.display()), e))?;
    parse_run_file(&text).map_err(|e| match e {
        AppError::Config(msg) => AppError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_run_file(text: &str) -> Result<RunFile, AppError> {
    toml::from_str(text).map_err(|e| AppError::Config(format!("Invalid run file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowGroup;

    #[test]
    fn empty_file_gives_defaults() {
        let run = parse_run_file("").unwrap();
        assert_eq!(run, RunFile::default());
        assert_eq!(run.filter.lambda, 100.0);
    }

    #[test]
    fn partial_sections_override_defaults() {
        let run = parse_run_file(
            r#"
            [schema]
            area_rows = { start = 6, count = 3 }
            years = { start = 2005, end = 2020 }

            [filter]
            lambda = 6.25

            [chart]
            width = 640
            cycle_color = [10, 20, 30]
            "#,
        )
        .unwrap();

        assert_eq!(run.schema.area_rows, RowGroup { start: 6, count: 3 });
        assert_eq!(run.schema.yield_rows, RowGroup { start: 1, count: 3 });
        assert_eq!(run.schema.years.start, 2005);
        assert_eq!(run.filter.lambda, 6.25);
        assert_eq!(run.chart.width, 640);
        assert_eq!(run.chart.height, ChartStyle::default().height);
        assert_eq!(run.chart.cycle_color, [10, 20, 30]);
        assert_eq!(run.output, OutputNaming::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = parse_run_file("[plotting]\ndpi = 300\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn misspelled_keys_inside_sections_are_rejected() {
        let err = parse_run_file("[schema]\nyeild_rows = { start = 9, count = 3 }\n").unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("yeild_rows")), "{err}");

        for text in ["[chart]\nwidht = 800\n", "[output]\nsummary = \"s.csv\"\n"] {
            assert!(matches!(parse_run_file(text), Err(AppError::Config(_))), "{text}");
        }
    }
}
