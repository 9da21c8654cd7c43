//! Formatted terminal output for a finished run.
//!
//! Kept separate from the math so output changes stay local.

use crate::domain::{CityFailure, SummaryRow};

/// Format the summary table plus any skipped cities.
pub fn format_summary(rows: &[SummaryRow], failures: &[CityFailure]) -> String {
    let mut out = String::new();

    out.push_str("=== HP filter summary ===\n");
    out.push_str(&format!("{:<24} {:>10} {:>10}\n", "city", "r_c", "MAPE(%)"));
    out.push_str(&format!("{:-<24} {:->10} {:->10}\n", "", "", ""));

    for row in rows {
        out.push_str(&format!(
            "{:<24} {:>10.4} {:>10.2}\n",
            truncate(&row.city, 24),
            row.correlation,
            row.mape_pct
        ));
    }

    if !failures.is_empty() {
        out.push_str("\nSkipped:\n");
        for f in failures {
            out.push_str(&format!("- {}: {}\n", f.city, f.message));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
