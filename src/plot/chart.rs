//! Plotters-powered decomposition chart, rendered to SVG.
//!
//! The chart overlays the raw series, its trend, and the cycle component on
//! a year axis. Everything about its look comes from `ChartStyle`; nothing
//! here reads global state.
//!
//! Non-finite observations are left out of the drawing. Each series is split
//! into runs of finite points so a missing year shows up as a gap instead of a
//! line drawn through it.

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::{ChartStyle, DecomposedSeries};
use crate::error::AppError;

/// Dashes drawn per year step on the cycle line.
const DASHES_PER_STEP: usize = 3;

type ChartResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Render the chart for one city into an SVG document.
pub fn render_chart_svg(decomposed: &DecomposedSeries, style: &ChartStyle, lambda: f64) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        draw_chart(&root, decomposed, style, lambda)
            .map_err(|e| AppError::Render(format!("{}: {e}", decomposed.series.city)))?;
        root.present()
            .map_err(|e| AppError::Render(format!("{}: {e}", decomposed.series.city)))?;
    }
    Ok(svg)
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    decomposed: &DecomposedSeries,
    style: &ChartStyle,
    lambda: f64,
) -> ChartResult {
    root.fill(&WHITE)?;

    let series = &decomposed.series;
    let (x0, x1) = x_bounds(&series.years);
    let (y0, y1) = y_bounds([
        series.yield_per_area.as_slice(),
        decomposed.trend.as_slice(),
        decomposed.cycle.as_slice(),
    ]);
    let font = style.font_family.as_str();

    let mut chart = ChartBuilder::on(root)
        .caption(style.caption(lambda), (font, 26).into_font().style(FontStyle::Bold))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let grid = rgb(style.grid_color).mix(style.grid_opacity);
    chart
        .configure_mesh()
        .x_labels(series.len().max(2))
        .y_labels(8)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .label_style((font, 14))
        .axis_desc_style((font, 16))
        .bold_line_style(&grid)
        .light_line_style(&TRANSPARENT)
        .draw()?;

    let yield_style = rgb(style.yield_color).stroke_width(style.yield_width);
    let trend_style = rgb(style.trend_color).stroke_width(style.trend_width);
    let cycle_style = rgb(style.cycle_color)
        .mix(style.cycle_opacity)
        .stroke_width(style.cycle_width);

    let years = &series.years;
    chart
        .draw_series(
            finite_runs(years, &series.yield_per_area)
                .into_iter()
                .map(move |run| PathElement::new(run, yield_style)),
        )?
        .label("Yield")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], yield_style));

    chart
        .draw_series(
            finite_runs(years, &decomposed.trend)
                .into_iter()
                .map(move |run| PathElement::new(run, trend_style)),
        )?
        .label("Trend")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], trend_style));

    chart
        .draw_series(
            finite_runs(years, &decomposed.cycle)
                .iter()
                .flat_map(|run| dash_segments(run, DASHES_PER_STEP))
                .map(move |dash| PathElement::new(dash, cycle_style)),
        )?
        .label("Cycle")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 8, y)], cycle_style)
        });

    // City label in the top-left corner of the plotting area.
    let label_at = (x0 + (x1 - x0) * 0.01, y1 - (y1 - y0) * 0.02);
    chart.draw_series(std::iter::once(Text::new(
        series.city.clone(),
        label_at,
        (font, 20).into_font().style(FontStyle::Bold),
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerMiddle)
        .label_font((font, 14))
        .background_style(&WHITE.mix(0.8))
        .border_style(&TRANSPARENT)
        .draw()?;

    Ok(())
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// X range spanning exactly the first and last year.
fn x_bounds(years: &[i32]) -> (f64, f64) {
    let first = years.first().copied().unwrap_or(0) as f64;
    let last = years.last().copied().unwrap_or(0) as f64;
    if last > first {
        (first, last)
    } else {
        (first - 0.5, first + 0.5)
    }
}

/// Y range covering every finite value, padded by 5%.
fn y_bounds<const N: usize>(series: [&[f64]; N]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in series.iter().flat_map(|s| s.iter()).filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }

    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = span * 0.05;
    (lo - pad, hi + pad)
}

/// Split `(year, value)` pairs into maximal runs of finite values.
fn finite_runs(years: &[i32], values: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (&year, &value) in years.iter().zip(values.iter()) {
        if value.is_finite() {
            current.push((year as f64, value));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Cut a polyline into `dashes_per_step` dashes per segment (half on, half off).
fn dash_segments(run: &[(f64, f64)], dashes_per_step: usize) -> Vec<Vec<(f64, f64)>> {
    let pieces = dashes_per_step.max(1) * 2;
    let mut dashes = Vec::new();
    for pair in run.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let lerp = |t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
        for k in (0..pieces).step_by(2) {
            let t0 = k as f64 / pieces as f64;
            let t1 = (k + 1) as f64 / pieces as f64;
            dashes.push(vec![lerp(t0), lerp(t1)]);
        }
    }
    dashes
}
