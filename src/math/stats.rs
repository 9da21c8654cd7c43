//! Fit-quality statistics of a trend against its raw series.
//!
//! Both statistics deliberately return NaN instead of an error on degenerate
//! input: a non-finite observation should show up in the summary, not stop
//! the run.

/// Pearson correlation coefficient between `x` and `y`.
///
/// NaN when lengths differ, fewer than two points are given, any value is
/// non-finite, or either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Mean absolute percentage error of `predicted` vs `actual`, in percent.
///
/// Each term is `|a - p| / max(|a|, ε)`, so zero actuals give a huge but
/// finite contribution. NaN for empty or mismatched inputs; NaN inputs
/// propagate.
pub fn mape_percent(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len();
    if n == 0 || n != predicted.len() {
        return f64::NAN;
    }

    let total: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| (a - p).abs() / a.abs().max(f64::EPSILON))
        .sum();

    total / n as f64 * 100.0
}

/// Round to `places` decimal places. Non-finite values pass through.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(places);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_perfect_linear() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &up) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_stays_in_bounds() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.37).sin()).collect();
        let y: Vec<f64> = (0..50).map(|i| (i as f64 * 0.91).cos() + 0.01 * i as f64).collect();
        let r = pearson(&x, &y);
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn pearson_degenerate_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_nan());
        assert!(pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn mape_basic() {
        let m = mape_percent(&[100.0, 200.0], &[110.0, 180.0]);
        assert!((m - 10.0).abs() < 1e-12);
    }

    #[test]
    fn mape_is_non_negative_and_handles_zero_actual() {
        let m = mape_percent(&[0.0, 5.0], &[1.0, 5.0]);
        assert!(m.is_finite());
        assert!(m > 1e10);
        assert_eq!(mape_percent(&[3.0, 4.0], &[3.0, 4.0]), 0.0);
    }

    #[test]
    fn mape_propagates_nan() {
        assert!(mape_percent(&[1.0, f64::NAN], &[1.0, 2.0]).is_nan());
        assert!(mape_percent(&[], &[]).is_nan());
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(0.987_654, 4), 0.9877);
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }
}
