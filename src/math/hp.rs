//! Hodrick-Prescott trend/cycle decomposition.
//!
//! The trend `τ` minimizes
//!
//! ```text
//! Σ (y_t - τ_t)^2 + λ Σ ((τ_{t+1} - τ_t) - (τ_t - τ_{t-1}))^2
//! ```
//!
//! whose first-order condition is the linear system
//!
//! ```text
//! (I + λ DᵀD) τ = y
//! ```
//!
//! with `D` the `(n-2) × n` second-difference operator. The system matrix is
//! symmetric positive definite for any `λ >= 0`, so we factor it with Cholesky.
//! Yearly series are a few dozen points long; a dense factorization is fine.
//!
//! The matrix does not depend on `y`, so non-finite observations do not break
//! the factorization. They flow through the solve and surface as non-finite
//! trend/cycle values.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

/// Second-difference stencil.
const STENCIL: [f64; 3] = [1.0, -2.0, 1.0];

/// Trend and cycle components; `trend[i] + cycle[i] == y[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HpDecomposition {
    pub trend: Vec<f64>,
    pub cycle: Vec<f64>,
}

/// Decompose `y` into trend and cycle with smoothing parameter `lambda`.
pub fn hp_filter(y: &[f64], lambda: f64) -> Result<HpDecomposition, AppError> {
    if y.is_empty() {
        return Err(AppError::Numeric("Cannot filter an empty series.".into()));
    }
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(AppError::Numeric(format!(
            "Smoothing parameter must be finite and >= 0, got {lambda}."
        )));
    }

    let n = y.len();
    let system = system_matrix(n, lambda);
    let chol = system.cholesky().ok_or_else(|| {
        AppError::Numeric(format!(
            "HP system matrix is not positive definite (n={n}, lambda={lambda})."
        ))
    })?;

    let rhs = DVector::from_column_slice(y);
    let trend_vec = chol.solve(&rhs);

    let trend: Vec<f64> = trend_vec.iter().copied().collect();
    let cycle = y.iter().zip(trend.iter()).map(|(&yi, &ti)| yi - ti).collect();

    Ok(HpDecomposition { trend, cycle })
}

/// Build `I + λ DᵀD` (pentadiagonal, stored dense).
fn system_matrix(n: usize, lambda: f64) -> DMatrix<f64> {
    let mut a = DMatrix::<f64>::identity(n, n);
    if n < 3 || lambda == 0.0 {
        return a;
    }

    // Each row k of D touches columns k..k+2; accumulate its outer product.
    for k in 0..(n - 2) {
        for (i, &di) in STENCIL.iter().enumerate() {
            for (j, &dj) in STENCIL.iter().enumerate() {
                a[(k + i, k + j)] += lambda * di * dj;
            }
        }
    }
    a
}
