// core/src/polyfit.rs
//! Minste kvadraters polynomtilpasning.
//!
//! x sentreres og skaleres til [-1, 1] før Vandermonde-systemet løses med
//! SVD (minste-norm-løsning ved rangtap); koeffisientene ekspanderes så
//! tilbake til potenser av x. Koeffisienter returneres høyeste grad først.

use nalgebra::{DMatrix, DVector};

use crate::error::{AltimeterError, Result};

/// Horner-evaluering, koeffisienter høyeste grad først.
#[inline]
pub fn polyval(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * t + c)
}

/// Tilpass et polynom av grad `degree` til (x, y).
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(AltimeterError::LengthMismatch { x: x.len(), y: y.len() });
    }
    let n = x.len();
    let m = degree + 1;
    if n < m {
        return Err(AltimeterError::InsufficientData { required: m, actual: n });
    }

    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let shift = 0.5 * (lo + hi);
    let scale = if hi > lo { 0.5 * (hi - lo) } else { 1.0 };

    // Vandermonde i u = (x - shift) / scale, stigende grad
    let vander = DMatrix::from_fn(n, m, |i, j| ((x[i] - shift) / scale).powi(j as i32));
    let b = DVector::from_column_slice(y);

    let svd = vander.svd(true, true);
    let s_max = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let eps = f64::EPSILON * n as f64 * s_max;
    let rank = svd.rank(eps);
    if rank < m {
        log::debug!("polyfit: rank {rank} < {m}, minimum-norm solution");
    }
    let c_u = svd
        .solve(&b, eps)
        .map_err(|e| AltimeterError::InvalidParameter(format!("polyfit: {e}")))?;

    // u = a*x + b0  =>  ekspander p(u) til potenser av x
    let a = 1.0 / scale;
    let b0 = -shift / scale;
    let mut ascending = vec![0.0];
    for &ck in c_u.iter().rev() {
        ascending = mul_linear(&ascending, b0, a);
        ascending[0] += ck;
    }
    ascending.resize(m, 0.0);
    ascending.reverse();
    Ok(ascending)
}

/// (p(x)) * (b0 + a*x), stigende koeffisienter.
fn mul_linear(p: &[f64], b0: f64, a: f64) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + 1];
    for (i, &pi) in p.iter().enumerate() {
        out[i] += pi * b0;
        out[i + 1] += pi * a;
    }
    out
}
